use super::Address;

/// Simple email envelope representation
///
/// One sender and one recipient, both validated. The envelope is built once per send and is
/// not modified afterwards.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    /// The envelope recipient address
    forward_path: Address,
    /// The envelope sender address
    reverse_path: Address,
}

impl Envelope {
    /// Creates a new envelope
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// # use mailsender::{Address, Envelope};
    ///
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// let sender = Address::from_str("from@email.com")?;
    /// let recipient = Address::from_str("to@email.com")?;
    ///
    /// let envelope = Envelope::new(sender, recipient);
    /// assert_eq!(envelope.helo_domain(), "email.com");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(from: Address, to: Address) -> Envelope {
        Envelope {
            forward_path: to,
            reverse_path: from,
        }
    }

    /// Gets the destination address of the envelope.
    pub fn to(&self) -> &Address {
        &self.forward_path
    }

    /// Gets the sender of the envelope.
    pub fn from(&self) -> &Address {
        &self.reverse_path
    }

    /// Domain announced in `HELO`, the domain of the sender
    pub fn helo_domain(&self) -> &str {
        self.reverse_path.domain()
    }
}
