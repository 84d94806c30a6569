//! The stub transport records the envelope and content of the emails it is asked to send, and
//! returns a fixed result. It is useful for testing purposes.
//!
//! #### Stub Transport
//!
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use mailsender::{transport::stub::StubTransport, Message, Transport};
//!
//! let email = Message::parse("From: nobody@domain.tld\nTo: hei@domain.tld\n\nBe happy!\n")?;
//!
//! let sender = StubTransport::new_ok();
//! sender.send(&email)?;
//!
//! let messages = sender.messages();
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].0.to().as_ref(), "hei@domain.tld");
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    address::Envelope,
    transport::smtp::{error, Error},
    Transport,
};

/// This transport logs the message envelope and returns the given response
#[derive(Debug, Clone)]
pub struct StubTransport {
    response: Result<(), StubFailure>,
    message_log: Arc<Mutex<Vec<(Envelope, String)>>>,
}

#[derive(Debug, Clone, Copy)]
struct StubFailure;

impl StubTransport {
    /// Creates a new transport that always returns a success response
    pub fn new_ok() -> StubTransport {
        StubTransport {
            response: Ok(()),
            message_log: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Creates a new transport that always returns an unexpected reply error
    pub fn new_error() -> StubTransport {
        StubTransport {
            response: Err(StubFailure),
            message_log: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Return all logged messages sent using [`Transport::send_raw`]
    pub fn messages(&self) -> Vec<(Envelope, String)> {
        self.message_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StubTransport {
    type Ok = ();
    type Error = Error;

    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        #[cfg(feature = "tracing")]
        tracing::info!("stub sending {} bytes to {}", email.len(), envelope.to());

        self.message_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((envelope.clone(), String::from_utf8_lossy(email).into()));
        self.response
            .map_err(|_| error::protocol(None, "stub transport failure"))
    }
}
