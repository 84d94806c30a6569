//! Representation of an envelope address and its syntax rules

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Shortest accepted address, in characters
pub const MIN_ADDRESS_LEN: usize = 5;
/// Longest accepted address, in characters
pub const MAX_ADDRESS_LEN: usize = 254;
/// Accepted 1-based positions of the `@` separator
///
/// This is one more than the local-part length, so local parts of 1 to 64 characters pass.
pub const AT_POSITION: (usize, usize) = (2, 65);

/// Symbols accepted in the local part besides ASCII letters and digits
const LOCAL_SYMBOLS: &str = "~`!.#$%^&'*{|}-_+=";

/// Represents an envelope address, `local@domain`.
///
/// An `Address` can only be built through [`Address::validate`] (or [`FromStr`]), so it always
/// satisfies the address grammar.
///
/// # Examples
///
/// ```
/// use mailsender::Address;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = "user@email.com".parse::<Address>()?;
/// assert_eq!(address.user(), "user");
/// assert_eq!(address.domain(), "email.com");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Address {
    /// Complete address
    serialized: String,
    /// Index into `serialized` of the '@'
    at_start: usize,
}

impl Address {
    /// Checks `address` against the grammar and returns the validated address.
    ///
    /// Rules are applied in order and the first failing one is reported:
    ///
    /// 1. the length is within `[5, 254]`
    /// 2. the `@` sits at a 1-based position within `[2, 65]`
    /// 3. local part characters are alphanumeric or one of ``~`!.#$%^&'*{|}-_+=``
    /// 4. a domain wrapped in `[` and `]` is unwrapped
    /// 5. domain characters are alphanumeric, `.` or `-`
    /// 6. the address does not start or end with `.`
    /// 7. the address does not contain `..`
    pub fn validate(address: &str) -> Result<Address, AddressError> {
        let at_start = check_address(address)?;
        Ok(Address {
            serialized: address.to_owned(),
            at_start,
        })
    }

    /// Gets the local part of the `Address`.
    pub fn user(&self) -> &str {
        &self.serialized[..self.at_start]
    }

    /// Gets the domain part of the `Address`, brackets included for IP literals.
    pub fn domain(&self) -> &str {
        &self.serialized[self.at_start + 1..]
    }

    /// Tells if the domain is an IP literal such as `[192.168.0.1]`
    pub fn is_ip_literal(&self) -> bool {
        unwrap_ip_literal(self.domain()).is_some()
    }
}

fn unwrap_ip_literal(domain: &str) -> Option<&str> {
    domain.strip_prefix('[').and_then(|d| d.strip_suffix(']'))
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || LOCAL_SYMBOLS.contains(c)
}

fn is_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

fn check_address(val: &str) -> Result<usize, AddressError> {
    let len = val.chars().count();
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&len) {
        return Err(AddressError::Length);
    }

    let at_start = val.find('@').ok_or(AddressError::Length)?;
    let (user, domain) = (&val[..at_start], &val[at_start + 1..]);
    let position = user.chars().count() + 1;
    if !(AT_POSITION.0..=AT_POSITION.1).contains(&position) {
        return Err(AddressError::Length);
    }

    if !user.chars().all(is_local_char) {
        return Err(AddressError::LocalChar);
    }

    // Only the domain itself is checked, not the full address length
    let domain = unwrap_ip_literal(domain).unwrap_or(domain);
    if !domain.chars().all(is_domain_char) {
        return Err(AddressError::DomainChar);
    }

    if val.starts_with('.') || val.ends_with('.') {
        return Err(AddressError::DotPlacement);
    }

    if val.contains("..") {
        return Err(AddressError::ConsecutiveDot);
    }

    Ok(at_start)
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.serialized)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(val: &str) -> Result<Self, AddressError> {
        Address::validate(val)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(serialized: String) -> Result<Self, AddressError> {
        let at_start = check_address(&serialized)?;
        Ok(Address {
            serialized,
            at_start,
        })
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.serialized
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Address syntax violations, one per rule
pub enum AddressError {
    /// Address length or local part length out of range
    Length,
    /// Forbidden character in the local part
    LocalChar,
    /// Forbidden character in the domain
    DomainChar,
    /// Address starts or ends with a dot
    DotPlacement,
    /// Address contains two consecutive dots
    ConsecutiveDot,
}

impl Error for AddressError {}

impl Display for AddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AddressError::Length => f.write_str("address or local part has an invalid length"),
            AddressError::LocalChar => f.write_str("invalid character in local part"),
            AddressError::DomainChar => f.write_str("invalid character in domain"),
            AddressError::DotPlacement => f.write_str("address starts or ends with a dot"),
            AddressError::ConsecutiveDot => f.write_str("address contains consecutive dots"),
        }
    }
}
