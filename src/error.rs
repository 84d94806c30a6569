use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    io,
};

use crate::{address::ExtractError, config, transport::smtp};

/// Error type for a complete send
#[derive(Debug)]
pub enum Error {
    /// The message file could not be read
    Io(io::Error),
    /// The message header has no usable envelope
    Envelope(ExtractError),
    /// The relay configuration could not be loaded
    Config(config::Error),
    /// The relay settings need a sender which is not available
    UnsupportedRelay {
        /// Configured port
        port: u16,
        /// Configured authentication method
        auth_method: String,
    },
    /// The SMTP exchange failed
    Smtp(smtp::Error),
}

/// Failure categories, as reported to the command line
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Category {
    /// Message file missing, or header block absent or malformed
    File,
    /// An envelope address breaks the address grammar
    AddressSyntax,
    /// Missing or unusable relay configuration
    Config,
    /// Name resolution or connection failure, or a broken connection
    Transport,
    /// Unexpected reply persisting after the retry
    Protocol,
    /// The relay refused the message after the transfer
    RelayRejection,
}

impl Category {
    /// Process exit status for this category
    pub fn exit_code(self) -> u8 {
        match self {
            Category::File => 2,
            Category::AddressSyntax => 3,
            Category::Config => 4,
            Category::Transport => 5,
            Category::Protocol => 6,
            Category::RelayRejection => 7,
        }
    }
}

impl Error {
    /// Category of the failure
    pub fn category(&self) -> Category {
        match self {
            Error::Io(_) => Category::File,
            Error::Envelope(ExtractError::AddressSyntax { .. }) => Category::AddressSyntax,
            Error::Envelope(_) => Category::File,
            Error::Config(_) | Error::UnsupportedRelay { .. } => Category::Config,
            Error::Smtp(err) if err.is_rejection() => Category::RelayRejection,
            Error::Smtp(err) if err.is_protocol() => Category::Protocol,
            Error::Smtp(_) => Category::Transport,
        }
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Error::Io(e) => write!(fmt, "cannot read message file: {e}"),
            Error::Envelope(e) => e.fmt(fmt),
            Error::Config(e) => write!(fmt, "invalid relay configuration: {e}"),
            Error::UnsupportedRelay { port, auth_method } => write!(
                fmt,
                "no sender for port {port} with authentication method {auth_method:?}"
            ),
            Error::Smtp(e) => e.fmt(fmt),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Envelope(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Smtp(e) => Some(e),
            Error::UnsupportedRelay { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ExtractError> for Error {
    fn from(err: ExtractError) -> Error {
        Error::Envelope(err)
    }
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Error {
        Error::Config(err)
    }
}

impl From<smtp::Error> for Error {
    fn from(err: smtp::Error) -> Error {
        Error::Smtp(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::address::{AddressError, Field};

    #[test]
    fn envelope_categories() {
        assert_eq!(
            Error::from(ExtractError::HeaderMissing).category(),
            Category::File
        );
        assert_eq!(
            Error::from(ExtractError::AddressNotFound(Field::To)).category(),
            Category::File
        );
        assert_eq!(
            Error::from(ExtractError::AddressSyntax {
                field: Field::From,
                source: AddressError::DomainChar,
            })
            .category(),
            Category::AddressSyntax
        );
    }

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let categories = [
            Category::File,
            Category::AddressSyntax,
            Category::Config,
            Category::Transport,
            Category::Protocol,
            Category::RelayRejection,
        ];
        for (i, a) in categories.iter().enumerate() {
            assert_ne!(a.exit_code(), 0);
            for b in &categories[i + 1..] {
                assert_ne!(a.exit_code(), b.exit_code());
            }
        }
    }

    #[test]
    fn display_unsupported_relay() {
        let err = Error::UnsupportedRelay {
            port: 587,
            auth_method: "plain".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "no sender for port 587 with authentication method \"plain\""
        );
    }
}
