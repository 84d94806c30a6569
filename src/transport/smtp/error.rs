//! Error and result type for SMTP clients

use std::{error::Error as StdError, fmt, io};

use crate::{transport::smtp::response::Code, BoxError};

// Inspired by https://github.com/seanmonstar/reqwest/blob/a8566383168c0ef06c21f38cbc9213af6ff6db31/src/error.rs

/// The Errors that may occur when sending an email over SMTP
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the relay host name could not be resolved to an IPv4 address
    pub fn is_resolution(&self) -> bool {
        matches!(self.inner.kind, Kind::Resolution)
    }

    /// Returns true if no connection could be established
    pub fn is_connection(&self) -> bool {
        matches!(self.inner.kind, Kind::Connection)
    }

    /// Returns true if the error happened below the SMTP exchange
    ///
    /// This covers resolution and connection failures as well as broken connections.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::Resolution | Kind::Connection | Kind::Network
        )
    }

    /// Returns true if the relay kept answering with an unexpected reply
    pub fn is_protocol(&self) -> bool {
        matches!(self.inner.kind, Kind::Protocol(_) | Kind::Response)
    }

    /// Returns true if the relay refused the message after its transfer
    pub fn is_rejection(&self) -> bool {
        matches!(self.inner.kind, Kind::Rejected(_))
    }

    /// Returns true if the error is caused by a timeout
    pub fn is_timeout(&self) -> bool {
        self.io_error().is_some_and(|err| {
            matches!(
                err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            )
        })
    }

    /// Returns the status code, if the error was generated from a response.
    pub fn status(&self) -> Option<Code> {
        match self.inner.kind {
            Kind::Protocol(code) => code,
            Kind::Rejected(code) => Some(code),
            _ => None,
        }
    }

    /// Returns the OS error number of the underlying i/o failure, if any
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }

    fn io_error(&self) -> Option<&io::Error> {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(io_err) = err.downcast_ref::<io::Error>() {
                return Some(io_err);
            }

            source = err.source();
        }

        None
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Host name without an IPv4 address
    Resolution,
    /// Connection error
    Connection,
    /// Underlying network i/o error
    Network,
    /// Error parsing a response
    Response,
    /// Reply code different from the expected one, after the retry
    Protocol(Option<Code>),
    /// Message refused after the end of data marker
    Rejected(Code),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("mailsender::transport::smtp::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Resolution => f.write_str("resolution error")?,
            Kind::Connection => f.write_str("connection error")?,
            Kind::Network => f.write_str("network error")?,
            Kind::Response => f.write_str("response error")?,
            Kind::Protocol(Some(ref code)) => write!(f, "unexpected reply ({code})")?,
            Kind::Protocol(None) => f.write_str("unexpected reply")?,
            Kind::Rejected(ref code) => write!(f, "message rejected ({code})")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn resolution<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Resolution, Some(e))
}

pub(crate) fn connection<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connection, Some(e))
}

pub(crate) fn network<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Network, Some(e))
}

pub(crate) fn response<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Response, Some(e))
}

pub(crate) fn protocol<E: Into<BoxError>>(code: Option<Code>, e: E) -> Error {
    Error::new(Kind::Protocol(code), Some(e))
}

pub(crate) fn rejected<E: Into<BoxError>>(code: Code, e: E) -> Error {
    Error::new(Kind::Rejected(code), Some(e))
}
