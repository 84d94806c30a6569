//! Mailsender sends a single preformatted message file to one recipient through a plain SMTP
//! relay.
//!
//! The sender and recipient are read from the `From:` and `To:` fields of the message header,
//! checked against a restricted address grammar, and then handed to a [`Transport`] which
//! drives the SMTP dialogue with the relay.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailsender::{config::RelayConfig, Sender};
//!
//! # fn main() -> Result<(), mailsender::Error> {
//! let config = RelayConfig::load("mailsender.conf")?;
//! let sender = Sender::from_config(&config)?;
//!
//! let response = mailsender::send_file(&sender, "message.txt")?;
//! println!("relay accepted the message: {}", response.code());
//! # Ok(())
//! # }
//! ```
//!
//! The relay connection is plain SMTP on port 25, without TLS or authentication. Other relay
//! settings are rejected by [`Sender::from_config`].

#![deny(missing_docs, unsafe_code)]

pub mod address;
pub mod config;
mod error;
pub mod message;
pub mod transport;

use std::path::Path;

pub use crate::{
    address::{Address, Envelope},
    error::{Category, Error},
    message::Message,
    transport::{smtp::SmtpTransport, Sender, Transport},
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reads the message file at `path` and sends it with `transport`.
///
/// The envelope is extracted and validated before the transport is used, so a malformed
/// message never opens a connection.
pub fn send_file<T, P>(transport: &T, path: P) -> Result<T::Ok, Error>
where
    T: Transport,
    P: AsRef<Path>,
    Error: From<T::Error>,
{
    let message = Message::read(path)?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        from = %message.envelope().from(),
        to = %message.envelope().to(),
        "sending {}",
        message.path().map(|p| p.display().to_string()).unwrap_or_default()
    );

    Ok(transport.send(&message)?)
}
