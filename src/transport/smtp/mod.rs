//! The SMTP transport sends emails using the SMTP protocol.
//!
//! This is a deliberately small subset of [RFC 5321](https://tools.ietf.org/html/rfc5321),
//! aimed at handing one message to a relay email server, which takes care of delivering it.
//! There is no extension negotiation, no TLS and no authentication.
//!
//! A transaction is the following exchange:
//!
//! ```text
//! S: 220 relay.example.org ready
//! C: HELO example.com
//! S: 250 relay.example.org
//! C: MAIL FROM:sender@example.com
//! S: 250 OK
//! C: RCPT TO:rcpt@example.org
//! S: 250 OK
//! C: DATA
//! S: 354 End data with <CR><LF>.<CR><LF>
//! C: <message lines>
//! C: .
//! S: 250 OK
//! C: QUIT
//! ```
//!
//! A step answered with an unexpected reply is sent once more with its parameter wrapped in
//! angle brackets (`MAIL FROM:<sender@example.com>`), as some relays require it. A `503` reply
//! to `HELO`, `MAIL FROM` or `RCPT TO` means the step was already done and is accepted. A `550`
//! reply to the message is reported as a rejection, see [`Error::is_rejection`].
//!
//! #### Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use mailsender::{Message, SmtpTransport, Transport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let message = Message::parse("From: nobody@domain.tld\nTo: hei@domain.tld\n\nBe happy!\n")?;
//!
//! let sender = SmtpTransport::builder("relay.domain.tld")
//!     .timeout(Some(Duration::from_secs(10)))
//!     .build();
//!
//! let response = sender.send(&message)?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

pub use self::{
    error::Error,
    response::Response,
    transport::{SmtpTransport, SmtpTransportBuilder},
};

pub mod client;
pub mod commands;
pub(crate) mod error;
pub mod response;
mod transport;

// Registered port numbers:
// https://www.iana.org/assignments/service-names-port-numbers/service-names-port-numbers.xhtml

/// Default smtp port
pub const SMTP_PORT: u16 = 25;

/// Default timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
