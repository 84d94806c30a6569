//! ## Transports for sending emails
//!
//! This module contains `Transport`s for sending emails. A `Transport` implements a high-level
//! API for sending emails. It automatically manages the underlying resources and doesn't require
//! any specific knowledge of email protocols in order to be used.
//!
//! ### Getting started
//!
//! Sending emails from your programs requires using an email relay, as client libraries are not
//! designed to handle email delivery by themselves. Depending on your infrastructure, your relay
//! could be:
//!
//! * a service from your Cloud or hosting provider
//! * an email server ([MTA] for Mail Transfer Agent, like Postfix or Exchange), running either
//!   locally on your servers or accessible over the network
//!
//! The relay settings are usually read from a [`RelayConfig`] and turned into a [`Sender`],
//! which picks the transport able to talk to that relay.
//!
//! ### Available transports
//!
//! | Module       | Protocol | Description                                            |
//! | ------------ | -------- | ------------------------------------------------------ |
//! | [`smtp`]     | SMTP     | Uses the SMTP protocol to send emails to a relay server |
//! | [`stub`]     | Debug    | Drops the email and records its envelope               |
//!
//! [MTA]: https://en.wikipedia.org/wiki/Message_transfer_agent
//! [`RelayConfig`]: crate::config::RelayConfig

use crate::{
    config::{RelayConfig, NO_AUTH},
    Envelope, Error, Message,
};

use self::smtp::{Response, SmtpTransport, SMTP_PORT};

pub mod smtp;
pub mod stub;

/// Blocking Transport method for emails
pub trait Transport {
    /// Response produced by the Transport
    type Ok;
    /// Error produced by the Transport
    type Error;

    /// Sends the email
    fn send(&self, message: &Message) -> Result<Self::Ok, Self::Error> {
        self.send_raw(message.envelope(), message.formatted())
    }

    /// Sends an email already formatted, with an explicit envelope
    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error>;
}

/// Transport selected from the relay settings
///
/// Only an unauthenticated relay on port 25 has a sender today, other settings are refused by
/// [`Sender::from_config`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Sender {
    /// Plain SMTP relay
    Smtp(SmtpTransport),
}

impl Sender {
    /// Picks the transport for `config`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedRelay`] unless the port is 25 and the authentication method
    /// is `"0"`.
    pub fn from_config(config: &RelayConfig) -> Result<Sender, Error> {
        if config.port == SMTP_PORT && config.auth_method == NO_AUTH {
            let transport = SmtpTransport::builder(config.host.as_str())
                .port(config.port)
                .timeout(config.timeout)
                .build();
            return Ok(Sender::Smtp(transport));
        }

        Err(Error::UnsupportedRelay {
            port: config.port,
            auth_method: config.auth_method.clone(),
        })
    }
}

impl Transport for Sender {
    type Ok = Response;
    type Error = Error;

    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        match self {
            Sender::Smtp(transport) => Ok(transport.send_raw(envelope, email)?),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::Category;

    #[test]
    fn smtp_sender_from_config() {
        let config = RelayConfig {
            timeout: Some(Duration::from_secs(5)),
            ..RelayConfig::new("relay.example.org")
        };

        let Sender::Smtp(transport) = Sender::from_config(&config).unwrap();
        assert_eq!(transport.server(), "relay.example.org");
        assert_eq!(transport.port(), 25);
        assert_eq!(transport.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn unsupported_relays() {
        let submission = RelayConfig {
            port: 587,
            ..RelayConfig::new("relay.example.org")
        };
        let err = Sender::from_config(&submission).unwrap_err();
        assert!(matches!(err, Error::UnsupportedRelay { port: 587, .. }));
        assert_eq!(err.category(), Category::Config);

        let authenticated = RelayConfig {
            auth_method: "plain".to_owned(),
            ..RelayConfig::new("relay.example.org")
        };
        assert!(matches!(
            Sender::from_config(&authenticated),
            Err(Error::UnsupportedRelay { port: 25, .. })
        ));
    }
}
