use std::time::Duration;

use super::{
    client::{NetworkStream, SmtpSession},
    error, Error, Response, DEFAULT_TIMEOUT, SMTP_PORT,
};
use crate::{address::Envelope, Transport};

/// Sends emails using the SMTP protocol
///
/// Every send opens a new connection, runs one transaction and closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpTransport {
    info: SmtpInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SmtpInfo {
    /// Name of the relay
    server: String,
    /// Port to connect to
    port: u16,
    /// Deadline for the connection and every read and write
    timeout: Option<Duration>,
}

impl Default for SmtpInfo {
    fn default() -> Self {
        Self {
            server: "localhost".to_owned(),
            port: SMTP_PORT,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl Transport for SmtpTransport {
    type Ok = Response;
    type Error = Error;

    /// Sends an email
    fn send_raw(&self, envelope: &Envelope, email: &[u8]) -> Result<Self::Ok, Self::Error> {
        let mut stream = NetworkStream::connect(&self.info.server, self.info.port, self.info.timeout)?;
        stream.set_timeout(self.info.timeout).map_err(error::network)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "connected to {}:{} ({:?})",
            self.info.server,
            self.info.port,
            stream.peer_addr().ok()
        );

        let mut session = SmtpSession::new(stream);
        let result = session.send(envelope, email);

        if let Err(_err) = session.into_inner().shutdown() {
            #[cfg(feature = "tracing")]
            tracing::debug!("error closing the connection: {}", _err);
        }

        result
    }
}

impl SmtpTransport {
    /// Creates a new local SMTP client to port 25
    ///
    /// Shortcut for local unencrypted relay (typical local email daemon that will handle relaying)
    pub fn unencrypted_localhost() -> SmtpTransport {
        Self::builder("localhost").build()
    }

    /// Creates a new SMTP client
    ///
    /// Defaults are:
    ///
    /// * No authentication
    /// * No TLS
    /// * A 60-seconds timeout for the connection and every read and write
    /// * Port 25
    pub fn builder<T: Into<String>>(server: T) -> SmtpTransportBuilder {
        SmtpTransportBuilder::new(server)
    }

    /// Name of the relay
    pub fn server(&self) -> &str {
        &self.info.server
    }

    /// Port of the relay
    pub fn port(&self) -> u16 {
        self.info.port
    }

    /// Deadline for the connection and every read and write
    pub fn timeout(&self) -> Option<Duration> {
        self.info.timeout
    }
}

/// Contains client configuration.
/// Instances of this struct can be created using functions of [`SmtpTransport`].
#[derive(Debug, Clone)]
pub struct SmtpTransportBuilder {
    info: SmtpInfo,
}

impl SmtpTransportBuilder {
    // Create new builder with default parameters
    pub(crate) fn new<T: Into<String>>(server: T) -> Self {
        let new = SmtpInfo {
            server: server.into(),
            ..Default::default()
        };

        Self { info: new }
    }

    /// Set the timeout duration
    ///
    /// `None` lets the connection and every read and write block until the relay answers,
    /// possibly forever.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.info.timeout = timeout;
        self
    }

    /// Set the port to use
    pub fn port(mut self, port: u16) -> Self {
        self.info.port = port;
        self
    }

    /// Build the transport
    pub fn build(self) -> SmtpTransport {
        SmtpTransport { info: self.info }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_defaults() {
        let transport = SmtpTransport::builder("relay.example.org").build();
        assert_eq!(transport.server(), "relay.example.org");
        assert_eq!(transport.port(), 25);
        assert_eq!(transport.timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(SmtpTransport::unencrypted_localhost().server(), "localhost");
    }

    #[test]
    fn builder_settings() {
        let transport = SmtpTransport::builder("relay.example.org")
            .port(2525)
            .timeout(None)
            .build();
        assert_eq!(transport.port(), 2525);
        assert_eq!(transport.timeout(), None);
    }
}
