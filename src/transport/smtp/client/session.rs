use std::io::{BufRead, BufReader, Read, Write};

#[cfg(feature = "tracing")]
use super::escape_crlf;
use super::{ClientCodec, SessionState};
use crate::{
    address::Envelope,
    transport::smtp::{
        commands::Command,
        error::{self, Error},
        response::{Response, ResponseReader},
    },
};

/// Longest reply line accepted from the relay, line break included
const MAX_REPLY_LINE: u64 = 64 * 1024;

/// One SMTP mail transaction over a connected stream
///
/// Each step writes one command and reads one reply. A step answered with an unexpected reply
/// is sent once more with its parameter wrapped in angle brackets, and a second unexpected
/// reply ends the transaction. `QUIT` is written at the end of every transaction, successful or
/// not, and its reply is never read.
pub struct SmtpSession<S: Read + Write> {
    /// Stream between client and relay
    stream: BufReader<S>,
    /// Protocol state
    state: SessionState,
    /// Whether QUIT has been sent
    sent_quit: bool,
}

impl<S: Read + Write> SmtpSession<S> {
    /// Creates a session over a freshly connected stream
    pub fn new(stream: S) -> Self {
        SmtpSession {
            stream: BufReader::new(stream),
            state: SessionState::Connected,
            sent_quit: false,
        }
    }

    /// Current protocol state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Gets a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    /// Gets a mutable reference to the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        self.stream.get_mut()
    }

    /// Gives the underlying stream back, for the caller to close it
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    /// Runs the transaction for `email` and ends it with `QUIT`
    ///
    /// Returns the relay reply to the end of data marker.
    pub fn send(&mut self, envelope: &Envelope, email: &[u8]) -> Result<Response, Error> {
        let result = self.transaction(envelope, email);

        match result {
            Ok(ref _response) => {
                #[cfg(feature = "tracing")]
                tracing::info!("message accepted: {}", _response);
                self.quit();
                self.set_state(SessionState::Closed);
            }
            Err(ref err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("transaction failed: {}", err);
                self.quit();
                self.set_state(if err.is_rejection() {
                    SessionState::Rejected
                } else {
                    SessionState::Error
                });
            }
        }

        result
    }

    fn transaction(&mut self, envelope: &Envelope, email: &[u8]) -> Result<Response, Error> {
        self.greeting()?;
        self.set_state(SessionState::Greeted);

        self.command(Command::helo(envelope.helo_domain()))?;
        self.set_state(SessionState::HeloAck);

        self.command(Command::mail(envelope.from()))?;
        self.set_state(SessionState::MailFromAck);

        self.command(Command::rcpt(envelope.to()))?;
        self.set_state(SessionState::RcptToAck);

        self.command(Command::data())?;
        self.set_state(SessionState::DataAck);

        let response = self.message(email)?;
        self.set_state(SessionState::Transferred);
        Ok(response)
    }

    /// Reads the relay greeting, which is not retried
    fn greeting(&mut self) -> Result<Response, Error> {
        let response = self.read_response()?;
        if response.has_code(220) {
            Ok(response)
        } else {
            Err(error::protocol(
                Some(response.code()),
                format!("expected a 220 greeting, got {response}"),
            ))
        }
    }

    /// Sends an SMTP command, and its bracketed form once if the first reply does not fit
    pub fn command(&mut self, command: Command) -> Result<Response, Error> {
        match self.exchange(&command) {
            Err(_err) if _err.is_protocol() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{} failed ({}), retrying once", command.verb(), _err);
            }
            result => return result,
        }

        self.exchange(&command.bracketed())
    }

    fn exchange(&mut self, command: &Command) -> Result<Response, Error> {
        self.write(command.to_string().as_bytes())?;
        let response = self.read_response()?;

        if command.accepts(&response) {
            Ok(response)
        } else {
            Err(error::protocol(
                Some(response.code()),
                format!(
                    "{} expected {}, got {}",
                    command.verb(),
                    command.expected(),
                    response
                ),
            ))
        }
    }

    /// Sends the message content and reads the final reply
    pub fn message(&mut self, message: &[u8]) -> Result<Response, Error> {
        let codec = ClientCodec::new();
        let mut out_buf = Vec::with_capacity(message.len() + 5);
        codec.encode(message, &mut out_buf);
        self.write(out_buf.as_slice())?;

        let response = self.read_response()?;
        if response.has_code(250) {
            Ok(response)
        } else if response.has_code(550) {
            Err(error::rejected(response.code(), response.to_string()))
        } else {
            Err(error::protocol(
                Some(response.code()),
                format!("message not accepted: {response}"),
            ))
        }
    }

    /// Writes QUIT without waiting for the reply
    fn quit(&mut self) {
        if self.sent_quit {
            return;
        }
        self.sent_quit = true;

        if let Err(_err) = self.write(Command::quit().to_string().as_bytes()) {
            #[cfg(feature = "tracing")]
            tracing::debug!("could not send QUIT: {}", _err);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        #[cfg(feature = "tracing")]
        tracing::trace!("session state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Writes a string to the server
    fn write(&mut self, string: &[u8]) -> Result<(), Error> {
        self.stream
            .get_mut()
            .write_all(string)
            .map_err(error::network)?;
        self.stream.get_mut().flush().map_err(error::network)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(">> {}", escape_crlf(&String::from_utf8_lossy(string)));
        Ok(())
    }

    /// Gets the SMTP response
    ///
    /// The end of the stream, an overlong line and a malformed line are all response errors.
    pub fn read_response(&mut self) -> Result<Response, Error> {
        let mut reader = ResponseReader::default();
        let mut buffer = Vec::with_capacity(100);

        loop {
            buffer.clear();
            let read = (&mut self.stream)
                .take(MAX_REPLY_LINE)
                .read_until(b'\n', &mut buffer)
                .map_err(error::network)?;

            if read == 0 {
                return Err(error::response("connection closed before a complete reply"));
            }
            if read as u64 == MAX_REPLY_LINE && !buffer.ends_with(b"\n") {
                return Err(error::response("reply line too long"));
            }

            let line = String::from_utf8_lossy(&buffer);
            #[cfg(feature = "tracing")]
            tracing::debug!("<< {}", escape_crlf(&line));

            if let Some(response) = reader.feed(&line)? {
                return Ok(response);
            }
        }
    }
}
