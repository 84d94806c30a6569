//! SMTP client
//!
//! [`SmtpSession`] drives one mail transaction over any connected stream. The stream is usually
//! a [`NetworkStream`] opened with [`NetworkStream::connect`].

pub use self::{
    net::{resolve, NetworkStream},
    session::SmtpSession,
};

#[cfg(test)]
pub(crate) mod mock;
mod net;
mod session;

/// Position of a session in the mail transaction
///
/// States follow each other in declaration order. `Error` and `Rejected` can be reached from
/// any state after `Connected`.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SessionState {
    /// Stream opened, greeting not read yet
    Connected,
    /// `220` greeting received
    Greeted,
    /// `HELO` accepted
    HeloAck,
    /// `MAIL FROM` accepted
    MailFromAck,
    /// `RCPT TO` accepted
    RcptToAck,
    /// `DATA` accepted, the relay waits for the message
    DataAck,
    /// Message accepted by the relay
    Transferred,
    /// `QUIT` sent after a successful transfer
    Closed,
    /// Unexpected reply, malformed reply or i/o failure
    Error,
    /// Message refused with `550` after its transfer
    Rejected,
}

impl SessionState {
    /// Tells if the session cannot make progress anymore
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Closed | SessionState::Error | SessionState::Rejected
        )
    }
}

/// The codec used for transparency
///
/// Every line of the message is sent terminated with `<CRLF>`, whatever line ending it had in
/// the file. Lines starting with a `.` get a second one, and the end of data marker follows the
/// last line.
#[derive(Default, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientCodec;

impl ClientCodec {
    /// Creates a new client codec
    pub fn new() -> Self {
        ClientCodec
    }

    /// Adds transparency and the end of data marker
    ///
    /// The last line's `<CRLF>` is the first half of the `<CRLF>.<CRLF>` marker, so no blank
    /// line is added before the final dot. Without dot-stuffing a line holding a single `.`
    /// would end the data early.
    pub fn encode(&self, message: &[u8], buf: &mut Vec<u8>) {
        if !message.is_empty() {
            let message = message.strip_suffix(b"\n").unwrap_or(message);
            for line in message.split(|b| *b == b'\n') {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                if line.starts_with(b".") {
                    buf.push(b'.');
                }
                buf.extend_from_slice(line);
                buf.extend_from_slice(b"\r\n");
            }
        }
        buf.extend_from_slice(b".\r\n");
    }
}

/// Returns the string replacing all the CRLF with "\<CRLF\>"
/// Used for debug displays
#[cfg(feature = "tracing")]
pub(super) fn escape_crlf(string: &str) -> String {
    string.replace("\r\n", "<CRLF>")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn encode(message: &str) -> String {
        let mut buf = Vec::new();
        ClientCodec::new().encode(message.as_bytes(), &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_codec() {
        assert_eq!(encode("test\r\n"), "test\r\n.\r\n");
        assert_eq!(encode("test\n.\nend\n"), "test\r\n..\r\nend\r\n.\r\n");
        assert_eq!(encode(".test\r\n..\r\n"), "..test\r\n...\r\n.\r\n");
        assert_eq!(encode("te.st\nno newline"), "te.st\r\nno newline\r\n.\r\n");
        assert_eq!(encode("header\n\nbody\n"), "header\r\n\r\nbody\r\n.\r\n");
    }

    #[test]
    fn test_codec_empty() {
        assert_eq!(encode(""), ".\r\n");
        assert_eq!(encode("\n"), "\r\n.\r\n");
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Closed.is_terminal());
        assert!(SessionState::Rejected.is_terminal());
        assert!(!SessionState::Transferred.is_terminal());
    }

    #[test]
    #[cfg(feature = "tracing")]
    fn test_escape_crlf() {
        assert_eq!(escape_crlf("\r\n"), "<CRLF>");
        assert_eq!(escape_crlf("HELO my_name\r\n"), "HELO my_name<CRLF>");
        assert_eq!(
            escape_crlf("250-my_name\r\n250 SIZE 42\r\n"),
            "250-my_name<CRLF>250 SIZE 42<CRLF>"
        );
    }
}
