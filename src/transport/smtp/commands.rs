//! SMTP commands

use std::fmt::{self, Display, Formatter};

use crate::{transport::smtp::response::Response, Address};

/// Reply code accepted by `HELO`, `MAIL` and `RCPT` when the step was already done
const ALREADY_DONE: u16 = 503;

/// Command keyword
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verb {
    /// HELO command
    Helo,
    /// MAIL command
    Mail,
    /// RCPT command
    Rcpt,
    /// DATA command
    Data,
    /// QUIT command
    Quit,
}

impl Verb {
    /// Text written before the parameter
    pub fn keyword(self) -> &'static str {
        match self {
            Verb::Helo => "HELO ",
            Verb::Mail => "MAIL FROM:",
            Verb::Rcpt => "RCPT TO:",
            Verb::Data => "DATA",
            Verb::Quit => "QUIT",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Helo => "HELO",
            Verb::Mail => "MAIL",
            Verb::Rcpt => "RCPT",
            Verb::Data => "DATA",
            Verb::Quit => "QUIT",
        })
    }
}

/// One protocol step: a verb, its optional parameter and the reply code it waits for
///
/// The parameter is written bare, or wrapped in `<` and `>` once [`Command::bracketed`] has
/// been called, which is how the single retry of a step is sent.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    verb: Verb,
    parameter: Option<String>,
    expected: u16,
    bracketed: bool,
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb.keyword())?;
        match (&self.parameter, self.bracketed) {
            (Some(parameter), true) => write!(f, "<{parameter}>")?,
            (Some(parameter), false) => f.write_str(parameter)?,
            (None, _) => {}
        }
        f.write_str("\r\n")
    }
}

impl Command {
    fn new(verb: Verb, parameter: Option<String>, expected: u16) -> Command {
        Command {
            verb,
            parameter,
            expected,
            bracketed: false,
        }
    }

    /// Creates a HELO command announcing `domain`
    pub fn helo<D: Into<String>>(domain: D) -> Command {
        Command::new(Verb::Helo, Some(domain.into()), 250)
    }

    /// Creates a MAIL command for the sender
    pub fn mail(sender: &Address) -> Command {
        Command::new(Verb::Mail, Some(sender.to_string()), 250)
    }

    /// Creates a RCPT command for the recipient
    pub fn rcpt(recipient: &Address) -> Command {
        Command::new(Verb::Rcpt, Some(recipient.to_string()), 250)
    }

    /// Creates a DATA command
    pub fn data() -> Command {
        Command::new(Verb::Data, None, 354)
    }

    /// Creates a QUIT command
    ///
    /// The reply to QUIT is never read, so the expected code is informative only.
    pub fn quit() -> Command {
        Command::new(Verb::Quit, None, 221)
    }

    /// Same command with its parameter wrapped in angle brackets
    pub fn bracketed(mut self) -> Command {
        self.bracketed = true;
        self
    }

    /// Command keyword
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Reply code completing the step
    pub fn expected(&self) -> u16 {
        self.expected
    }

    /// Tells if `response` completes the step
    pub fn accepts(&self, response: &Response) -> bool {
        response.has_code(self.expected)
            || (matches!(self.verb, Verb::Helo | Verb::Mail | Verb::Rcpt)
                && response.has_code(ALREADY_DONE))
    }
}
