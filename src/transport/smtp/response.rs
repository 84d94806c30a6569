//! SMTP reply, containing a mandatory 3-digit code and an optional text
//! message

use std::{
    fmt::{Display, Formatter, Result},
    result,
    str::FromStr,
};

use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, opt, rest, value},
    sequence::preceded,
    IResult, Parser,
};

use crate::transport::smtp::{error, Error};

/// The first digit indicates severity
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Severity {
    /// 2yx
    PositiveCompletion = 2,
    /// 3yz
    PositiveIntermediate = 3,
    /// 4yz
    TransientNegativeCompletion = 4,
    /// 5yz
    PermanentNegativeCompletion = 5,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", *self as u8)
    }
}

/// Second digit
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Category {
    /// x0z
    Syntax = 0,
    /// x1z
    Information = 1,
    /// x2z
    Connections = 2,
    /// x3z
    Unspecified3 = 3,
    /// x4z
    Unspecified4 = 4,
    /// x5z
    MailSystem = 5,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", *self as u8)
    }
}

/// The detail digit of a response code (third digit)
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Detail(u8);

impl Display for Detail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a 3 digit SMTP reply code
///
/// Codes are compared through their numeric value, which is the same as comparing the first
/// three characters of the reply line.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct Code {
    /// First digit of the response code
    pub severity: Severity,
    /// Second digit of the response code
    pub category: Category,
    /// Third digit
    pub detail: Detail,
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}{}{}", self.severity, self.category, self.detail)
    }
}

impl Code {
    /// Creates a new `Code` structure
    pub fn new(severity: Severity, category: Category, detail: u8) -> Code {
        Code {
            severity,
            category,
            detail: Detail(detail % 10),
        }
    }

    /// Tells if the response is positive
    pub fn is_positive(self) -> bool {
        matches!(
            self.severity,
            Severity::PositiveCompletion | Severity::PositiveIntermediate
        )
    }
}

impl From<Code> for u16 {
    fn from(code: Code) -> Self {
        code.detail.0 as u16 + 10 * code.category as u16 + 100 * code.severity as u16
    }
}

/// Contains an SMTP reply, with separated code and message
///
/// The text message is optional, only the code is mandatory
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Response {
    /// Response code
    code: Code,
    /// Server response string (optional)
    /// Handle multiline responses
    message: Vec<String>,
}

impl FromStr for Response {
    type Err = Error;

    fn from_str(s: &str) -> result::Result<Response, Error> {
        let mut reader = ResponseReader::default();
        for line in s.split_inclusive('\n') {
            if let Some(response) = reader.feed(line)? {
                return Ok(response);
            }
        }
        Err(error::response("incomplete response"))
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.code)?;
        if let Some(line) = self.first_line() {
            write!(f, " {line}")?;
        }
        Ok(())
    }
}

impl Response {
    /// Creates a new `Response`
    pub fn new(code: Code, message: Vec<String>) -> Response {
        Response { code, message }
    }

    /// Tells if the response is positive
    pub fn is_positive(&self) -> bool {
        self.code.is_positive()
    }

    /// Tests code equality
    pub fn has_code(&self, code: u16) -> bool {
        u16::from(self.code) == code
    }

    /// Returns only the line of the message if possible
    pub fn first_line(&self) -> Option<&str> {
        self.message.first().map(String::as_str)
    }

    /// Response code
    pub fn code(&self) -> Code {
        self.code
    }

    /// Server response string (array of lines)
    pub fn message(&self) -> impl Iterator<Item = &str> {
        self.message.iter().map(String::as_str)
    }
}

/// Collects reply lines until the final one
///
/// Continuation lines (`250-...`) must carry the same code as the final line (`250 ...`).
#[derive(Default, Debug)]
pub(crate) struct ResponseReader {
    code: Option<Code>,
    message: Vec<String>,
}

impl ResponseReader {
    /// Feeds one line, line break included, and returns the reply once complete
    pub(crate) fn feed(&mut self, line: &str) -> result::Result<Option<Response>, Error> {
        let line = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);

        let (_, (code, more, text)) = parse_reply_line(line)
            .map_err(|_| error::response(format!("malformed reply line {line:?}")))?;

        if self.code.is_some_and(|c| c != code) {
            return Err(error::response(format!(
                "reply code changed within a reply: {line:?}"
            )));
        }
        self.code = Some(code);
        self.message.push(text.to_owned());

        if more {
            return Ok(None);
        }
        Ok(Some(Response {
            code,
            message: std::mem::take(&mut self.message),
        }))
    }
}

// Parsers (originally from tokio-smtp)

fn digit(i: &str) -> IResult<&str, u8> {
    map(nom::character::complete::satisfy(|c| c.is_ascii_digit()), |c| {
        c as u8 - b'0'
    })
    .parse(i)
}

fn parse_code(i: &str) -> IResult<&str, Code> {
    let (i, severity) = parse_severity(i)?;
    let (i, category) = parse_category(i)?;
    let (i, detail) = digit(i)?;
    Ok((
        i,
        Code {
            severity,
            category,
            detail: Detail(detail),
        },
    ))
}

fn parse_severity(i: &str) -> IResult<&str, Severity> {
    alt((
        value(Severity::PositiveCompletion, char('2')),
        value(Severity::PositiveIntermediate, char('3')),
        value(Severity::TransientNegativeCompletion, char('4')),
        value(Severity::PermanentNegativeCompletion, char('5')),
    ))
    .parse(i)
}

fn parse_category(i: &str) -> IResult<&str, Category> {
    alt((
        value(Category::Syntax, char('0')),
        value(Category::Information, char('1')),
        value(Category::Connections, char('2')),
        value(Category::Unspecified3, char('3')),
        value(Category::Unspecified4, char('4')),
        value(Category::MailSystem, char('5')),
    ))
    .parse(i)
}

/// Parses one reply line without its line break into code, continuation flag and text
///
/// Only the first three characters make the code. A `-` right after them marks a continuation
/// line, a single space is dropped, and whatever follows is the text.
pub(crate) fn parse_reply_line(i: &str) -> IResult<&str, (Code, bool, &str)> {
    let (i, code) = parse_code(i)?;
    let (i, (more, text)) = alt((
        map(preceded(char('-'), rest), |text| (true, text)),
        map(preceded(opt(char(' ')), rest), |text| (false, text)),
    ))
    .parse(i)?;
    Ok((i, (code, more, text)))
}

#[cfg(test)]
mod test {
    use super::*;

    fn code(n: u16) -> Code {
        let (_, code) = parse_code(&n.to_string()).unwrap();
        code
    }

    #[test]
    fn test_severity_fmt() {
        assert_eq!(format!("{}", Severity::PositiveCompletion), "2");
    }

    #[test]
    fn test_category_fmt() {
        assert_eq!(format!("{}", Category::Unspecified4), "4");
    }

    #[test]
    fn test_code_display() {
        let code = Code::new(
            Severity::TransientNegativeCompletion,
            Category::Connections,
            1,
        );

        assert_eq!(code.to_string(), "421");
    }

    #[test]
    fn test_code_to_u16() {
        let c: u16 = Code::new(Severity::PermanentNegativeCompletion, Category::MailSystem, 0).into();
        assert_eq!(c, 550);
        assert_eq!(u16::from(code(354)), 354);
    }

    #[test]
    fn test_reply_line() {
        assert_eq!(parse_reply_line("250 OK"), Ok(("", (code(250), false, "OK"))));
        assert_eq!(
            parse_reply_line("250-relay.example.org"),
            Ok(("", (code(250), true, "relay.example.org")))
        );
        assert_eq!(parse_reply_line("354"), Ok(("", (code(354), false, ""))));
        assert!(parse_reply_line("25").is_err());
        assert!(parse_reply_line("hello").is_err());
        assert!(parse_reply_line("650 OK").is_err());
    }

    #[test]
    fn test_reply_line_without_separator() {
        assert_eq!(parse_reply_line("250OK"), Ok(("", (code(250), false, "OK"))));
        assert_eq!(
            parse_reply_line("220\tready"),
            Ok(("", (code(220), false, "\tready")))
        );
        assert_eq!(parse_reply_line("2500 OK"), Ok(("", (code(250), false, "0 OK"))));
        assert!("250OK\r\n".parse::<Response>().unwrap().has_code(250));
    }

    #[test]
    fn test_response_from_str() {
        let raw_response = "250-me\r\n250-8BITMIME\r\n250-SIZE 42\r\n250 AUTH PLAIN CRAM-MD5\r\n";
        assert_eq!(
            raw_response.parse::<Response>().unwrap(),
            Response {
                code: code(250),
                message: vec![
                    "me".to_owned(),
                    "8BITMIME".to_owned(),
                    "SIZE 42".to_owned(),
                    "AUTH PLAIN CRAM-MD5".to_owned(),
                ],
            }
        );

        let wrong_code = "250-me\r\n251-8BITMIME\r\n250 SIZE 42\r\n";
        assert!(wrong_code.parse::<Response>().is_err());

        let wrong_end = "250-me\r\n250-8BITMIME\r\n";
        assert!(wrong_end.parse::<Response>().is_err());
    }

    #[test]
    fn test_response_bare_lf() {
        let response = "220 relay ready\n".parse::<Response>().unwrap();
        assert!(response.has_code(220));
        assert_eq!(response.first_line(), Some("relay ready"));
        assert_eq!(response.to_string(), "220 relay ready");
    }

    #[test]
    fn test_response_is_positive() {
        assert!(Response::new(code(250), vec![]).is_positive());
        assert!(Response::new(code(354), vec![]).is_positive());
        assert!(!Response::new(code(451), vec![]).is_positive());
    }

    #[test]
    fn test_response_has_code() {
        let response = Response::new(code(451), vec!["me".to_owned()]);
        assert!(response.has_code(451));
        assert!(!response.has_code(251));
    }

    #[test]
    fn test_response_first_line() {
        assert_eq!(
            Response::new(code(451), vec!["me mo".to_owned(), "SIZE 42".to_owned()]).first_line(),
            Some("me mo")
        );
        assert_eq!(Response::new(code(451), vec![]).first_line(), None);
    }
}
