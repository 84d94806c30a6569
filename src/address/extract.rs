//! Envelope extraction from the header block of a raw message
//!
//! The header is scanned for `From:` and `To:` labels (case-insensitive). A label is recognized
//! by the characters right before a colon, so `Reply-To:` also counts as a `To:` field, and
//! when a label appears more than once the last occurrence wins.

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use super::{Address, AddressError, Envelope};

/// Characters ending an unbracketed address
const VALUE_TERMINATORS: [char; 5] = [' ', '\n', ':', ',', '\r'];

/// Header field an address was read from
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Field {
    /// The `From:` field, used as envelope sender
    From,
    /// The `To:` field, used as envelope recipient
    To,
}

impl Field {
    fn label(self) -> &'static [u8] {
        match self {
            Field::From => b"From",
            Field::To => b"To",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Field::From => f.write_str("From"),
            Field::To => f.write_str("To"),
        }
    }
}

/// Returns the header block of `text`
///
/// The header runs up to the first blank line. Without a blank line the whole text is the
/// header.
pub fn header_block(text: &str) -> &str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let is_blank = line.trim_end_matches(['\r', '\n']).is_empty() && line.ends_with('\n');
        if is_blank && offset > 0 {
            return &text[..offset];
        }
        offset += line.len();
    }
    text
}

/// Extracts and validates the envelope of a raw message
///
/// # Examples
///
/// ```
/// use mailsender::address::extract_envelope;
///
/// let envelope = extract_envelope("From: a@b.com\nTo: <c@d.com>\n\nHello\n").unwrap();
/// assert_eq!(envelope.from().as_ref(), "a@b.com");
/// assert_eq!(envelope.to().as_ref(), "c@d.com");
/// ```
pub fn extract_envelope(text: &str) -> Result<Envelope, ExtractError> {
    let header = header_block(text);
    if header.trim().is_empty() {
        return Err(ExtractError::HeaderMissing);
    }

    let (from, to) = scan_header(header);
    let from = from
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::AddressNotFound(Field::From))?;
    let to = to
        .filter(|v| !v.is_empty())
        .ok_or(ExtractError::AddressNotFound(Field::To))?;

    let from = validate(from, Field::From)?;
    let to = validate(to, Field::To)?;
    Ok(Envelope::new(from, to))
}

fn validate(value: &str, field: Field) -> Result<Address, ExtractError> {
    Address::validate(value).map_err(|source| ExtractError::AddressSyntax { field, source })
}

/// Finds the raw `From` and `To` values, brackets stripped
fn scan_header(header: &str) -> (Option<&str>, Option<&str>) {
    let bytes = header.as_bytes();
    let mut from = None;
    let mut to = None;

    for (colon, _) in header.match_indices(':') {
        if has_label(bytes, colon, Field::From) {
            from = Some(field_value(&header[colon + 1..]));
        } else if has_label(bytes, colon, Field::To) {
            to = Some(field_value(&header[colon + 1..]));
        }
    }

    (from, to)
}

fn has_label(bytes: &[u8], colon: usize, field: Field) -> bool {
    let label = field.label();
    colon
        .checked_sub(label.len())
        .and_then(|start| bytes.get(start..colon))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(label))
}

fn field_value(rest: &str) -> &str {
    let rest = rest.trim_start_matches(' ');

    let value = match rest.strip_prefix('<').and_then(|inner| inner.find('>')) {
        // `find` ran on the text after '<', so the '>' sits one byte further in `rest`
        Some(close) => &rest[..close + 2],
        None => {
            let end = rest.find(VALUE_TERMINATORS).unwrap_or(rest.len());
            &rest[..end]
        }
    };

    value
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(value)
}

/// Failure to obtain a valid envelope from a message
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExtractError {
    /// The message has no header block
    HeaderMissing,
    /// No address, or an empty one, was found for the field
    AddressNotFound(Field),
    /// The address of the field breaks the address grammar
    AddressSyntax {
        /// Field holding the address
        field: Field,
        /// Violated rule
        source: AddressError,
    },
}

impl Display for ExtractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::HeaderMissing => f.write_str("message has no header block"),
            ExtractError::AddressNotFound(field) => {
                write!(f, "no address found in the {field} field")
            }
            ExtractError::AddressSyntax { field, source } => {
                write!(f, "invalid {field} address: {source}")
            }
        }
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExtractError::AddressSyntax { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pair(text: &str) -> (String, String) {
        let envelope = extract_envelope(text).unwrap();
        (envelope.from().to_string(), envelope.to().to_string())
    }

    #[test]
    fn simple_header() {
        assert_eq!(
            pair("From: a@b.com\nTo: c@d.com\n\nbody\n"),
            ("a@b.com".to_owned(), "c@d.com".to_owned())
        );
    }

    #[test]
    fn bracketed_and_bare_addresses_are_equal() {
        let bracketed = extract_envelope("From: <a@b.com>\nTo: <c@d.com>\n\n").unwrap();
        let bare = extract_envelope("From: a@b.com\nTo: c@d.com\n\n").unwrap();
        assert_eq!(bracketed, bare);
        assert_eq!(bracketed.from().as_ref(), "a@b.com");
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(
            pair("FROM:a@b.com\r\nto:   c@d.com\r\n\r\nbody"),
            ("a@b.com".to_owned(), "c@d.com".to_owned())
        );
    }

    #[test]
    fn value_terminators() {
        assert_eq!(
            pair("From: a@b.com, x@y.com\nTo: c@d.com (Carl)\n\n"),
            ("a@b.com".to_owned(), "c@d.com".to_owned())
        );
        assert_eq!(
            pair("From: a@b.com\r\nTo: c@d.com\r\n\r\n"),
            ("a@b.com".to_owned(), "c@d.com".to_owned())
        );
    }

    #[test]
    fn header_without_blank_line() {
        assert_eq!(
            pair("From: a@b.com\nTo: c@d.com"),
            ("a@b.com".to_owned(), "c@d.com".to_owned())
        );
    }

    #[test]
    fn body_fields_are_ignored() {
        let err = extract_envelope("From: a@b.com\n\nTo: c@d.com\n").unwrap_err();
        assert_eq!(err, ExtractError::AddressNotFound(Field::To));
    }

    #[test]
    fn header_block_boundaries() {
        assert_eq!(header_block("A: b\n\nbody"), "A: b\n");
        assert_eq!(header_block("A: b\r\n\r\nbody"), "A: b\r\n");
        assert_eq!(header_block("A: b"), "A: b");
        assert_eq!(header_block(""), "");
    }

    #[test]
    fn missing_header() {
        assert_eq!(extract_envelope(""), Err(ExtractError::HeaderMissing));
        assert_eq!(
            extract_envelope("\n\nFrom: a@b.com\nTo: c@d.com\n"),
            Err(ExtractError::HeaderMissing)
        );
    }

    #[test]
    fn missing_addresses() {
        assert_eq!(
            extract_envelope("Subject: hi\nTo: c@d.com\n\n"),
            Err(ExtractError::AddressNotFound(Field::From))
        );
        assert_eq!(
            extract_envelope("From: a@b.com\nTo:\n\n"),
            Err(ExtractError::AddressNotFound(Field::To))
        );
    }

    #[test]
    fn label_at_start_of_header() {
        // Too few characters before the first colon to hold a label
        assert_eq!(
            extract_envelope(":x\nFrom: a@b.com\nTo: c@d.com\n"),
            Ok(Envelope::new(
                "a@b.com".parse().unwrap(),
                "c@d.com".parse().unwrap()
            ))
        );
    }

    #[test]
    fn invalid_address_reports_rule() {
        assert_eq!(
            extract_envelope("From: a..b@c.com\nTo: c@d.com\n\n"),
            Err(ExtractError::AddressSyntax {
                field: Field::From,
                source: AddressError::ConsecutiveDot,
            })
        );
        assert_eq!(
            extract_envelope("From: a@b.com\nTo: Carl <c@d.com>\n\n"),
            Err(ExtractError::AddressSyntax {
                field: Field::To,
                source: AddressError::Length,
            })
        );
    }

    #[test]
    fn last_label_wins() {
        assert_eq!(
            pair("From: a@b.com\nTo: c@d.com\nReply-To: e@f.com\n\n"),
            ("a@b.com".to_owned(), "e@f.com".to_owned())
        );
    }

    #[test]
    fn unbalanced_bracket() {
        assert_eq!(
            extract_envelope("From: <a@b.com\nTo: c@d.com\n\n"),
            Err(ExtractError::AddressSyntax {
                field: Field::From,
                source: AddressError::LocalChar,
            })
        );
    }
}
