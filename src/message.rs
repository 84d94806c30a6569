//! Preformatted message files

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    address::{extract_envelope, Envelope, ExtractError},
    Error,
};

/// A message file loaded for one send attempt
///
/// The raw content is kept as read. The envelope is extracted from the header when the message
/// is loaded, so a `Message` always carries a valid sender and recipient.
#[derive(Debug, Clone)]
pub struct Message {
    path: Option<PathBuf>,
    raw: Vec<u8>,
    header_len: usize,
    envelope: Envelope,
}

impl Message {
    /// Reads the message file at `path`
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Message, Error> {
        let path = path.as_ref();
        let raw = fs::read(path)?;
        let mut message = Message::parse(raw)?;
        message.path = Some(path.to_path_buf());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "loaded {} ({} bytes, {} bytes of header)",
            path.display(),
            message.raw.len(),
            message.header_len
        );

        Ok(message)
    }

    /// Builds a message from raw content
    ///
    /// Bytes which are not valid UTF-8 are replaced before the header is scanned, which makes
    /// any address containing them invalid.
    pub fn parse<B: Into<Vec<u8>>>(raw: B) -> Result<Message, ExtractError> {
        let raw = raw.into();
        let text = String::from_utf8_lossy(&raw);
        let envelope = extract_envelope(&text)?;
        let header_len = header_len(&raw);
        Ok(Message {
            path: None,
            raw,
            header_len,
            envelope,
        })
    }

    /// File the message was read from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Envelope extracted from the header
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Complete message content, header block included
    pub fn formatted(&self) -> &[u8] {
        &self.raw
    }

    /// Header block, up to the blank line
    pub fn header(&self) -> &[u8] {
        &self.raw[..self.header_len]
    }

    /// Body, after the blank line
    pub fn body(&self) -> &[u8] {
        let rest = &self.raw[self.header_len..];
        let blank = if rest.starts_with(b"\r\n") {
            2
        } else if rest.starts_with(b"\n") {
            1
        } else {
            0
        };
        &rest[blank..]
    }
}

fn header_len(raw: &[u8]) -> usize {
    // Same scan as `header_block`, on bytes
    let mut offset = 0;
    for line in raw.split_inclusive(|b| *b == b'\n') {
        let content = line
            .strip_suffix(b"\n")
            .map(|l| l.strip_suffix(b"\r").unwrap_or(l));
        if content.is_some_and(<[u8]>::is_empty) && offset > 0 {
            return offset;
        }
        offset += line.len();
    }
    raw.len()
}
