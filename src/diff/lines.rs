use super::is_body_line;
use crate::{InputError, InputRole};
use std::borrow::Cow;
use std::io::BufRead;

/// One raw line of a diff, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based position in the stream
    pub number: usize,
    bytes: Vec<u8>,
}

impl Line {
    pub fn new(number: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            number,
            bytes: bytes.into(),
        }
    }

    /// Raw bytes exactly as read, including any `\n` or `\r\n`
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_body(&self) -> bool {
        is_body_line(&self.bytes)
    }

    /// The line without its terminator
    pub fn content(&self) -> &[u8] {
        let line = self.bytes.strip_suffix(b"\n").unwrap_or(self.bytes.as_slice());
        line.strip_suffix(b"\r").unwrap_or(line)
    }

    /// The line with surrounding ASCII whitespace removed
    pub fn trimmed(&self) -> &[u8] {
        self.bytes.trim_ascii()
    }

    /// Range token of a header candidate: the trimmed text before the first
    /// `c`, or the whole trimmed line if it has none.
    pub fn range_token(&self) -> &[u8] {
        let content = self.content();
        let head = match content.iter().position(|&b| b == b'c') {
            Some(idx) => &content[..idx],
            None => content,
        };
        head.trim_ascii()
    }

    /// Content as text, for messages
    pub fn lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.content())
    }
}

/// Reads a diff one raw line at a time, with a single line of push-back.
pub struct DiffLines<R> {
    reader: R,
    role: InputRole,
    line_number: usize,
    pending: Option<Line>,
}

impl<R: BufRead> DiffLines<R> {
    pub fn new(reader: R, role: InputRole) -> Self {
        Self {
            reader,
            role,
            line_number: 0,
            pending: None,
        }
    }

    /// Next line, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ReadFailed`] if the underlying reader fails.
    pub fn next_line(&mut self) -> Result<Option<Line>, InputError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        let mut bytes = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut bytes)
            .map_err(|e| InputError::ReadFailed {
                role: self.role,
                message: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        Ok(Some(Line {
            number: self.line_number,
            bytes,
        }))
    }

    /// Return a line so the next call to [`DiffLines::next_line`] yields it
    /// again. Only one line can be held back at a time.
    pub fn push_back(&mut self, line: Line) {
        debug_assert!(self.pending.is_none(), "push_back called twice");
        self.pending = Some(line);
    }

    /// Number of lines read from the underlying reader so far
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}
