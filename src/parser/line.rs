//! Read logical lines from a feed.
//!
//! Physical lines starting with a space or a tab continue the previous line
//! (RFC 5545 folding). Unfolding happens on bytes, before UTF-8 decoding,
//! since producers may fold in the middle of a multi-octet character.
//! Both `\r\n` and bare `\n` endings are accepted and blank lines are skipped.
//! Bytes that are not valid UTF-8 decode to U+FFFD.

use std::fmt;
use std::io::BufRead;

use super::ParserError;

/// One unfolded line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub inner: String,
    number: usize,
}

impl Line {
    /// Physical line number (1-based) where this line starts.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

pub struct LineReader<R: BufRead> {
    reader: R,
    pending: Option<(usize, Vec<u8>)>,
    physical: usize,
}

impl<'a> LineReader<&'a [u8]> {
    pub fn from_slice(slice: &'a [u8]) -> Self {
        Self::new(slice)
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        LineReader {
            reader,
            pending: None,
            physical: 0,
        }
    }

    /// Physical lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.physical
    }

    fn read_physical(&mut self) -> Result<Option<(usize, Vec<u8>)>, ParserError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.physical += 1;
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(Some((self.physical, buf)))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Line, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (number, mut bytes) = loop {
            let next = match self.pending.take() {
                Some(pending) => pending,
                None => match self.read_physical() {
                    Ok(Some(line)) => line,
                    Ok(None) => return None,
                    Err(err) => return Some(Err(err)),
                },
            };
            if !next.1.is_empty() {
                break next;
            }
        };

        // Pull in continuation lines
        loop {
            match self.read_physical() {
                Ok(Some((_, cont))) if cont.starts_with(b" ") || cont.starts_with(b"\t") => {
                    bytes.extend_from_slice(&cont[1..]);
                }
                Ok(Some(other)) => {
                    self.pending = Some(other);
                    break;
                }
                Ok(None) => break,
                Err(err) => return Some(Err(err)),
            }
        }

        let inner = match String::from_utf8(bytes) {
            Ok(inner) => inner,
            Err(err) => {
                tracing::warn!(line = number, "invalid UTF-8, replacing undecodable bytes");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        Some(Ok(Line { inner, number }))
    }
}
