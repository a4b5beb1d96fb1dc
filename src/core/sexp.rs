//! Cursor-based reader for canonical S-expressions.
//!
//! Canonical form is a length-prefixed nested list serialization: an atom is
//! an ASCII decimal length and a colon followed by exactly that many payload
//! bytes; a list is `(`, zero or more values, `)`. Payloads are binary-clean
//! and there is no whitespace.
//!
//! The reader never allocates and never normalizes. It only advances a
//! position over a borrowed byte view, so byte offsets taken from the cursor
//! stay valid for the lifetime of the input. Higher layers use those offsets
//! to splice verbatim spans out of a key; the integrity code is computed over
//! such spans, which is why nothing here may re-serialize.

use crate::core::error::{KeywardError, KeywardResult};

/// A non-allocating cursor over a canonical S-expression buffer.
///
/// Every read is bounds-checked; running off the end of a truncated buffer
/// reports `InvalidSexp` rather than panicking.
#[derive(Debug, Clone, Copy)]
pub struct SexpCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SexpCursor<'a> {
    /// Creates a cursor at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a cursor positioned at `pos` within `buf`.
    #[must_use]
    pub fn at_offset(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current byte offset from the start of the underlying buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the byte at the cursor without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// True when the cursor sits on `byte`.
    #[must_use]
    pub fn at(&self, byte: u8) -> bool {
        self.peek() == Some(byte)
    }

    /// Consumes `byte` or fails with `InvalidSexp`.
    pub fn expect(&mut self, byte: u8) -> KeywardResult<()> {
        if self.at(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(KeywardError::InvalidSexp)
        }
    }

    /// Advances the cursor by `n` bytes, which must all exist.
    pub fn advance(&mut self, n: usize) -> KeywardResult<()> {
        let end = self.pos.checked_add(n).ok_or(KeywardError::InvalidSexp)?;
        if end > self.buf.len() {
            return Err(KeywardError::InvalidSexp);
        }
        self.pos = end;
        Ok(())
    }

    /// Reads an atom's length prefix and consumes the trailing colon.
    ///
    /// Empty lengths and zero lengths are rejected, as are lengths that do
    /// not fit in `usize`.
    pub fn read_length(&mut self) -> KeywardResult<usize> {
        let mut n = 0usize;
        let start = self.pos;
        while let Some(c @ b'0'..=b'9') = self.peek() {
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(usize::from(c - b'0')))
                .ok_or(KeywardError::InvalidSexp)?;
            self.pos += 1;
        }
        if n == 0 || self.pos == start || !self.at(b':') {
            return Err(KeywardError::InvalidSexp);
        }
        self.pos += 1;
        Ok(n)
    }

    /// Takes the next `n` bytes as a payload slice.
    pub fn take(&mut self, n: usize) -> KeywardResult<&'a [u8]> {
        let start = self.pos;
        self.advance(n)?;
        Ok(&self.buf[start..self.pos])
    }

    /// Reads a complete atom and returns its payload.
    pub fn atom(&mut self) -> KeywardResult<&'a [u8]> {
        let n = self.read_length()?;
        self.take(n)
    }

    /// Compares the next `len` bytes against `token`.
    ///
    /// On a match the cursor advances past the token and `true` is returned;
    /// otherwise the cursor is left untouched.
    pub fn match_token(&mut self, len: usize, token: &[u8]) -> bool {
        if len != token.len() {
            return false;
        }
        let Some(end) = self.pos.checked_add(len) else {
            return false;
        };
        if end > self.buf.len() || &self.buf[self.pos..end] != token {
            return false;
        }
        self.pos = end;
        true
    }

    /// Skips forward until `depth` open lists have been closed.
    ///
    /// Pass the number of currently-open lists to skip the remainder of an
    /// expression from the middle of it.
    pub fn skip(&mut self, mut depth: usize) -> KeywardResult<()> {
        while depth > 0 {
            match self.peek() {
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(_) => {
                    let n = self.read_length()?;
                    self.advance(n)?;
                }
                None => return Err(KeywardError::InvalidSexp),
            }
        }
        Ok(())
    }
}

/// Total byte length of the complete canonical value starting at `buf[0]`.
///
/// The value must be a list. Returns 0 when the buffer does not begin with a
/// well-formed value; trailing bytes after the value are ignored.
#[must_use]
pub fn canon_len(buf: &[u8]) -> usize {
    let mut cur = SexpCursor::new(buf);
    if !cur.at(b'(') {
        return 0;
    }
    let mut depth = 0usize;
    loop {
        match cur.peek() {
            Some(b'(') => {
                depth += 1;
                cur.pos += 1;
            }
            Some(b')') => {
                if depth == 0 {
                    return 0;
                }
                depth -= 1;
                cur.pos += 1;
                if depth == 0 {
                    return cur.pos;
                }
            }
            Some(_) => {
                let Ok(n) = cur.read_length() else {
                    return 0;
                };
                if cur.advance(n).is_err() {
                    return 0;
                }
            }
            None => return 0,
        }
    }
}
