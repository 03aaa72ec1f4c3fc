//! Pull-based character sources the scanner reads from.

use std::io::{self, BufRead};
use std::iter::Peekable;
use std::str::Chars;

use crate::{Error, ErrorKind, Result, Span};

/// A stream of characters that can be inspected one character ahead.
///
/// `offset` counts the characters consumed so far and is what error spans are measured in.
pub trait Source {
    /// Look at the next character without consuming it. `None` means end of input.
    fn peek(&mut self) -> Result<Option<char>>;

    /// Consume and return the next character.
    fn next(&mut self) -> Result<Option<char>>;

    fn offset(&self) -> usize;
}

/// In-memory source over a string slice. Never fails.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            offset: 0,
        }
    }
}

impl Source for StrSource<'_> {
    fn peek(&mut self) -> Result<Option<char>> {
        Ok(self.chars.peek().copied())
    }

    fn next(&mut self) -> Result<Option<char>> {
        let c = self.chars.next();
        if c.is_some() {
            self.offset += 1;
        }
        Ok(c)
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

/// Source over any buffered reader, decoding UTF-8 one character at a time so nothing past the
/// current value is pulled from the reader's buffer.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    peeked: Option<Option<char>>,
    offset: usize,
}

impl<R: BufRead> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            offset: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn io_error(&self, err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err), Span::point(self.offset))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_error(e)),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            return Ok(Some(byte));
        }
    }

    fn decode(&mut self) -> Result<Option<char>> {
        let Some(lead) = self.read_byte()? else {
            return Ok(None);
        };
        let width = match lead {
            0x00..=0x7f => return Ok(Some(char::from(lead))),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => return Err(self.invalid_utf8()),
        };

        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.read_byte()? {
                Some(byte) => *slot = byte,
                None => return Err(self.invalid_utf8()),
            }
        }

        match std::str::from_utf8(&buf[..width]) {
            Ok(s) => Ok(s.chars().next()),
            Err(_) => Err(self.invalid_utf8()),
        }
    }

    fn invalid_utf8(&self) -> Error {
        self.io_error(io::Error::new(
            io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ))
    }
}

impl<R: BufRead> Source for ReadSource<R> {
    fn peek(&mut self) -> Result<Option<char>> {
        if let Some(c) = self.peeked {
            return Ok(c);
        }
        let c = self.decode()?;
        self.peeked = Some(c);
        Ok(c)
    }

    fn next(&mut self) -> Result<Option<char>> {
        let c = match self.peeked.take() {
            Some(c) => c,
            None => self.decode()?,
        };
        if c.is_some() {
            self.offset += 1;
        }
        Ok(c)
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadSource, Source, StrSource};
    use crate::ErrorKind;

    fn drain(source: &mut impl Source) -> String {
        let mut out = String::new();
        while let Some(c) = source.next().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn str_source_counts_characters_not_bytes() {
        let mut source = StrSource::new("héllo");
        assert_eq!(source.peek().unwrap(), Some('h'));
        assert_eq!(source.offset(), 0);
        assert_eq!(drain(&mut source), "héllo");
        assert_eq!(source.offset(), 5);
        assert_eq!(source.peek().unwrap(), None);
    }

    #[test]
    fn read_source_decodes_multibyte_characters() {
        let input = "a☃😀b";
        let mut source = ReadSource::new(input.as_bytes());
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(drain(&mut source), input);
        assert_eq!(source.offset(), 4);
    }

    #[test]
    fn read_source_rejects_invalid_utf8() {
        let bytes: &[u8] = &[b'"', 0xff, b'"'];
        let mut source = ReadSource::new(bytes);
        assert_eq!(source.next().unwrap(), Some('"'));
        let err = source.next().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        assert_eq!(err.span().lo, 1);
    }

    #[test]
    fn read_source_rejects_truncated_sequence() {
        let bytes: &[u8] = &[0xe2, 0x98];
        let mut source = ReadSource::new(bytes);
        assert!(matches!(source.peek().unwrap_err().kind(), ErrorKind::Io(_)));
    }
}
