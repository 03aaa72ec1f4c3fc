//! Character-level lexing. The scanner knows nothing about target shapes; it only recognizes
//! whitespace, literals, quoted strings and numeric slices.

use crate::source::Source;
use crate::{Error, ErrorKind, Result, Span};

pub struct Scanner<S> {
    source: S,
}

impl<S: Source> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn peek(&mut self) -> Result<Option<char>> {
        self.source.peek()
    }

    pub fn next(&mut self) -> Result<Option<char>> {
        self.source.next()
    }

    pub fn offset(&self) -> usize {
        self.source.offset()
    }

    /// An error spanning from `lo` up to the current position.
    pub fn error_from(&self, lo: usize, kind: ErrorKind) -> Error {
        Error::new(kind, Span::new(lo, self.offset().max(lo)))
    }

    /// An error pointing at the current position.
    pub fn error_here(&self, kind: ErrorKind) -> Error {
        Error::new(kind, Span::point(self.offset()))
    }

    pub fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.source.peek()? {
            if !c.is_whitespace() {
                break;
            }
            self.source.next()?;
        }
        Ok(())
    }

    /// Consume exactly `text`, character by character, and hand back `result`.
    pub fn expect_literal<T>(&mut self, text: &'static str, result: T) -> Result<T> {
        let lo = self.offset();
        for expected in text.chars() {
            if self.source.next()? != Some(expected) {
                return Err(self.error_from(lo, ErrorKind::UnexpectedToken { expected: text }));
            }
        }
        Ok(result)
    }

    pub fn read_quoted_string(&mut self) -> Result<String> {
        let lo = self.offset();
        if self.source.peek()? != Some('"') {
            return Err(self.error_here(ErrorKind::ExpectedQuote));
        }
        self.source.next()?;

        let mut buf = String::new();
        loop {
            let Some(c) = self.source.next()? else {
                return Err(self.error_from(lo, ErrorKind::UnterminatedString));
            };
            match c {
                '"' => return Ok(buf),
                '\\' => self.read_escape(lo, &mut buf)?,
                c => buf.push(c),
            }
        }
    }

    /// Decode the character(s) following a backslash.
    fn read_escape(&mut self, lo: usize, buf: &mut String) -> Result<()> {
        let Some(c) = self.source.next()? else {
            return Err(self.error_from(lo, ErrorKind::UnterminatedString));
        };
        self.push_escaped(c, buf)
    }

    /// Unknown escape letters are kept verbatim, so `\q` reads as `q`.
    fn push_escaped(&mut self, c: char, buf: &mut String) -> Result<()> {
        let decoded = match c {
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0b}',
            'u' => return self.read_unicode_escape(buf),
            other => other,
        };
        buf.push(decoded);
        Ok(())
    }

    fn read_unicode_escape(&mut self, buf: &mut String) -> Result<()> {
        let (unit, digits) = self.read_hex4()?;
        let Some(unit) = unit else {
            buf.push('u');
            buf.push_str(&digits);
            return Ok(());
        };

        if !(0xd800..0xdc00).contains(&unit) {
            buf.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
            return Ok(());
        }

        // High surrogate: only combine when a `\uDC00..\uDFFF` escape follows right away.
        if self.source.peek()? != Some('\\') {
            buf.push(char::REPLACEMENT_CHARACTER);
            return Ok(());
        }
        self.source.next()?;
        if self.source.peek()? != Some('u') {
            buf.push(char::REPLACEMENT_CHARACTER);
            let Some(c) = self.source.next()? else {
                return Ok(());
            };
            return self.push_escaped(c, buf);
        }
        self.source.next()?;

        let (low, digits) = self.read_hex4()?;
        match low {
            Some(low) if (0xdc00..0xe000).contains(&low) => {
                let combined = 0x10000 + ((unit - 0xd800) << 10) + (low - 0xdc00);
                buf.push(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => {
                buf.push(char::REPLACEMENT_CHARACTER);
                buf.push(char::from_u32(other).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            None => {
                buf.push(char::REPLACEMENT_CHARACTER);
                buf.push('u');
                buf.push_str(&digits);
            }
        }
        Ok(())
    }

    /// Read up to four hex digits. Returns the code unit only when all four were present; the
    /// digits actually consumed are returned either way.
    fn read_hex4(&mut self) -> Result<(Option<u32>, String)> {
        let mut digits = String::with_capacity(4);
        while digits.len() < 4 {
            match self.source.peek()? {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.source.next()?;
                    digits.push(c);
                }
                _ => return Ok((None, digits)),
            }
        }
        Ok((u32::from_str_radix(&digits, 16).ok(), digits))
    }

    /// The maximal run of number-ish characters at the current position. May be empty.
    pub fn read_number(&mut self) -> Result<String> {
        let mut buf = String::new();
        while let Some(c) = self.source.peek()? {
            if !matches!(c, '-' | '+' | '.' | 'e' | 'E' | '0'..='9') {
                break;
            }
            self.source.next()?;
            buf.push(c);
        }
        Ok(buf)
    }
}
