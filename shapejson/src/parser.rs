//! Recursive-descent parser guided by a [`Shape`].
//!
//! The parser is total over well-formed JSON: it only fails on malformed syntax, on a string bound
//! for a date/time that is not in the wire format, and when nesting gets deeper than the configured
//! limit. A shape that does not fit the document just means values come back less typed.

use std::io::BufRead;

use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::coerce::{coerce, coerce_key, Raw};
use crate::scanner::Scanner;
use crate::shape::Shape;
use crate::source::{ReadSource, Source, StrSource};
use crate::value::{Record, Value};
use crate::{Error, ErrorKind, Key, Result};

/// Nesting depth past which parsing fails with [`ErrorKind::NestingTooDeep`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

pub struct Parser<S> {
    scanner: Scanner<S>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<StrSource<'a>> {
    pub fn from_str(input: &'a str) -> Self {
        Parser::new(StrSource::new(input))
    }
}

impl<R: BufRead> Parser<ReadSource<R>> {
    pub fn from_reader(reader: R) -> Self {
        Parser::new(ReadSource::new(reader))
    }
}

impl<S: Source> Parser<S> {
    pub fn new(source: S) -> Self {
        Self {
            scanner: Scanner::new(source),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Characters consumed so far.
    pub fn offset(&self) -> usize {
        self.scanner.offset()
    }

    pub fn into_source(self) -> S {
        self.scanner.into_source()
    }

    /// Parse one complete document. Whitespace around the value is consumed; anything after it is
    /// left in the source.
    #[instrument(level = "debug", skip_all, fields(%shape))]
    pub fn parse_document(&mut self, shape: &Shape) -> Result<Value> {
        let value = self.parse_value(shape)?;
        self.scanner.skip_whitespace()?;
        Ok(value)
    }

    pub fn parse_value(&mut self, shape: &Shape) -> Result<Value> {
        self.scanner.skip_whitespace()?;
        let lo = self.scanner.offset();
        match self.scanner.peek()? {
            Some('n') => self.scanner.expect_literal("null", Value::Null),
            Some('t') => {
                let raw = self.scanner.expect_literal("true", Raw::Bool(true))?;
                self.coerce(lo, raw, shape)
            }
            Some('f') => {
                let raw = self.scanner.expect_literal("false", Raw::Bool(false))?;
                self.coerce(lo, raw, shape)
            }
            Some('"') => {
                let raw = Raw::Str(self.scanner.read_quoted_string()?);
                self.coerce(lo, raw, shape)
            }
            Some('[') => self.nested(lo, |parser| parser.parse_array(shape)),
            Some('{') => self.nested(lo, |parser| parser.parse_object(shape)),
            _ => {
                let number = self.scanner.read_number()?;
                if number.is_empty() {
                    return Err(self.scanner.error_here(ErrorKind::ExpectedValue));
                }
                self.coerce(lo, Raw::Num(number), shape)
            }
        }
    }

    fn coerce(&self, lo: usize, raw: Raw, shape: &Shape) -> Result<Value> {
        coerce(raw, shape).map_err(|kind| self.scanner.error_from(lo, kind))
    }

    fn nested(&mut self, lo: usize, f: impl FnOnce(&mut Self) -> Result<Value>) -> Result<Value> {
        if self.depth >= self.max_depth {
            debug!(depth = self.depth, offset = lo, "nesting limit reached");
            return Err(self.scanner.error_here(ErrorKind::NestingTooDeep {
                limit: self.max_depth,
            }));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_array(&mut self, shape: &Shape) -> Result<Value> {
        self.scanner.next()?; // `[`
        self.scanner.skip_whitespace()?;

        let element = shape.element();
        let mut items = Vec::new();
        if self.scanner.peek()? == Some(']') {
            self.scanner.next()?;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value(element)?);
            self.scanner.skip_whitespace()?;
            match self.scanner.next()? {
                Some(',') => {}
                Some(']') => break,
                found => return Err(self.expected(found, ErrorKind::ExpectedCommaOrBracket)),
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self, shape: &Shape) -> Result<Value> {
        self.scanner.next()?; // `{`
        self.scanner.skip_whitespace()?;

        let mut target = match shape {
            Shape::Record(record) => Target::Record {
                record: Record::new(record.clone()),
                assigned: vec![false; record.fields().len()],
            },
            Shape::Map { .. } => Target::Map(IndexMap::new()),
            _ => Target::Object(IndexMap::new()),
        };

        if self.scanner.peek()? == Some('}') {
            self.scanner.next()?;
            return Ok(target.finish());
        }

        loop {
            self.scanner.skip_whitespace()?;
            let key = self.scanner.read_quoted_string()?;
            self.scanner.skip_whitespace()?;
            match self.scanner.next()? {
                Some(':') => {}
                found => return Err(self.expected(found, ErrorKind::ExpectedColon)),
            }
            self.scanner.skip_whitespace()?;

            match &mut target {
                Target::Map(map) => {
                    let value = self.parse_value(shape.element())?;
                    map.insert(coerce_key(key, shape.key()), value);
                }
                Target::Object(map) => {
                    let value = self.parse_value(&Shape::Any)?;
                    map.insert(key.into(), value);
                }
                Target::Record { record, assigned } => {
                    match record.shape().position(&key) {
                        Some(index) if !assigned[index] => {
                            let fields = record.shape().clone();
                            let value = self.parse_value(fields.fields()[index].shape())?;
                            record.set_field(index, value);
                            assigned[index] = true;
                        }
                        Some(_) => {
                            trace!(%key, "duplicate key for an assigned field, discarding");
                            self.parse_value(&Shape::Any)?;
                        }
                        None => {
                            trace!(%key, record = record.shape().name(), "unmatched key, discarding");
                            self.parse_value(&Shape::Any)?;
                        }
                    }
                }
            }

            self.scanner.skip_whitespace()?;
            match self.scanner.next()? {
                Some(',') => {}
                Some('}') => break,
                found => return Err(self.expected(found, ErrorKind::ExpectedCommaOrBrace)),
            }
        }
        Ok(target.finish())
    }

    /// An error covering the unexpected character just consumed, or the end of input.
    fn expected(&self, found: Option<char>, kind: ErrorKind) -> Error {
        let hi = self.scanner.offset();
        let lo = if found.is_some() { hi - 1 } else { hi };
        self.scanner.error_from(lo, kind)
    }
}

/// What an object is being built into. Constructed empty before the first pair is read.
enum Target {
    Map(IndexMap<Key, Value>),
    Object(IndexMap<Key, Value>),
    Record { record: Record, assigned: Vec<bool> },
}

impl Target {
    fn finish(self) -> Value {
        match self {
            Target::Map(map) | Target::Object(map) => Value::Object(map),
            Target::Record { record, .. } => Value::Record(record),
        }
    }
}

/// Parse `input` against `shape`.
pub fn parse_value(input: &str, shape: &Shape) -> Result<Value> {
    Parser::from_str(input).parse_document(shape)
}

/// Parse a document pulled from `reader` against `shape`.
pub fn parse_value_from_reader<R: BufRead>(reader: R, shape: &Shape) -> Result<Value> {
    Parser::from_reader(reader).parse_document(shape)
}
