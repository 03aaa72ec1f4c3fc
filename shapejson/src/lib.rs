//! A JSON codec where the caller describes the value they want to get back.
//!
//! Parsing is driven by a [`Shape`]: scalars are coerced into the requested kind on a best-effort
//! basis, objects become records or typed maps, and anything the shape does not mention is kept in
//! its untyped form. We deliberately do not fail when the document does not fit the shape. The
//! only errors are malformed JSON, malformed dates and runaway nesting; everything else degrades
//! into a less typed [`Value`].
//!
//! Output goes the other way: the stringifier looks at the runtime kind of each value and writes
//! compact JSON, optionally restricted to the record fields that were explicitly mapped.
//!
//! Rust types opt in through the [`Json`] trait, and structs become records through [`record!`].

mod coerce;
mod error;
mod interop;
mod parser;
mod scanner;
mod shape;
mod source;
mod span;
mod stringify;
mod typed;
mod value;

use std::io::BufRead;

pub use coerce::{format_datetime, parse_datetime};
pub use error::{Error, ErrorKind, Result};
pub use indexmap::IndexMap;
pub use parser::{parse_value, parse_value_from_reader, Parser, DEFAULT_MAX_DEPTH};
pub use shape::{FieldBinding, Kind, RecordShape, ScalarKind, Shape};
pub use source::{ReadSource, Source, StrSource};
pub use span::Span;
pub use stringify::{stringify, stringify_value, FieldSelection, Stringifier};
pub use typed::{Json, JsonKey, JsonRecord};
pub use value::{Key, Number, Record, Value};

#[doc(hidden)]
pub mod __private {
    pub use crate::typed::record_values;
}

/// Parse `input` into a `T`.
///
/// Fails with [`ErrorKind::TypeMismatch`] when the document parses but cannot be represented by
/// `T`, e.g. a string where `T` is an integer.
pub fn parse<T: Json>(input: &str) -> Result<T> {
    let mut parser = Parser::from_str(input);
    let value = parser.parse_document(&T::shape())?;
    into_typed(value, parser.offset())
}

/// [`parse`], pulling the document from `reader`.
pub fn from_reader<T: Json, R: BufRead>(reader: R) -> Result<T> {
    let mut parser = Parser::from_reader(reader);
    let value = parser.parse_document(&T::shape())?;
    into_typed(value, parser.offset())
}

fn into_typed<T: Json>(value: Value, end: usize) -> Result<T> {
    let found = value.kind_desc();
    T::from_value(value).ok_or_else(|| {
        tracing::debug!(found, expected = std::any::type_name::<T>(), "typed conversion failed");
        Error::new(
            ErrorKind::TypeMismatch {
                expected: std::any::type_name::<T>(),
            },
            Span::new(0, end),
        )
    })
}
