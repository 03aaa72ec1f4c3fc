use std::io;

use crate::Span;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a parse. Stringifying never fails.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A `null`/`true`/`false` literal was expected but the input diverged.
    #[error("expected `{expected}`")]
    UnexpectedToken { expected: &'static str },
    #[error("unterminated string")]
    UnterminatedString,
    /// A quoted string (e.g. an object key) was expected.
    #[error("expected `\"`")]
    ExpectedQuote,
    #[error("expected `:`")]
    ExpectedColon,
    #[error("expected `,` or `]`")]
    ExpectedCommaOrBracket,
    #[error("expected `,` or `}}`")]
    ExpectedCommaOrBrace,
    #[error("expected a JSON value")]
    ExpectedValue,
    #[error("`{input}` is not a date in the `YYYY-MM-DDTHH:mm:ss.sssZ` format")]
    DateFormat { input: String },
    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
    #[error("failed to read input")]
    Io(#[source] io::Error),
    /// The parsed value could not be represented by the requested Rust type.
    #[error("parsed value cannot be represented as {expected}")]
    TypeMismatch { expected: &'static str },
}

/// A parse error together with where in the input it happened.
#[derive(Debug, thiserror::Error)]
#[error("{kind} at offset {}", .span.lo)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}
