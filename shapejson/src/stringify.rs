//! Compact JSON output, driven by the runtime kind of each value.

use std::fmt::{self, Write};

use crate::coerce::format_datetime;
use crate::value::{Key, Number, Record, Value};
use crate::Json;

/// Which record fields get written.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldSelection {
    /// Every field, under its wire key.
    #[default]
    AllFields,
    /// Only fields that were explicitly mapped to a wire key.
    OnlyBoundFields,
}

/// Writes compact JSON into any [`fmt::Write`] sink.
pub struct Stringifier<'w, W> {
    out: &'w mut W,
    fields: FieldSelection,
}

impl<'w, W: Write> Stringifier<'w, W> {
    pub fn new(out: &'w mut W, fields: FieldSelection) -> Self {
        Self { out, fields }
    }

    pub fn value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::Null => self.out.write_str("null"),
            Value::Bool(b) => self.out.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.number(n),
            Value::String(s) => self.string(s),
            Value::DateTime(dt) => self.string(&format_datetime(*dt)),
            Value::Array(items) => self.array(items),
            Value::Object(map) => self.object(map.iter()),
            Value::Record(record) => self.record(record),
        }
    }

    /// Non-finite floats have no JSON spelling and are written as `null`.
    pub fn number(&mut self, n: &Number) -> fmt::Result {
        match n {
            Number::F32(f) if !f.is_finite() => self.out.write_str("null"),
            Number::F64(f) if !f.is_finite() => self.out.write_str("null"),
            n => write!(self.out, "{n}"),
        }
    }

    pub fn string(&mut self, s: &str) -> fmt::Result {
        self.out.write_char('"')?;
        for c in s.chars() {
            match c {
                '\u{07}' => self.out.write_str("\\a")?,
                '\u{08}' => self.out.write_str("\\b")?,
                '\u{0c}' => self.out.write_str("\\f")?,
                '\n' => self.out.write_str("\\n")?,
                '\r' => self.out.write_str("\\r")?,
                '\t' => self.out.write_str("\\t")?,
                '\u{0b}' => self.out.write_str("\\v")?,
                '\\' => self.out.write_str("\\\\")?,
                '"' => self.out.write_str("\\\"")?,
                c => self.out.write_char(c)?,
            }
        }
        self.out.write_char('"')
    }

    fn key(&mut self, key: &Key) -> fmt::Result {
        match key {
            Key::String(s) => self.string(s),
            other => self.string(&other.to_string()),
        }
    }

    pub fn array<'v, T: Json + 'v>(&mut self, items: impl IntoIterator<Item = &'v T>) -> fmt::Result {
        self.out.write_char('[')?;
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.out.write_char(',')?;
            }
            item.write_json(self)?;
        }
        self.out.write_char(']')
    }

    /// Write entries in iteration order.
    pub fn object<'v, T: Json + 'v>(
        &mut self,
        entries: impl IntoIterator<Item = (&'v Key, &'v T)>,
    ) -> fmt::Result {
        self.out.write_char('{')?;
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                self.out.write_char(',')?;
            }
            self.key(key)?;
            self.out.write_char(':')?;
            value.write_json(self)?;
        }
        self.out.write_char('}')
    }

    pub fn record(&mut self, record: &Record) -> fmt::Result {
        self.out.write_char('{')?;
        let mut first = true;
        for (binding, value) in record.fields() {
            if self.fields == FieldSelection::OnlyBoundFields && !binding.is_mapped() {
                continue;
            }
            if !first {
                self.out.write_char(',')?;
            }
            first = false;
            self.string(binding.key())?;
            self.out.write_char(':')?;
            self.value(value)?;
        }
        self.out.write_char('}')
    }
}

/// Render `value` as compact JSON.
pub fn stringify<T: Json>(value: &T, fields: FieldSelection) -> String {
    let mut buf = String::new();
    // Writing into a `String` cannot fail.
    let _ = value.write_json(&mut Stringifier::new(&mut buf, fields));
    buf
}

/// [`stringify`] for an already-built [`Value`].
pub fn stringify_value(value: &Value, fields: FieldSelection) -> String {
    stringify(value, fields)
}
