//! The dynamic value model produced by the parser and consumed by the stringifier.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::coerce::exact_integer;
use crate::shape::{FieldBinding, RecordShape};

/// A parsed or to-be-serialized JSON value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(OffsetDateTime),
    Array(Vec<Value>),
    Object(IndexMap<Key, Value>),
    Record(Record),
}

impl Value {
    /// Short human-readable kind name.
    pub fn kind_desc(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<Key, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Look up `key` in an object, or a field by wire key in a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(&Key::String(key.to_owned())),
            Value::Record(record) => record.get(key),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            // `IndexMap` equality ignores insertion order.
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::I64(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::I64(i64::from(n)))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::U64(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::F64(n))
    }
}

impl From<OffsetDateTime> for Value {
    fn from(dt: OffsetDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A number, either coerced to a concrete width or kept as its lexical form.
#[derive(Debug, Clone)]
pub enum Number {
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Lexical slice kept verbatim, because no numeric kind was requested or the requested one
    /// could not hold it.
    Raw(String),
}

impl Number {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(*n),
            Number::U64(n) => i64::try_from(*n).ok(),
            Number::F32(n) => integral(f64::from(*n)).and_then(|n| i64::try_from(n).ok()),
            Number::F64(n) => integral(*n).and_then(|n| i64::try_from(n).ok()),
            Number::Raw(s) => exact_integer(s).and_then(|n| i64::try_from(n).ok()),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::I64(n) => u64::try_from(*n).ok(),
            Number::U64(n) => Some(*n),
            Number::F32(n) => integral(f64::from(*n)).and_then(|n| u64::try_from(n).ok()),
            Number::F64(n) => integral(*n).and_then(|n| u64::try_from(n).ok()),
            Number::Raw(s) => exact_integer(s).and_then(|n| u64::try_from(n).ok()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::I64(n) => Some(*n as f64),
            Number::U64(n) => Some(*n as f64),
            Number::F32(n) => Some(f64::from(*n)),
            Number::F64(n) => Some(*n),
            Number::Raw(s) => s.parse().ok(),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Number::F32(n) => Some(*n),
            Number::Raw(s) => s.parse().ok(),
            other => other.as_f64().map(|n| n as f32),
        }
    }

    /// Exact integer value, if this number has one.
    fn as_i128(&self) -> Option<i128> {
        match self {
            Number::I64(n) => Some(i128::from(*n)),
            Number::U64(n) => Some(i128::from(*n)),
            Number::Raw(s) => exact_integer(s),
            _ => None,
        }
    }
}

/// `f` as an integer when it is finite and has no fractional part.
fn integral(f: f64) -> Option<i128> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.8e19 {
        Some(f as i128)
    } else {
        None
    }
}

impl PartialEq for Number {
    /// Numbers compare by numeric value, so `Raw("10")` equals `I64(10)`.
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            return a == b;
        }
        if let (Number::F32(a), Number::F32(b)) = (self, other) {
            return a == b;
        }
        if let (Number::Raw(a), Number::Raw(b)) = (self, other) {
            if a == b {
                return true;
            }
        }
        // An `F32` compares through its shortest decimal form, so `F32(55.7)` equals `55.7`.
        let widen = |n: &Number| match n {
            Number::F32(f) => f.to_string().parse::<f64>().ok(),
            other => other.as_f64(),
        };
        match (widen(self), widen(other)) {
            (Some(a), Some(b)) => a.partial_cmp(&b) == Some(Ordering::Equal),
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F32(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
            Number::Raw(s) => f.write_str(s),
        }
    }
}

/// An object key. Keys are coerced to the map's key shape when it is a hashable scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    String(String),
    Bool(bool),
    I64(i64),
    U64(u64),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) => f.write_str(s),
            Key::Bool(b) => write!(f, "{b}"),
            Key::I64(n) => write!(f, "{n}"),
            Key::U64(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::I64(n)
    }
}

/// An instance of a [`RecordShape`]: one value slot per field binding, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: Arc<RecordShape>,
    values: Vec<Value>,
}

impl Record {
    /// Construct an empty instance; every field starts out `null`.
    pub fn new(shape: Arc<RecordShape>) -> Self {
        let values = vec![Value::Null; shape.fields().len()];
        Self { shape, values }
    }

    /// Construct an instance from slot values in binding order. Missing slots are `null`, extra
    /// values are dropped.
    pub fn from_values(shape: Arc<RecordShape>, mut values: Vec<Value>) -> Self {
        values.resize(shape.fields().len(), Value::Null);
        Self { shape, values }
    }

    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// Read the field at binding `index`.
    pub fn get_field(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Write the field at binding `index`. Out-of-range indices are ignored.
    pub fn set_field(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Builder-style [`Record::set_field`] addressed by wire key.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Some(index) = self.shape.position(key) {
            self.set_field(index, value.into());
        }
        self
    }

    /// Read a field by wire key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.shape.position(key).and_then(|index| self.get_field(index))
    }

    /// Bindings paired with their current values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldBinding, &Value)> {
        self.shape.fields().iter().zip(&self.values)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
