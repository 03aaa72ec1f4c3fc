//! Bridge between Rust types and the dynamic [`Value`] model.
//!
//! A [`Json`] type knows the [`Shape`] the parser should build for it and how to convert to and
//! from the resulting [`Value`]. Records are declared with [`record!`](crate::record).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::vec;

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::coerce::parse_datetime;
use crate::shape::{RecordShape, ScalarKind, Shape};
use crate::stringify::Stringifier;
use crate::value::{Key, Number, Value};

/// A type that can be parsed from and written as JSON.
pub trait Json: Sized {
    /// The shape the parser builds for this type.
    fn shape() -> Shape;

    fn to_value(&self) -> Value;

    /// `None` when `value` cannot be represented by `Self`.
    fn from_value(value: Value) -> Option<Self>;

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        out.value(&self.to_value())
    }
}

/// A type usable as a map key.
pub trait JsonKey: Sized {
    fn key_shape() -> Shape;
    fn to_key(&self) -> Key;
    fn from_key(key: Key) -> Option<Self>;
}

/// Implemented by types declared with [`record!`](crate::record).
pub trait JsonRecord: Json {
    fn record_shape() -> &'static Arc<RecordShape>;
}

/// Slot values for `shape`, in binding order. A record built from the same descriptor is taken as
/// is; other records and plain objects are matched by wire key.
#[doc(hidden)]
pub fn record_values(value: Value, shape: &Arc<RecordShape>) -> Option<vec::IntoIter<Value>> {
    let values: Vec<Value> = match value {
        Value::Record(record) if Arc::ptr_eq(record.shape(), shape) => record.into_values(),
        Value::Record(record) => shape
            .fields()
            .iter()
            .map(|binding| record.get(binding.key()).cloned().unwrap_or(Value::Null))
            .collect(),
        Value::Object(mut map) => shape
            .fields()
            .iter()
            .map(|binding| {
                map.shift_remove(&Key::from(binding.key()))
                    .unwrap_or(Value::Null)
            })
            .collect(),
        _ => return None,
    };
    Some(values.into_iter())
}

/// Declare a struct that implements [`Json`] as a record.
///
/// Fields are bound in declaration order. `#[json]` maps a field explicitly under its own name,
/// `#[json = "Key"]` maps it under `Key`; both count as bound for
/// [`FieldSelection::OnlyBoundFields`](crate::FieldSelection::OnlyBoundFields). The struct must
/// implement `Default`, which supplies every field the input does not.
///
/// ```
/// shapejson::record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Point {
///         #[json = "X"]
///         pub x: i32,
///         #[json = "Y"]
///         pub y: i32,
///     }
/// }
///
/// let point: Point = shapejson::parse(r#"{"X": 1, "Y": -2}"#).unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
#[macro_export]
macro_rules! record {
    (@munch $head:tt [$($fields:tt)*] [$($bindings:tt)*]) => {
        $crate::record!(@emit $head [$($fields)*] [$($bindings)*]);
    };
    (@munch $head:tt [$($fields:tt)*] [$($bindings:tt)*]
        #[json = $key:literal] $fvis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@munch $head
            [$($fields)* $fvis $field: $ty,]
            [$($bindings)* { $field : $ty => .wire_key($key) }]
            $($($rest)*)?);
    };
    (@munch $head:tt [$($fields:tt)*] [$($bindings:tt)*]
        #[json] $fvis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@munch $head
            [$($fields)* $fvis $field: $ty,]
            [$($bindings)* { $field : $ty => .mapped() }]
            $($($rest)*)?);
    };
    (@munch $head:tt [$($fields:tt)*] [$($bindings:tt)*]
        $fvis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@munch $head
            [$($fields)* $fvis $field: $ty,]
            [$($bindings)* { $field : $ty => }]
            $($($rest)*)?);
    };
    (@emit [$(#[$meta:meta])* $vis:vis struct $name:ident]
        [$($fields:tt)*]
        [$({ $field:ident : $ty:ty => $($wire:tt)* })*]
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fields)*
        }

        impl $crate::JsonRecord for $name {
            fn record_shape() -> &'static ::std::sync::Arc<$crate::RecordShape> {
                static SHAPE: ::std::sync::OnceLock<::std::sync::Arc<$crate::RecordShape>> =
                    ::std::sync::OnceLock::new();
                SHAPE.get_or_init(|| {
                    ::std::sync::Arc::new(
                        $crate::RecordShape::new(::std::stringify!($name))
                            $(.field(
                                $crate::FieldBinding::new(
                                    ::std::stringify!($field),
                                    <$ty as $crate::Json>::shape(),
                                ) $($wire)*
                            ))*,
                    )
                })
            }
        }

        impl $crate::Json for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Record(::std::clone::Clone::clone(
                    <Self as $crate::JsonRecord>::record_shape(),
                ))
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record($crate::Record::from_values(
                    ::std::clone::Clone::clone(<Self as $crate::JsonRecord>::record_shape()),
                    ::std::vec![$($crate::Json::to_value(&self.$field)),*],
                ))
            }

            #[allow(unused_mut, unused_variables)]
            fn from_value(value: $crate::Value) -> ::std::option::Option<Self> {
                let mut values = $crate::__private::record_values(
                    value,
                    <Self as $crate::JsonRecord>::record_shape(),
                )?;
                let mut out = <Self as ::std::default::Default>::default();
                $(
                    if let ::std::option::Option::Some(v) =
                        values.next().and_then(<$ty as $crate::Json>::from_value)
                    {
                        out.$field = v;
                    }
                )*
                ::std::option::Option::Some(out)
            }
        }
    };
    ($(#[$meta:meta])* $vis:vis struct $name:ident { $($body:tt)* }) => {
        $crate::record!(@munch [$(#[$meta])* $vis struct $name] [] [] $($body)*);
    };
}

impl Json for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        out.value(self)
    }
}

impl Json for bool {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl JsonKey for bool {
    fn key_shape() -> Shape {
        Shape::Scalar(ScalarKind::Bool)
    }

    fn to_key(&self) -> Key {
        Key::Bool(*self)
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Bool(b) => Some(b),
            Key::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident, $variant:ident, $as:ident;)*) => {$(
        impl Json for $ty {
            fn shape() -> Shape {
                Shape::Scalar(ScalarKind::$kind)
            }

            fn to_value(&self) -> Value {
                Value::Number(Number::$variant((*self).into()))
            }

            fn from_value(value: Value) -> Option<Self> {
                value.as_number()?.$as().and_then(|n| <$ty>::try_from(n).ok())
            }

            fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
                out.number(&Number::$variant((*self).into()))
            }
        }

        impl JsonKey for $ty {
            fn key_shape() -> Shape {
                Shape::Scalar(ScalarKind::$kind)
            }

            fn to_key(&self) -> Key {
                Key::$variant((*self).into())
            }

            fn from_key(key: Key) -> Option<Self> {
                match key {
                    Key::I64(n) => <$ty>::try_from(n).ok(),
                    Key::U64(n) => <$ty>::try_from(n).ok(),
                    Key::String(s) => s.parse().ok(),
                    Key::Bool(_) => None,
                }
            }
        }
    )*};
}

impl_integer! {
    i8 => I8, I64, as_i64;
    i16 => I16, I64, as_i64;
    i32 => I32, I64, as_i64;
    i64 => I64, I64, as_i64;
    u8 => U8, U64, as_u64;
    u16 => U16, U64, as_u64;
    u32 => U32, U64, as_u64;
    u64 => U64, U64, as_u64;
}

impl Json for f32 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::F32)
    }

    fn to_value(&self) -> Value {
        Value::Number(Number::F32(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_number()?.as_f32()
    }
}

impl Json for f64 {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::F64)
    }

    fn to_value(&self) -> Value {
        Value::Number(Number::F64(*self))
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_number()?.as_f64()
    }
}

impl Json for String {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::String)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        out.string(self)
    }
}

impl JsonKey for String {
    fn key_shape() -> Shape {
        Shape::Scalar(ScalarKind::String)
    }

    fn to_key(&self) -> Key {
        Key::String(self.clone())
    }

    fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

impl Json for OffsetDateTime {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::DateTime)
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(dt),
            Value::String(s) => parse_datetime(&s),
            _ => None,
        }
    }
}

/// `None` is `null`; the shape is that of the inner type.
impl<T: Json> Json for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        match self {
            Some(inner) => inner.write_json(out),
            None => out.value(&Value::Null),
        }
    }
}

impl<T: Json> Json for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        out.array(self)
    }
}

/// Fixed-size arrays only accept input with exactly `N` items.
impl<T: Json, const N: usize> Json for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        let items: Vec<T> = Vec::from_value(value)?;
        items.try_into().ok()
    }

    fn write_json<W: fmt::Write>(&self, out: &mut Stringifier<'_, W>) -> fmt::Result {
        out.array(self)
    }
}

fn object_entries<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Value
where
    K: JsonKey + 'a,
    V: Json + 'a,
{
    Value::Object(entries.map(|(k, v)| (k.to_key(), v.to_value())).collect())
}

fn typed_entries<K: JsonKey, V: Json, C>(value: Value) -> Option<C>
where
    C: FromIterator<(K, V)>,
{
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| Some((K::from_key(k)?, V::from_value(v)?)))
            .collect(),
        _ => None,
    }
}

impl<K, V, S> Json for HashMap<K, V, S>
where
    K: JsonKey + Eq + Hash,
    V: Json,
    S: BuildHasher + Default,
{
    fn shape() -> Shape {
        Shape::map(K::key_shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        object_entries(self.iter())
    }

    fn from_value(value: Value) -> Option<Self> {
        typed_entries::<K, V, _>(value)
    }
}

impl<K: JsonKey + Ord, V: Json> Json for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::key_shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        object_entries(self.iter())
    }

    fn from_value(value: Value) -> Option<Self> {
        typed_entries::<K, V, _>(value)
    }
}

impl<K, V, S> Json for IndexMap<K, V, S>
where
    K: JsonKey + Eq + Hash,
    V: Json,
    S: BuildHasher + Default,
{
    fn shape() -> Shape {
        Shape::map(K::key_shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        object_entries(self.iter())
    }

    fn from_value(value: Value) -> Option<Self> {
        typed_entries::<K, V, _>(value)
    }
}
