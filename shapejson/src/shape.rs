//! Target shape descriptors. The parser never introspects types itself; everything it knows about
//! the value it is building comes from a [`Shape`].

use std::fmt;
use std::sync::Arc;

/// Terminal value kinds a token can be coerced into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    DateTime,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 13] = [
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::String,
        ScalarKind::DateTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::String => "string",
            ScalarKind::DateTime => "datetime",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The coarse classification of a shape, as the parser dispatches on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    Any,
    Scalar(ScalarKind),
    Array,
    List,
    Map,
    Record,
}

static ANY: Shape = Shape::Any;
static STRING_KEY: Shape = Shape::Scalar(ScalarKind::String);

/// Describes the value the parser should build.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// No hint: scalars stay raw, objects become string-keyed maps of `Any`.
    Any,
    Scalar(ScalarKind),
    /// Fixed-size sequence; its length is the number of items parsed.
    Array(Box<Shape>),
    /// Growable collection.
    List(Box<Shape>),
    Map { key: Box<Shape>, value: Box<Shape> },
    Record(Arc<RecordShape>),
}

impl Shape {
    pub fn array(element: Shape) -> Self {
        Shape::Array(Box::new(element))
    }

    pub fn list(element: Shape) -> Self {
        Shape::List(Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// The generic `string -> any` map objects resolve to when nothing better is known.
    pub fn object() -> Self {
        Shape::map(Shape::Scalar(ScalarKind::String), Shape::Any)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Shape::Any => Kind::Any,
            Shape::Scalar(kind) => Kind::Scalar(*kind),
            Shape::Array(_) => Kind::Array,
            Shape::List(_) => Kind::List,
            Shape::Map { .. } => Kind::Map,
            Shape::Record(_) => Kind::Record,
        }
    }

    /// Shape of the items of an array/list, or of the values of a map. Resolves to `Any` when the
    /// shape gives no hint.
    pub fn element(&self) -> &Shape {
        match self {
            Shape::Array(element) | Shape::List(element) => element,
            Shape::Map { value, .. } => value,
            _ => &ANY,
        }
    }

    /// Shape map keys are coerced to. Only maps carry one; everything else keys by string.
    pub fn key(&self) -> &Shape {
        match self {
            Shape::Map { key, .. } => key,
            _ => &STRING_KEY,
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Shape::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&Arc<RecordShape>> {
        match self {
            Shape::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => f.write_str("any"),
            Shape::Scalar(kind) => write!(f, "{kind}"),
            Shape::Array(element) => write!(f, "array<{element}>"),
            Shape::List(element) => write!(f, "list<{element}>"),
            Shape::Map { key, value } => write!(f, "map<{key}, {value}>"),
            Shape::Record(record) => f.write_str(record.name()),
        }
    }
}

/// How a record field appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Wire {
    /// Serialized under its natural name, but only when all fields are selected.
    Natural,
    /// Explicitly mapped, optionally under a different key.
    Mapped(Option<String>),
}

/// Pairs a wire key with a field's shape. The binding's position inside its [`RecordShape`] is the
/// accessor used to read and write the field on a [`crate::Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    name: String,
    wire: Wire,
    shape: Shape,
}

impl FieldBinding {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            wire: Wire::Natural,
            shape,
        }
    }

    /// Mark the field as explicitly mapped under its natural name.
    pub fn mapped(mut self) -> Self {
        if self.wire == Wire::Natural {
            self.wire = Wire::Mapped(None);
        }
        self
    }

    /// Map the field under `key` instead of its natural name.
    pub fn wire_key(mut self, key: impl Into<String>) -> Self {
        self.wire = Wire::Mapped(Some(key.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key this field is read from and written to.
    pub fn key(&self) -> &str {
        match &self.wire {
            Wire::Mapped(Some(key)) => key,
            _ => &self.name,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.wire, Wire::Mapped(_))
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// The descriptor of a structured record: a name plus ordered field bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldBinding>,
}

impl RecordShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, binding: FieldBinding) -> Self {
        self.fields.push(binding);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldBinding] {
        &self.fields
    }

    /// Index of the first binding whose wire key is exactly `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|binding| binding.key() == key)
    }

    pub fn into_shape(self) -> Shape {
        Shape::Record(Arc::new(self))
    }
}
