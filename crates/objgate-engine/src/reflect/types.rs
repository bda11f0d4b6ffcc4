//! Type descriptors
//!
//! Declared types of fields, parameters, return values and array components.

use crate::value::Value;

/// Root of every class hierarchy
pub const OBJECT_CLASS: &str = "gate.lang.Object";
/// Class of strings
pub const STRING_CLASS: &str = "gate.lang.String";
/// Class of class objects
pub const CLASS_CLASS: &str = "gate.lang.Class";
/// Class of arrays
pub const ARRAY_CLASS: &str = "gate.lang.Array";
/// Base class of throwables
pub const THROWABLE_CLASS: &str = "gate.lang.Throwable";
/// Class of list objects
pub const LIST_CLASS: &str = "gate.util.ArrayList";
/// Class of map objects
pub const MAP_CLASS: &str = "gate.util.HashMap";
/// Class of set objects
pub const SET_CLASS: &str = "gate.util.HashSet";
/// Class of iterator objects
pub const ITERATOR_CLASS: &str = "gate.util.Iterator";
/// Class of stream objects
pub const STREAM_CLASS: &str = "gate.io.InputStream";
/// Class of import views
pub const VIEW_CLASS: &str = "gate.gateway.JVMView";

/// Primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// boolean
    Boolean,
    /// char
    Char,
    /// byte
    Byte,
    /// short
    Short,
    /// int
    Int,
    /// long
    Long,
    /// float
    Float,
    /// double
    Double,
}

impl Primitive {
    const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Char,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    /// Keyword name
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Fully-qualified name of the boxed class
    pub fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "gate.lang.Boolean",
            Primitive::Char => "gate.lang.Character",
            Primitive::Byte => "gate.lang.Byte",
            Primitive::Short => "gate.lang.Short",
            Primitive::Int => "gate.lang.Integer",
            Primitive::Long => "gate.lang.Long",
            Primitive::Float => "gate.lang.Float",
            Primitive::Double => "gate.lang.Double",
        }
    }

    /// Parse a keyword name
    pub fn from_name(name: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Parse a boxed class name
    pub fn from_boxed_name(name: &str) -> Option<Primitive> {
        Self::ALL.into_iter().find(|p| p.boxed_name() == name)
    }

    /// Position on the numeric widening ladder
    pub fn numeric_rank(self) -> Option<u32> {
        match self {
            Primitive::Byte => Some(0),
            Primitive::Short => Some(1),
            Primitive::Int => Some(2),
            Primitive::Long => Some(3),
            Primitive::Float => Some(4),
            Primitive::Double => Some(5),
            Primitive::Boolean | Primitive::Char => None,
        }
    }

    /// Zero value
    pub fn default_value(self) -> Value {
        match self {
            Primitive::Boolean => Value::Bool(false),
            Primitive::Char => Value::Char('\0'),
            Primitive::Byte => Value::Byte(0),
            Primitive::Short => Value::Short(0),
            Primitive::Int => Value::Int(0),
            Primitive::Long => Value::Long(0),
            Primitive::Float => Value::Float(0.0),
            Primitive::Double => Value::Double(0.0),
        }
    }
}

/// Declared type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// No value (return types only)
    Void,
    /// Unboxed primitive
    Primitive(Primitive),
    /// Boxed primitive; accepts null
    Boxed(Primitive),
    /// `gate.lang.String`
    String,
    /// `gate.lang.Object`, accepts anything
    Object,
    /// A registered class by fully-qualified name
    Class(String),
    /// Array of a component type
    Array(Box<TypeDesc>),
}

impl TypeDesc {
    /// `int`
    pub fn int() -> Self {
        TypeDesc::Primitive(Primitive::Int)
    }

    /// `long`
    pub fn long() -> Self {
        TypeDesc::Primitive(Primitive::Long)
    }

    /// `double`
    pub fn double() -> Self {
        TypeDesc::Primitive(Primitive::Double)
    }

    /// `boolean`
    pub fn boolean() -> Self {
        TypeDesc::Primitive(Primitive::Boolean)
    }

    /// A registered class
    pub fn class(name: impl Into<String>) -> Self {
        TypeDesc::Class(name.into())
    }

    /// Array of `self`
    pub fn array_of(self) -> Self {
        TypeDesc::Array(Box::new(self))
    }

    /// Parse a type name such as `int`, `gate.lang.Integer`, `demo.Point[]`
    pub fn parse(name: &str) -> TypeDesc {
        let name = name.trim();
        if let Some(component) = name.strip_suffix("[]") {
            return TypeDesc::parse(component).array_of();
        }
        if name == "void" {
            return TypeDesc::Void;
        }
        if let Some(p) = Primitive::from_name(name) {
            return TypeDesc::Primitive(p);
        }
        if let Some(p) = Primitive::from_boxed_name(name) {
            return TypeDesc::Boxed(p);
        }
        match name {
            STRING_CLASS => TypeDesc::String,
            OBJECT_CLASS => TypeDesc::Object,
            _ => TypeDesc::Class(name.to_string()),
        }
    }

    /// Fully-qualified name
    pub fn name(&self) -> String {
        match self {
            TypeDesc::Void => "void".to_string(),
            TypeDesc::Primitive(p) => p.name().to_string(),
            TypeDesc::Boxed(p) => p.boxed_name().to_string(),
            TypeDesc::String => STRING_CLASS.to_string(),
            TypeDesc::Object => OBJECT_CLASS.to_string(),
            TypeDesc::Class(name) => name.clone(),
            TypeDesc::Array(component) => format!("{}[]", component.name()),
        }
    }

    /// Name with the package stripped
    pub fn short_name(&self) -> String {
        match self {
            TypeDesc::Array(component) => format!("{}[]", component.short_name()),
            other => simple_name(&other.name()).to_string(),
        }
    }

    /// Name, short or fully qualified
    pub fn display_name(&self, short: bool) -> String {
        if short {
            self.short_name()
        } else {
            self.name()
        }
    }

    /// Whether values of this type are unboxed primitives
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDesc::Primitive(_))
    }

    /// Initial value of fields and array slots
    pub fn default_value(&self) -> Value {
        match self {
            TypeDesc::Primitive(p) => p.default_value(),
            _ => Value::Null,
        }
    }
}

/// Last dotted segment of a class name
pub fn simple_name(fqn: &str) -> &str {
    match fqn.rfind('.') {
        Some(idx) => &fqn[idx + 1..],
        None => fqn,
    }
}

/// Package portion of a class name, empty for the default package
pub fn package_name(fqn: &str) -> &str {
    match fqn.rfind('.') {
        Some(idx) => &fqn[..idx],
        None => "",
    }
}
