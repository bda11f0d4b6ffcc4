//! Value model
//!
//! [`Value`] is what crosses the gateway boundary. Scalars, strings and byte
//! arrays travel by value; everything else is an [`Object`], a shared handle
//! whose identity is its allocation.

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::gateway::JvmView;
use crate::reflect::{ClassRef, TypeDesc};
use crate::throwable::Throwable;

/// A value crossing the gateway
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value
    Null,
    /// boolean
    Bool(bool),
    /// char
    Char(char),
    /// byte
    Byte(i8),
    /// short
    Short(i16),
    /// int
    Int(i32),
    /// long
    Long(i64),
    /// float
    Float(f32),
    /// double
    Double(f64),
    /// String
    Str(String),
    /// byte[]
    Bytes(Vec<u8>),
    /// Reference to a live object
    Object(Object),
}

impl Value {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of any integral value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// `int` view of byte/short/int values
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Byte(v) => Some(*v as i32),
            Value::Short(v) => Some(*v as i32),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating point view of any numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object handle
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Fully-qualified runtime type name
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "gate.lang.Boolean".to_string(),
            Value::Char(_) => "gate.lang.Character".to_string(),
            Value::Byte(_) => "gate.lang.Byte".to_string(),
            Value::Short(_) => "gate.lang.Short".to_string(),
            Value::Int(_) => "gate.lang.Integer".to_string(),
            Value::Long(_) => "gate.lang.Long".to_string(),
            Value::Float(_) => "gate.lang.Float".to_string(),
            Value::Double(_) => "gate.lang.Double".to_string(),
            Value::Str(_) => "gate.lang.String".to_string(),
            Value::Bytes(_) => "byte[]".to_string(),
            Value::Object(o) => match o.payload() {
                Payload::Array(array) => format!("{}[]", array.component().name()),
                _ => o.class().name().to_string(),
            },
        }
    }
}

impl PartialEq for Value {
    /// Scalars compare by type and value, objects by identity
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "byte[{}]", v.len()),
            Value::Object(o) => write!(f, "{}", o),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

// ============================================================================
// Objects
// ============================================================================

/// Readable byte source held by stream objects
pub type ByteSource = Box<dyn Read + Send>;

/// Storage behind an object
pub enum Payload {
    /// Plain instance: field name to value
    Fields(Mutex<FxHashMap<String, Value>>),
    /// Growable list
    List(Mutex<Vec<Value>>),
    /// Map entries in insertion order; keys compare like [`Value`] equality
    Map(Mutex<Vec<(Value, Value)>>),
    /// Set elements in insertion order
    Set(Mutex<Vec<Value>>),
    /// Snapshot iterator, consumed by `next`
    Iterator(Mutex<std::vec::IntoIter<Value>>),
    /// Fixed-length typed array
    Array(ArrayData),
    /// Class object naming a registered class
    Class(ClassRef),
    /// Import namespace
    View(Arc<JvmView>),
    /// Raised error kept as a value
    Throwable(Mutex<Throwable>),
    /// Byte stream, taken on first read
    Stream(Mutex<Option<ByteSource>>),
}

/// Array storage
pub struct ArrayData {
    component: TypeDesc,
    elements: Mutex<Vec<Value>>,
}

impl ArrayData {
    /// Component type
    pub fn component(&self) -> &TypeDesc {
        &self.component
    }

    /// Element storage
    pub fn elements(&self) -> &Mutex<Vec<Value>> {
        &self.elements
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.lock().len()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ObjectData {
    class: ClassRef,
    payload: Payload,
}

/// Shared handle to a live object
#[derive(Clone)]
pub struct Object(Arc<ObjectData>);

impl Object {
    /// Allocate an object of `class` with the given storage
    pub fn new(class: ClassRef, payload: Payload) -> Self {
        Object(Arc::new(ObjectData { class, payload }))
    }

    /// Allocate a plain instance with initial field values
    pub fn with_fields(class: ClassRef, fields: FxHashMap<String, Value>) -> Self {
        Self::new(class, Payload::Fields(Mutex::new(fields)))
    }

    /// Allocate a list object
    pub fn with_list(class: ClassRef, items: Vec<Value>) -> Self {
        Self::new(class, Payload::List(Mutex::new(items)))
    }

    /// Allocate an array object
    pub fn with_array(class: ClassRef, component: TypeDesc, items: Vec<Value>) -> Self {
        Self::new(
            class,
            Payload::Array(ArrayData {
                component,
                elements: Mutex::new(items),
            }),
        )
    }

    /// Runtime class
    pub fn class(&self) -> &ClassRef {
        &self.0.class
    }

    /// Storage
    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key, stable while the object is alive
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// List storage, if this is a list
    pub fn as_list(&self) -> Option<&Mutex<Vec<Value>>> {
        match self.payload() {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }

    /// Map entries, if this is a map
    pub fn as_map(&self) -> Option<&Mutex<Vec<(Value, Value)>>> {
        match self.payload() {
            Payload::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Set elements, if this is a set
    pub fn as_set(&self) -> Option<&Mutex<Vec<Value>>> {
        match self.payload() {
            Payload::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Remaining elements, if this is an iterator
    pub fn as_iterator(&self) -> Option<&Mutex<std::vec::IntoIter<Value>>> {
        match self.payload() {
            Payload::Iterator(rest) => Some(rest),
            _ => None,
        }
    }

    /// Array storage, if this is an array
    pub fn as_array(&self) -> Option<&ArrayData> {
        match self.payload() {
            Payload::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Named class, if this is a class object
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self.payload() {
            Payload::Class(class) => Some(class),
            _ => None,
        }
    }

    /// View, if this is an import namespace
    pub fn as_view(&self) -> Option<&Arc<JvmView>> {
        match self.payload() {
            Payload::View(view) => Some(view),
            _ => None,
        }
    }

    /// Throwable, if this wraps one
    pub fn throwable(&self) -> Option<Throwable> {
        match self.payload() {
            Payload::Throwable(t) => Some(t.lock().clone()),
            _ => None,
        }
    }

    /// Replace the wrapped throwable. Used by throwable constructors.
    pub fn set_throwable(&self, throwable: Throwable) -> bool {
        match self.payload() {
            Payload::Throwable(t) => {
                *t.lock() = throwable;
                true
            }
            _ => false,
        }
    }

    /// Take the byte source out of a stream object. A stream can be read once.
    pub fn take_stream(&self) -> Option<ByteSource> {
        match self.payload() {
            Payload::Stream(source) => source.lock().take(),
            _ => None,
        }
    }

    /// Read an instance field
    pub fn field(&self, name: &str) -> Option<Value> {
        match self.payload() {
            Payload::Fields(fields) => fields.lock().get(name).cloned(),
            _ => None,
        }
    }

    /// Write an instance field. Returns false if the object has no such field.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        match self.payload() {
            Payload::Fields(fields) => {
                let mut fields = fields.lock();
                match fields.get_mut(name) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Payload::Throwable(t) => write!(f, "{}", t.lock()),
            Payload::Class(class) => write!(f, "class {}", class.name()),
            _ => write!(f, "{}@{:x}", self.class().name(), self.identity()),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}@{:x})", self.class().name(), self.identity())
    }
}
