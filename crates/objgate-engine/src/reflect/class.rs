//! Class definitions
//!
//! A [`ClassDef`] describes a host class that is reachable through the
//! gateway: its place in the hierarchy, its fields, its overloaded methods
//! and constructors, and its nested classes.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::registry::ClassRegistry;
use super::types::{package_name, simple_name, TypeDesc};
use crate::throwable::Throwable;
use crate::value::{Object, Value};

/// Method body. Arguments arrive already converted to the declared types.
pub type MethodFn = Arc<dyn Fn(&Invocation<'_>) -> Result<Value, Throwable> + Send + Sync>;

/// Constructor body. Runs against the freshly allocated receiver.
pub type ConstructorFn = Arc<dyn Fn(&Invocation<'_>) -> Result<(), Throwable> + Send + Sync>;

/// Storage allocated for new instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Field map
    Fields,
    /// Growable list
    List,
    /// Key/value map
    Map,
    /// Set of distinct values
    Set,
    /// Throwable payload
    Throwable,
}

/// Field declaration
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: TypeDesc,
    /// Whether this is a static field
    pub is_static: bool,
    /// Whether writes are rejected
    pub is_readonly: bool,
    /// Initial value (defaults to the type's zero value)
    pub initial: Option<Value>,
}

impl FieldDef {
    /// Value a fresh slot starts with
    pub fn initial_value(&self) -> Value {
        self.initial.clone().unwrap_or_else(|| self.ty.default_value())
    }

    /// `name : type`
    pub fn signature(&self, short: bool) -> String {
        format!("{} : {}", self.name, self.ty.display_name(short))
    }
}

/// One method overload
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Parameter types
    pub params: Vec<TypeDesc>,
    /// Trailing parameter is variable-arity
    pub varargs: bool,
    /// Return type
    pub returns: TypeDesc,
    /// Whether this is a static method
    pub is_static: bool,
    /// Implementation
    pub body: MethodFn,
}

impl MethodDef {
    /// `name(int, String) : void`
    pub fn signature(&self, short: bool) -> String {
        format!(
            "{}({}) : {}",
            self.name,
            param_list(&self.params, self.varargs, short),
            self.returns.display_name(short)
        )
    }

    /// Whether both overloads take the same parameter types
    pub fn same_params(&self, other: &MethodDef) -> bool {
        self.params == other.params && self.varargs == other.varargs
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodDef({})", self.signature(false))
    }
}

/// One constructor overload
pub struct ConstructorDef {
    /// Parameter types
    pub params: Vec<TypeDesc>,
    /// Trailing parameter is variable-arity
    pub varargs: bool,
    /// Implementation
    pub body: ConstructorFn,
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstructorDef({})", param_list(&self.params, self.varargs, false))
    }
}

fn param_list(params: &[TypeDesc], varargs: bool, short: bool) -> String {
    let mut names: Vec<String> = params.iter().map(|p| p.display_name(short)).collect();
    if varargs {
        if let Some(last) = names.last_mut() {
            if let Some(stripped) = last.strip_suffix("[]") {
                *last = format!("{}...", stripped);
            }
        }
    }
    names.join(", ")
}

/// A host class
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) superclass: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) is_interface: bool,
    pub(crate) is_abstract: bool,
    pub(crate) layout: Layout,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) methods: Vec<Arc<MethodDef>>,
    pub(crate) constructors: Vec<Arc<ConstructorDef>>,
    pub(crate) nested: Vec<String>,
    pub(crate) statics: Mutex<FxHashMap<String, Value>>,
}

impl ClassDef {
    /// Fully-qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without package
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Package, empty for the default package
    pub fn package(&self) -> &str {
        package_name(&self.name)
    }

    /// Direct superclass name
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Implemented interface names
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Whether this is an interface
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    /// Whether instances can be constructed from the wire
    pub fn is_instantiable(&self) -> bool {
        !self.is_interface && !self.is_abstract
    }

    /// Storage for new instances
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Fields declared by this class (not inherited)
    pub fn declared_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Methods declared by this class (not inherited)
    pub fn declared_methods(&self) -> &[Arc<MethodDef>] {
        &self.methods
    }

    /// Declared constructors
    pub fn constructors(&self) -> &[Arc<ConstructorDef>] {
        &self.constructors
    }

    /// Fully-qualified names of nested classes (`Outer$Inner`)
    pub fn nested_classes(&self) -> &[String] {
        &self.nested
    }

    /// Declared field by name
    pub fn declared_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current value of a static field declared here
    pub fn static_value(&self, name: &str) -> Option<Value> {
        self.statics.lock().get(name).cloned()
    }

    /// Write a static field declared here. Returns false if there is none.
    pub fn set_static_value(&self, name: &str, value: Value) -> bool {
        let mut statics = self.statics.lock();
        match statics.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// `Name extends Super implements A, B`
    pub fn signature(&self, short: bool) -> String {
        let mut out = if short {
            self.simple_name().to_string()
        } else {
            self.name.clone()
        };
        if let Some(superclass) = &self.superclass {
            out.push_str(" extends ");
            out.push_str(superclass);
        }
        if !self.interfaces.is_empty() {
            out.push_str(" implements ");
            out.push_str(&self.interfaces.join(", "));
        }
        out
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("superclass", &self.superclass)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ============================================================================
// Invocation
// ============================================================================

static NULL: Value = Value::Null;

/// Receiver and converted arguments of one call
pub struct Invocation<'a> {
    receiver: Option<&'a Object>,
    args: &'a [Value],
    classes: &'a ClassRegistry,
}

impl<'a> Invocation<'a> {
    /// Create an invocation
    pub fn new(receiver: Option<&'a Object>, args: &'a [Value], classes: &'a ClassRegistry) -> Self {
        Self {
            receiver,
            args,
            classes,
        }
    }

    /// Receiver of an instance call
    pub fn this(&self) -> Result<&'a Object, Throwable> {
        self.receiver.ok_or_else(|| {
            Throwable::new("gate.lang.NullPointerException", "instance method called without receiver")
        })
    }

    /// All arguments
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Argument by position, null when absent
    pub fn arg(&self, index: usize) -> &'a Value {
        self.args.get(index).unwrap_or(&NULL)
    }

    /// Class registry, for allocating result objects
    pub fn classes(&self) -> &'a ClassRegistry {
        self.classes
    }

    /// `int` argument
    pub fn int(&self, index: usize) -> Result<i32, Throwable> {
        self.arg(index)
            .as_i32()
            .ok_or_else(|| self.mismatch(index, "int"))
    }

    /// `long` argument
    pub fn long(&self, index: usize) -> Result<i64, Throwable> {
        self.arg(index)
            .as_i64()
            .ok_or_else(|| self.mismatch(index, "long"))
    }

    /// `double` argument
    pub fn double(&self, index: usize) -> Result<f64, Throwable> {
        self.arg(index)
            .as_f64()
            .ok_or_else(|| self.mismatch(index, "double"))
    }

    /// `boolean` argument
    pub fn boolean(&self, index: usize) -> Result<bool, Throwable> {
        self.arg(index)
            .as_bool()
            .ok_or_else(|| self.mismatch(index, "boolean"))
    }

    /// `String` argument
    pub fn string(&self, index: usize) -> Result<&'a str, Throwable> {
        self.arg(index)
            .as_str()
            .ok_or_else(|| self.mismatch(index, "gate.lang.String"))
    }

    fn mismatch(&self, index: usize, expected: &str) -> Throwable {
        Throwable::illegal_argument(format!(
            "argument {} expected {}, got {}",
            index,
            expected,
            self.arg(index).type_name()
        ))
    }
}
