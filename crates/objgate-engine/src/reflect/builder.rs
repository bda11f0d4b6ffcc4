//! Class builder
//!
//! Host code declares gateway-visible classes with [`ClassBuilder`] and the
//! member definitions below, then registers the result in a
//! [`ClassRegistry`](super::ClassRegistry).
//!
//! ```ignore
//! let counter = ClassBuilder::new("demo.Counter")
//!     .field(FieldDefinition::new("count", TypeDesc::int()))
//!     .method(
//!         MethodDefinition::new("increment", |call| { /* ... */ })
//!             .with_param(TypeDesc::int())
//!             .returns(TypeDesc::int()),
//!     )
//!     .build();
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use super::class::{
    ClassDef, ConstructorDef, ConstructorFn, FieldDef, Invocation, Layout, MethodDef, MethodFn,
};
use super::types::{TypeDesc, OBJECT_CLASS};
use crate::throwable::Throwable;
use crate::value::Value;

/// Definition for a field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    def: FieldDef,
}

impl FieldDefinition {
    /// Create a new instance field
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            def: FieldDef {
                name: name.into(),
                ty,
                is_static: false,
                is_readonly: false,
                initial: None,
            },
        }
    }

    /// Set the initial value
    pub fn initial_value(mut self, value: Value) -> Self {
        self.def.initial = Some(value);
        self
    }

    /// Mark as static field
    pub fn as_static(mut self) -> Self {
        self.def.is_static = true;
        self
    }

    /// Mark as readonly
    pub fn as_readonly(mut self) -> Self {
        self.def.is_readonly = true;
        self
    }
}

/// Definition for a method overload
pub struct MethodDefinition {
    name: String,
    params: Vec<TypeDesc>,
    varargs: bool,
    returns: TypeDesc,
    is_static: bool,
    body: MethodFn,
}

impl MethodDefinition {
    /// Create a new instance method returning void
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, Throwable> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            varargs: false,
            returns: TypeDesc::Void,
            is_static: false,
            body: Arc::new(body),
        }
    }

    /// Mark as static method
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set return type
    pub fn returns(mut self, ty: TypeDesc) -> Self {
        self.returns = ty;
        self
    }

    /// Add a parameter
    pub fn with_param(mut self, ty: TypeDesc) -> Self {
        self.params.push(ty);
        self
    }

    /// Add a trailing variable-arity parameter of `component` type
    pub fn with_varargs(mut self, component: TypeDesc) -> Self {
        self.params.push(component.array_of());
        self.varargs = true;
        self
    }
}

/// Definition for a constructor overload
pub struct ConstructorDefinition {
    params: Vec<TypeDesc>,
    varargs: bool,
    body: ConstructorFn,
}

impl ConstructorDefinition {
    /// Create a new constructor
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<(), Throwable> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            varargs: false,
            body: Arc::new(body),
        }
    }

    /// Constructor that only allocates
    pub fn empty() -> Self {
        Self::new(|_| Ok(()))
    }

    /// Add a parameter
    pub fn with_param(mut self, ty: TypeDesc) -> Self {
        self.params.push(ty);
        self
    }

    /// Add a trailing variable-arity parameter of `component` type
    pub fn with_varargs(mut self, component: TypeDesc) -> Self {
        self.params.push(component.array_of());
        self.varargs = true;
        self
    }
}

/// Builder for a [`ClassDef`]
pub struct ClassBuilder {
    name: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    is_interface: bool,
    is_abstract: bool,
    layout: Layout,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDefinition>,
    constructors: Vec<ConstructorDefinition>,
    nested: Vec<String>,
}

impl ClassBuilder {
    /// Start a class extending `gate.lang.Object`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let superclass = if name == OBJECT_CLASS {
            None
        } else {
            Some(OBJECT_CLASS.to_string())
        };
        Self {
            name,
            superclass,
            interfaces: Vec::new(),
            is_interface: false,
            is_abstract: false,
            layout: Layout::Fields,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            nested: Vec::new(),
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Declare an interface; interfaces have no constructors
    pub fn as_interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    /// Forbid construction from the wire
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Storage for new instances
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field.def);
        self
    }

    /// Add a method overload
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor overload
    pub fn constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Declare a nested class by simple name; register it as `Outer$Inner`
    pub fn nested(mut self, simple_name: impl Into<String>) -> Self {
        self.nested.push(format!("{}${}", self.name, simple_name.into()));
        self
    }

    /// Finish the class. Concrete classes without constructors get an
    /// empty zero-argument one.
    pub fn build(mut self) -> ClassDef {
        if self.constructors.is_empty() && !self.is_interface && !self.is_abstract {
            self.constructors.push(ConstructorDefinition::empty());
        }

        let statics = self
            .fields
            .iter()
            .filter(|f| f.is_static)
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect();

        ClassDef {
            name: self.name,
            superclass: self.superclass,
            interfaces: self.interfaces,
            is_interface: self.is_interface,
            is_abstract: self.is_abstract,
            layout: self.layout,
            fields: self.fields,
            methods: self
                .methods
                .into_iter()
                .map(|m| {
                    Arc::new(MethodDef {
                        name: m.name,
                        params: m.params,
                        varargs: m.varargs,
                        returns: m.returns,
                        is_static: m.is_static,
                        body: m.body,
                    })
                })
                .collect(),
            constructors: self
                .constructors
                .into_iter()
                .map(|c| {
                    Arc::new(ConstructorDef {
                        params: c.params,
                        varargs: c.varargs,
                        body: c.body,
                    })
                })
                .collect(),
            nested: self.nested,
            statics: Mutex::new(statics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_definition_builder() {
        let class = ClassBuilder::new("demo.Config")
            .field(
                FieldDefinition::new("LIMIT", TypeDesc::int())
                    .as_static()
                    .as_readonly()
                    .initial_value(Value::Int(8)),
            )
            .field(FieldDefinition::new("name", TypeDesc::String))
            .build();

        let limit = class.declared_field("LIMIT").unwrap();
        assert!(limit.is_static);
        assert!(limit.is_readonly);
        assert_eq!(class.static_value("LIMIT"), Some(Value::Int(8)));
        assert_eq!(class.static_value("name"), None);
    }

    #[test]
    fn test_method_definition_builder() {
        let class = ClassBuilder::new("demo.Math")
            .method(
                MethodDefinition::new("sum", |call| Ok(Value::Int(call.args().len() as i32)))
                    .as_static()
                    .with_param(TypeDesc::String)
                    .with_varargs(TypeDesc::int())
                    .returns(TypeDesc::int()),
            )
            .build();

        let sum = &class.declared_methods()[0];
        assert!(sum.is_static);
        assert!(sum.varargs);
        assert_eq!(sum.signature(true), "sum(String, int...) : int");
        assert_eq!(sum.signature(false), "sum(gate.lang.String, int...) : int");
    }

    #[test]
    fn test_default_constructor_added() {
        let concrete = ClassBuilder::new("demo.Plain").build();
        assert_eq!(concrete.constructors().len(), 1);

        let iface = ClassBuilder::new("demo.Shape").as_interface().build();
        assert!(iface.constructors().is_empty());
        assert!(!iface.is_instantiable());
    }

    #[test]
    fn test_nested_and_signature() {
        let class = ClassBuilder::new("demo.Outer")
            .extends("demo.Base")
            .implements("demo.Shape")
            .nested("Inner")
            .build();
        assert_eq!(class.nested_classes(), &["demo.Outer$Inner".to_string()]);
        assert_eq!(class.signature(true), "Outer extends demo.Base implements demo.Shape");
    }
}
