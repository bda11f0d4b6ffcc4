//! Reflection engine
//!
//! Locates members by name, runs overload resolution against concrete
//! arguments, invokes bodies with panic capture, and builds arrays.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::class::{ClassDef, ConstructorDef, FieldDef, Invocation, MethodDef};
use super::convert::{coerce, ArgType};
use super::registry::{ClassRef, ClassRegistry};
use super::resolve::{resolve, Resolution, Signature};
use super::types::{Primitive, TypeDesc};
use crate::error::{GatewayError, GatewayResult, ReflectError};
use crate::throwable::{Throwable, RUNTIME_EXCEPTION};
use crate::value::{Object, Value};

/// Whether a lookup starts from a class or from an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberContext {
    /// Lookup through a class name; only static members qualify
    Static,
    /// Lookup through an instance; static and instance members qualify
    Instance,
}

/// A field found by name, with its declaring class
#[derive(Debug, Clone)]
pub struct FieldRef {
    owner: ClassRef,
    index: usize,
}

impl FieldRef {
    /// Declaring class
    pub fn owner(&self) -> &ClassRef {
        &self.owner
    }

    /// Field declaration
    pub fn def(&self) -> &FieldDef {
        &self.owner.declared_fields()[self.index]
    }
}

#[derive(Debug, Clone)]
enum Target {
    Method(Arc<MethodDef>),
    Constructor(Arc<ConstructorDef>),
}

/// A resolved method or constructor, ready to invoke
#[derive(Debug, Clone)]
pub struct MethodInvoker {
    class: ClassRef,
    target: Target,
    resolution: Resolution,
}

impl MethodInvoker {
    /// Whether the target returns nothing
    pub fn returns_void(&self) -> bool {
        match &self.target {
            Target::Method(m) => m.returns == TypeDesc::Void,
            Target::Constructor(_) => false,
        }
    }

    /// Whether the target is a static method
    pub fn is_static(&self) -> bool {
        matches!(&self.target, Target::Method(m) if m.is_static)
    }

    /// Frame name used in traces
    fn frame(&self) -> String {
        match &self.target {
            Target::Method(m) => format!("{}.{}", self.class.name(), m.name),
            Target::Constructor(_) => format!("{}.<init>", self.class.name()),
        }
    }
}

/// Reflective access to registered classes
pub struct ReflectionEngine {
    classes: Arc<ClassRegistry>,
}

impl ReflectionEngine {
    /// Create an engine over a class registry
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self { classes }
    }

    /// Class registry
    pub fn classes(&self) -> &Arc<ClassRegistry> {
        &self.classes
    }

    /// Look up a class by fully-qualified name
    pub fn class_for_name(&self, name: &str) -> Result<ClassRef, ReflectError> {
        self.classes
            .get(name)
            .ok_or_else(|| ReflectError::NoSuchClass(name.to_string()))
    }

    // ------------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------------

    /// Find a field by name, walking the superclass chain
    pub fn get_field(&self, class: &ClassRef, name: &str, context: MemberContext) -> Option<FieldRef> {
        self.classes.hierarchy(class).into_iter().find_map(|owner| {
            let index = owner.declared_fields().iter().position(|f| {
                f.name == name && (context == MemberContext::Instance || f.is_static)
            })?;
            Some(FieldRef { owner, index })
        })
    }

    /// Read a field
    pub fn get_field_value(&self, target: Option<&Object>, field: &FieldRef) -> Value {
        let def = field.def();
        if def.is_static {
            return field.owner.static_value(&def.name).unwrap_or(Value::Null);
        }
        target
            .and_then(|object| object.field(&def.name))
            .unwrap_or(Value::Null)
    }

    /// Write a field after converting the value to its declared type
    pub fn set_field_value(
        &self,
        target: Option<&Object>,
        field: &FieldRef,
        value: Value,
    ) -> Result<(), ReflectError> {
        let def = field.def();
        if def.is_readonly {
            return Err(ReflectError::ReadOnlyField {
                class: field.owner.name().to_string(),
                name: def.name.clone(),
            });
        }
        let value = coerce(value, &def.ty, &self.classes)?;
        let written = if def.is_static {
            field.owner.set_static_value(&def.name, value)
        } else {
            target.is_some_and(|object| object.set_field(&def.name, value))
        };
        if written {
            Ok(())
        } else {
            Err(ReflectError::NoSuchField {
                class: field.owner.name().to_string(),
                name: def.name.clone(),
            })
        }
    }

    // ------------------------------------------------------------------------
    // Methods and constructors
    // ------------------------------------------------------------------------

    /// Overloads visible on `class` under `name`. Overrides in subclasses
    /// hide the superclass declaration with the same parameters.
    fn method_candidates(&self, class: &ClassRef, name: &str) -> Vec<(ClassRef, Arc<MethodDef>)> {
        let mut found: Vec<(ClassRef, Arc<MethodDef>)> = Vec::new();
        for owner in self.classes.hierarchy(class) {
            for method in owner.declared_methods().iter().filter(|m| m.name == name) {
                if !found.iter().any(|(_, m)| m.same_params(method)) {
                    found.push((owner.clone(), method.clone()));
                }
            }
        }
        found
    }

    /// Resolve a method overload for the given arguments
    pub fn get_method(
        &self,
        class: &ClassRef,
        name: &str,
        args: &[Value],
        context: MemberContext,
    ) -> Result<MethodInvoker, ReflectError> {
        let all = self.method_candidates(class, name);
        let candidates: Vec<(ClassRef, Arc<MethodDef>)> = match context {
            MemberContext::Instance => all,
            MemberContext::Static => {
                let statics: Vec<_> = all.iter().filter(|(_, m)| m.is_static).cloned().collect();
                if statics.is_empty() && !all.is_empty() {
                    return Err(ReflectError::StaticContext {
                        class: class.name().to_string(),
                        name: name.to_string(),
                    });
                }
                statics
            }
        };

        let arg_types: Vec<ArgType> = args.iter().map(ArgType::of).collect();
        let signatures: Vec<Signature<'_>> = candidates
            .iter()
            .map(|(_, m)| Signature {
                params: &m.params,
                varargs: m.varargs,
            })
            .collect();

        let resolution = resolve(&self.classes, &signatures, &arg_types).ok_or_else(|| {
            ReflectError::NoSuchMethod {
                class: class.name().to_string(),
                name: name.to_string(),
                args: arg_names(&arg_types),
            }
        })?;
        let (owner, method) = candidates[resolution.index].clone();
        Ok(MethodInvoker {
            class: owner,
            target: Target::Method(method),
            resolution,
        })
    }

    /// Whether `class` has any method named `name`
    pub fn has_method(&self, class: &ClassRef, name: &str, context: MemberContext) -> Option<bool> {
        let all = self.method_candidates(class, name);
        if all.is_empty() {
            return None;
        }
        Some(context == MemberContext::Instance || all.iter().any(|(_, m)| m.is_static))
    }

    /// Resolve a constructor overload for the given arguments
    pub fn get_constructor(&self, class: &ClassRef, args: &[Value]) -> Result<MethodInvoker, ReflectError> {
        let arg_types: Vec<ArgType> = args.iter().map(ArgType::of).collect();
        let no_match = || ReflectError::NoSuchConstructor {
            class: class.name().to_string(),
            args: arg_names(&arg_types),
        };
        if !class.is_instantiable() {
            return Err(no_match());
        }

        let signatures: Vec<Signature<'_>> = class
            .constructors()
            .iter()
            .map(|c| Signature {
                params: &c.params,
                varargs: c.varargs,
            })
            .collect();
        let resolution = resolve(&self.classes, &signatures, &arg_types).ok_or_else(no_match)?;
        Ok(MethodInvoker {
            class: class.clone(),
            target: Target::Constructor(class.constructors()[resolution.index].clone()),
            resolution,
        })
    }

    /// Convert arguments and run the resolved target. Constructors return
    /// the new object. Failures raised by the body come back as
    /// [`GatewayError::Target`].
    pub fn invoke(
        &self,
        receiver: Option<&Object>,
        invoker: &MethodInvoker,
        args: Vec<Value>,
    ) -> GatewayResult<Value> {
        let args = self.convert_arguments(&invoker.resolution, args)?;

        let outcome = match &invoker.target {
            Target::Method(method) => {
                let receiver = if method.is_static { None } else { receiver };
                let call = Invocation::new(receiver, &args, &self.classes);
                guarded(|| (method.body)(&call))
            }
            Target::Constructor(constructor) => {
                let instance = self.classes.new_instance(&invoker.class);
                let call = Invocation::new(Some(&instance), &args, &self.classes);
                guarded(|| (constructor.body)(&call)).map(|()| Value::Object(instance))
            }
        };

        outcome.map_err(|t| GatewayError::Target(t.with_frame(invoker.frame())))
    }

    fn convert_arguments(&self, resolution: &Resolution, args: Vec<Value>) -> Result<Vec<Value>, ReflectError> {
        let mut converted = args
            .into_iter()
            .zip(&resolution.converters)
            .map(|(value, converter)| converter.convert(value, &self.classes))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((from, component)) = &resolution.packed {
            let rest = converted.split_off(*from);
            let packed = if *component == TypeDesc::Primitive(Primitive::Byte) {
                Value::Bytes(
                    rest.iter()
                        .map(|v| v.as_i64().map(|b| b as u8).unwrap_or_default())
                        .collect(),
                )
            } else {
                Value::Object(self.classes.new_array(component.clone(), rest))
            };
            converted.push(packed);
        }
        Ok(converted)
    }

    // ------------------------------------------------------------------------
    // Arrays
    // ------------------------------------------------------------------------

    /// Create a (possibly multi-dimensional) array of `type_name` elements
    pub fn create_array(&self, type_name: &str, dimensions: &[i32]) -> Result<Object, ReflectError> {
        let element = TypeDesc::parse(type_name);
        match &element {
            TypeDesc::Void => {
                return Err(ReflectError::InvalidArray("void has no arrays".to_string()));
            }
            TypeDesc::Class(name) if !self.classes.contains(name) => {
                return Err(ReflectError::NoSuchClass(name.clone()));
            }
            _ => {}
        }
        if dimensions.is_empty() {
            return Err(ReflectError::InvalidArray("no dimensions given".to_string()));
        }
        if let Some(negative) = dimensions.iter().find(|d| **d < 0) {
            return Err(ReflectError::InvalidArray(format!("negative dimension {}", negative)));
        }
        Ok(self.build_array(&element, dimensions))
    }

    fn build_array(&self, element: &TypeDesc, dimensions: &[i32]) -> Object {
        let (len, inner) = (dimensions[0] as usize, &dimensions[1..]);
        let mut component = element.clone();
        for _ in inner {
            component = component.array_of();
        }
        let items = (0..len)
            .map(|_| {
                if inner.is_empty() {
                    element.default_value()
                } else {
                    Value::Object(self.build_array(element, inner))
                }
            })
            .collect();
        self.classes.new_array(component, items)
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Names of fields visible on instances of `class`, sorted
    pub fn field_names(&self, class: &ClassRef) -> Vec<String> {
        self.collect_names(class, |c| c.declared_fields().iter().map(|f| f.name.clone()).collect())
    }

    /// Names of methods visible on instances of `class`, sorted
    pub fn method_names(&self, class: &ClassRef) -> Vec<String> {
        self.collect_names(class, |c| c.declared_methods().iter().map(|m| m.name.clone()).collect())
    }

    /// Names of static fields, static methods and nested classes, sorted
    pub fn static_member_names(&self, class: &ClassRef) -> Vec<String> {
        self.collect_names(class, |c| {
            let fields = c.declared_fields().iter().filter(|f| f.is_static).map(|f| f.name.clone());
            let methods = c.declared_methods().iter().filter(|m| m.is_static).map(|m| m.name.clone());
            let nested = c
                .nested_classes()
                .iter()
                .map(|n| n.rsplit('$').next().unwrap_or(n).to_string());
            fields.chain(methods).chain(nested).collect()
        })
    }

    fn collect_names(&self, class: &ClassRef, names: impl Fn(&ClassDef) -> Vec<String>) -> Vec<String> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for owner in self.classes.hierarchy(class) {
            seen.extend(names(&owner));
        }
        let mut sorted: Vec<String> = seen.into_iter().collect();
        sorted.sort();
        sorted
    }

    /// Nested class of `class` by simple name
    pub fn nested_class(&self, class: &ClassRef, simple_name: &str) -> Option<ClassRef> {
        let fqn = format!("{}${}", class.name(), simple_name);
        class
            .nested_classes()
            .iter()
            .any(|n| *n == fqn)
            .then(|| self.classes.get(&fqn))
            .flatten()
    }
}

fn arg_names(args: &[ArgType]) -> String {
    args.iter().map(ArgType::name).collect::<Vec<_>>().join(", ")
}

/// Run a body, turning a panic into a `RuntimeException`
fn guarded<T>(body: impl FnOnce() -> Result<T, Throwable>) -> Result<T, Throwable> {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic in invoked code".to_string());
            Err(Throwable::new(RUNTIME_EXCEPTION, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::builder::{ClassBuilder, FieldDefinition, MethodDefinition};

    fn create_engine() -> ReflectionEngine {
        let classes = ClassRegistry::new();
        classes.register(
            ClassBuilder::new("demo.Shape")
                .field(FieldDefinition::new("SIDES", TypeDesc::int()).as_static().initial_value(Value::Int(0)))
                .field(FieldDefinition::new("label", TypeDesc::String))
                .method(
                    MethodDefinition::new("describe", |_| Ok(Value::from("shape"))).returns(TypeDesc::String),
                )
                .method(
                    MethodDefinition::new("unit", |_| Ok(Value::Int(1)))
                        .as_static()
                        .returns(TypeDesc::int()),
                )
                .nested("Kind")
                .build(),
        );
        classes.register(ClassBuilder::new("demo.Shape$Kind").build());
        classes.register(
            ClassBuilder::new("demo.Square")
                .extends("demo.Shape")
                .method(
                    MethodDefinition::new("describe", |_| Ok(Value::from("square"))).returns(TypeDesc::String),
                )
                .method(MethodDefinition::new("explode", |_| panic!("kaboom")))
                .build(),
        );
        ReflectionEngine::new(Arc::new(classes))
    }

    #[test]
    fn test_override_hides_super_method() {
        let engine = create_engine();
        let square = engine.class_for_name("demo.Square").unwrap();
        let invoker = engine.get_method(&square, "describe", &[], MemberContext::Instance).unwrap();
        let instance = engine.classes().new_instance(&square);
        let result = engine.invoke(Some(&instance), &invoker, vec![]).unwrap();
        assert_eq!(result, Value::from("square"));
    }

    #[test]
    fn test_static_context() {
        let engine = create_engine();
        let shape = engine.class_for_name("demo.Shape").unwrap();
        assert!(engine.get_method(&shape, "unit", &[], MemberContext::Static).is_ok());
        let err = engine.get_method(&shape, "describe", &[], MemberContext::Static).unwrap_err();
        assert!(matches!(err, ReflectError::StaticContext { .. }));
        let err = engine.get_method(&shape, "missing", &[], MemberContext::Static).unwrap_err();
        assert!(matches!(err, ReflectError::NoSuchMethod { .. }));
    }

    #[test]
    fn test_field_lookup_and_set() {
        let engine = create_engine();
        let square = engine.class_for_name("demo.Square").unwrap();
        let instance = engine.classes().new_instance(&square);

        let label = engine.get_field(&square, "label", MemberContext::Instance).unwrap();
        engine.set_field_value(Some(&instance), &label, Value::from("box")).unwrap();
        assert_eq!(engine.get_field_value(Some(&instance), &label), Value::from("box"));

        assert!(engine.get_field(&square, "label", MemberContext::Static).is_none());
        let sides = engine.get_field(&square, "SIDES", MemberContext::Static).unwrap();
        engine.set_field_value(None, &sides, Value::Int(4)).unwrap();
        assert_eq!(engine.get_field_value(None, &sides), Value::Int(4));

        let err = engine.set_field_value(Some(&instance), &label, Value::Int(3)).unwrap_err();
        assert!(matches!(err, ReflectError::Conversion { .. }));
    }

    #[test]
    fn test_panic_becomes_throwable() {
        let engine = create_engine();
        let square = engine.class_for_name("demo.Square").unwrap();
        let instance = engine.classes().new_instance(&square);
        let invoker = engine.get_method(&square, "explode", &[], MemberContext::Instance).unwrap();
        match engine.invoke(Some(&instance), &invoker, vec![]) {
            Err(GatewayError::Target(t)) => {
                assert_eq!(t.class_name(), RUNTIME_EXCEPTION);
                assert_eq!(t.message(), Some("kaboom"));
                assert_eq!(t.frames(), &["demo.Square.explode".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_multi_dimensional_array() {
        let engine = create_engine();
        let array = engine.create_array("int", &[2, 3]).unwrap();
        let outer = array.as_array().unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(*outer.component(), TypeDesc::int().array_of());
        let inner = outer.elements().lock()[0].clone();
        let inner = inner.as_object().unwrap().as_array().unwrap();
        assert_eq!(*inner.elements().lock(), vec![Value::Int(0); 3]);

        assert!(engine.create_array("demo.Missing", &[1]).is_err());
        assert!(engine.create_array("int", &[-1]).is_err());
    }

    #[test]
    fn test_static_names_and_nested() {
        let engine = create_engine();
        let shape = engine.class_for_name("demo.Shape").unwrap();
        assert_eq!(engine.static_member_names(&shape), vec!["Kind", "SIDES", "unit"]);
        assert!(engine.nested_class(&shape, "Kind").is_some());
        assert!(engine.nested_class(&shape, "Other").is_none());
    }
}
