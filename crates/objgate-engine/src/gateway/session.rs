//! Per-connection session
//!
//! A [`Session`] is the bridge between decoded wire values and live objects
//! for one connection. Reference ids it hands out are valid only on that
//! connection and are released when the session is dropped.

use std::sync::Arc;

use super::registry::ObjectRegistry;
use super::view::{JvmView, DEFAULT_VIEW_ID};
use super::Gateway;
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::codec::{decode, ReferenceResolver};
use crate::protocol::{ReferenceKind, ReturnObject, ENTRY_POINT_ID, STATIC_PREFIX};
use crate::reflect::{ClassRef, MemberContext};
use crate::value::{Object, Payload, Value};

/// Per-connection view of the gateway
pub struct Session {
    gateway: Arc<Gateway>,
    objects: ObjectRegistry,
}

impl Session {
    /// Open a session; binds the entry point and default view ids
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let objects = ObjectRegistry::new();
        if let Some(entry_point) = gateway.entry_point() {
            objects.bind(ENTRY_POINT_ID, entry_point.clone());
        }
        objects.bind(DEFAULT_VIEW_ID, gateway.default_view_object().clone());
        Self { gateway, objects }
    }

    /// Shared gateway
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// References owned by this session
    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    /// Wrap a value for the wire, registering objects
    pub fn return_object(&self, value: Value) -> ReturnObject {
        match value {
            Value::Null => ReturnObject::Null,
            Value::Object(object) => {
                let kind = match object.payload() {
                    Payload::List(_) => ReferenceKind::List,
                    Payload::Array(_) => ReferenceKind::Array,
                    Payload::Map(_) => ReferenceKind::Map,
                    Payload::Set(_) => ReferenceKind::Set,
                    Payload::Iterator(_) => ReferenceKind::Iterator,
                    _ => ReferenceKind::Object,
                };
                ReturnObject::Reference {
                    id: self.objects.insert(&object),
                    kind,
                }
            }
            primitive => ReturnObject::Primitive(primitive),
        }
    }

    /// ERROR for a failed operation. A throwable raised by invoked code is
    /// registered on this session and returned by reference.
    pub fn error_object(&self, err: &GatewayError) -> ReturnObject {
        match err {
            GatewayError::Target(throwable) => {
                let object = self.gateway.classes().throwable_object(throwable.clone());
                ReturnObject::Thrown {
                    id: self.objects.insert(&object),
                    trace: throwable.render(),
                }
            }
            other => ReturnObject::error(other),
        }
    }

    /// Look up a referenced object
    pub fn object(&self, id: &str) -> GatewayResult<Object> {
        self.objects
            .get(id)
            .ok_or_else(|| GatewayError::NoSuchReference(id.to_string()))
    }

    /// Release a reference. Reserved ids stay bound.
    pub fn delete(&self, id: &str) -> bool {
        if id == ENTRY_POINT_ID || id == DEFAULT_VIEW_ID {
            return false;
        }
        self.objects.remove(id).is_some()
    }

    /// Decode operand lines in order
    pub fn decode_arguments(&self, lines: &[String]) -> GatewayResult<Vec<Value>> {
        lines.iter().map(|line| decode(line, self)).collect()
    }

    /// Import view by reference id
    pub fn view(&self, id: &str) -> GatewayResult<Arc<JvmView>> {
        self.object(id)?
            .as_view()
            .cloned()
            .ok_or_else(|| GatewayError::Invalid(format!("{} is not a JVM view", id)))
    }

    /// Create a named view and register it
    pub fn create_view(&self, name: &str) -> ReturnObject {
        let id = self.objects.reserve_id();
        let view = Arc::new(JvmView::new(name, id.clone()));
        self.objects.bind(&id, self.gateway.classes().new_view(view));
        ReturnObject::Reference {
            id,
            kind: ReferenceKind::Object,
        }
    }

    /// Resolve a class name through the default view
    pub fn resolve_class(&self, name: &str) -> GatewayResult<ClassRef> {
        let view = self.gateway.default_view();
        Ok(self.gateway.resolve_class(name, view.map(|v| v.as_ref()))?)
    }

    /// Invoke a method and return its raw result; `None` for void methods.
    /// A target of the form `z:<class>` calls a static method.
    pub fn call(&self, target_id: &str, method: &str, args: Vec<Value>) -> GatewayResult<Option<Value>> {
        let engine = self.gateway.engine();
        let (receiver, class, context) = match target_id.strip_prefix(STATIC_PREFIX) {
            Some(class_name) => (None, self.resolve_class(class_name)?, MemberContext::Static),
            None => {
                let object = self.object(target_id)?;
                let class = object.class().clone();
                (Some(object), class, MemberContext::Instance)
            }
        };

        let invoker = engine.get_method(&class, method, &args, context)?;
        let value = engine.invoke(receiver.as_ref(), &invoker, args)?;
        Ok((!invoker.returns_void()).then_some(value))
    }

    /// Invoke a method. Failures raised by the invoked code are captured as
    /// an ERROR referencing the registered throwable; lookup failures are
    /// returned.
    pub fn invoke(&self, method: &str, target_id: &str, args: Vec<Value>) -> GatewayResult<ReturnObject> {
        match self.call(target_id, method, args) {
            Ok(Some(value)) => Ok(self.return_object(value)),
            Ok(None) => Ok(ReturnObject::Void),
            Err(err @ GatewayError::Target(_)) => Ok(self.error_object(&err)),
            Err(err) => Err(err),
        }
    }

    /// Construct an instance of a class
    pub fn invoke_constructor(&self, class_name: &str, args: Vec<Value>) -> GatewayResult<ReturnObject> {
        let engine = self.gateway.engine();
        let class = self.resolve_class(class_name)?;
        let invoker = engine.get_constructor(&class, &args)?;
        match engine.invoke(None, &invoker, args) {
            Ok(value) => Ok(self.return_object(value)),
            Err(err @ GatewayError::Target(_)) => Ok(self.error_object(&err)),
            Err(err) => Err(err),
        }
    }
}

impl ReferenceResolver for Session {
    fn resolve_reference(&self, id: &str) -> GatewayResult<Object> {
        self.object(id)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let released = self.objects.len();
        self.objects.clear();
        tracing::debug!(released, "session closed");
    }
}
