//! `gate.lang.Math`
//!
//! Static numeric helpers, overloaded per primitive width so that overload
//! resolution picks the narrowest matching form.

use objgate_engine::reflect::{ClassBuilder, MethodDefinition};
use objgate_engine::{ClassRegistry, TypeDesc, Value};

/// Fully-qualified class name
pub const MATH_CLASS: &str = "gate.lang.Math";

fn binary(name: &str, ty: TypeDesc, body: fn(&Value, &Value) -> Value) -> MethodDefinition {
    MethodDefinition::new(name, move |call| Ok(body(call.arg(0), call.arg(1))))
        .as_static()
        .with_param(ty.clone())
        .with_param(ty.clone())
        .returns(ty)
}

fn unary(name: &str, ty: TypeDesc, body: fn(&Value) -> Value) -> MethodDefinition {
    MethodDefinition::new(name, move |call| Ok(body(call.arg(0))))
        .as_static()
        .with_param(ty.clone())
        .returns(ty)
}

fn int(v: &Value) -> i32 {
    v.as_i32().unwrap_or_default()
}

fn long(v: &Value) -> i64 {
    v.as_i64().unwrap_or_default()
}

fn double(v: &Value) -> f64 {
    v.as_f64().unwrap_or_default()
}

/// Register `gate.lang.Math`
pub fn register(registry: &ClassRegistry) {
    let class = ClassBuilder::new(MATH_CLASS)
        .as_abstract()
        .method(binary("max", TypeDesc::int(), |a, b| Value::Int(int(a).max(int(b)))))
        .method(binary("max", TypeDesc::long(), |a, b| Value::Long(long(a).max(long(b)))))
        .method(binary("max", TypeDesc::double(), |a, b| Value::Double(double(a).max(double(b)))))
        .method(binary("min", TypeDesc::int(), |a, b| Value::Int(int(a).min(int(b)))))
        .method(binary("min", TypeDesc::long(), |a, b| Value::Long(long(a).min(long(b)))))
        .method(binary("min", TypeDesc::double(), |a, b| Value::Double(double(a).min(double(b)))))
        .method(unary("abs", TypeDesc::int(), |a| Value::Int(int(a).wrapping_abs())))
        .method(unary("abs", TypeDesc::long(), |a| Value::Long(long(a).wrapping_abs())))
        .method(unary("abs", TypeDesc::double(), |a| Value::Double(double(a).abs())))
        .method(unary("sqrt", TypeDesc::double(), |a| Value::Double(double(a).sqrt())))
        .method(binary("pow", TypeDesc::double(), |a, b| Value::Double(double(a).powf(double(b)))))
        .build();
    registry.register(class);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use objgate_engine::{Gateway, ReturnObject};

    fn call(method: &str, args: Vec<Value>) -> ReturnObject {
        let registry = ClassRegistry::new();
        register(&registry);
        let gateway = Arc::new(Gateway::new(Arc::new(registry)));
        let session = gateway.session();
        session.invoke(method, "z:gate.lang.Math", args).unwrap()
    }

    #[test]
    fn test_max_picks_width() {
        assert_eq!(call("max", vec![Value::Int(3), Value::Int(9)]), ReturnObject::Primitive(Value::Int(9)));
        assert_eq!(call("max", vec![Value::Int(3), Value::Long(2)]), ReturnObject::Primitive(Value::Long(3)));
        assert_eq!(
            call("max", vec![Value::Double(1.5), Value::Int(1)]),
            ReturnObject::Primitive(Value::Double(1.5))
        );
    }

    #[test]
    fn test_abs_and_sqrt() {
        assert_eq!(call("abs", vec![Value::Int(-4)]), ReturnObject::Primitive(Value::Int(4)));
        assert_eq!(call("abs", vec![Value::Long(-4)]), ReturnObject::Primitive(Value::Long(4)));
        assert_eq!(call("sqrt", vec![Value::Int(16)]), ReturnObject::Primitive(Value::Double(4.0)));
    }

    #[test]
    fn test_not_instantiable() {
        let registry = ClassRegistry::new();
        register(&registry);
        let gateway = Arc::new(Gateway::new(Arc::new(registry)));
        assert!(gateway.session().invoke_constructor("gate.lang.Math", vec![]).is_err());
    }
}
