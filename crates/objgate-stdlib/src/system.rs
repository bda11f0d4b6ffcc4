//! `gate.lang.System`

use std::time::{SystemTime, UNIX_EPOCH};

use objgate_engine::reflect::{ClassBuilder, MethodDefinition};
use objgate_engine::{ClassRegistry, TypeDesc, Value};

/// Fully-qualified class name
pub const SYSTEM_CLASS: &str = "gate.lang.System";

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// Register `gate.lang.System`
pub fn register(registry: &ClassRegistry) {
    let class = ClassBuilder::new(SYSTEM_CLASS)
        .as_abstract()
        .method(
            MethodDefinition::new("getenv", |call| {
                Ok(std::env::var(call.string(0)?)
                    .map(Value::Str)
                    .unwrap_or(Value::Null))
            })
            .as_static()
            .with_param(TypeDesc::String)
            .returns(TypeDesc::String),
        )
        .method(
            MethodDefinition::new("currentTimeMillis", |_| {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or(0);
                Ok(Value::Long(millis))
            })
            .as_static()
            .returns(TypeDesc::long()),
        )
        .method(
            MethodDefinition::new("lineSeparator", |_| Ok(Value::from(LINE_SEPARATOR)))
                .as_static()
                .returns(TypeDesc::String),
        )
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
        let session = Arc::new(Gateway::new(Arc::new(registry))).session();
        session
            .invoke(method, &format!("z:{}", SYSTEM_CLASS), args)
            .unwrap()
    }

    #[test]
    fn test_getenv() {
        std::env::set_var("OBJGATE_SYSTEM_TEST", "present");
        assert_eq!(
            call("getenv", vec![Value::from("OBJGATE_SYSTEM_TEST")]),
            ReturnObject::Primitive(Value::from("present"))
        );
        assert_eq!(
            call("getenv", vec![Value::from("OBJGATE_SYSTEM_TEST_UNSET")]),
            ReturnObject::Null
        );
    }

    #[test]
    fn test_current_time_is_positive() {
        match call("currentTimeMillis", vec![]) {
            ReturnObject::Primitive(Value::Long(millis)) => assert!(millis > 0),
            other => panic!("unexpected {:?}", other),
        }
    }
}
