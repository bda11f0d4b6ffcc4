//! Session Tests
//!
//! In-process use of the gateway through `Session`, without a socket:
//! reference identity, per-session isolation and overload resolution.
//!
//! # Running Tests
//! ```bash
//! cargo test --test session_tests
//! ```

use std::sync::Arc;

use objgate_engine::protocol::ReferenceKind;
use objgate_engine::reflect::{ClassBuilder, ConstructorDefinition, FieldDefinition, MethodDefinition};
use objgate_engine::throwable::Throwable;
use objgate_engine::{ClassRegistry, Gateway, GatewayError, ReturnObject, TypeDesc, Value};

fn create_gateway() -> Arc<Gateway> {
    let classes = ClassRegistry::new();
    classes.register(
        ClassBuilder::new("demo.Calc")
            .field(FieldDefinition::new("last", TypeDesc::String))
            .constructor(ConstructorDefinition::empty())
            .constructor(
                ConstructorDefinition::new(|call| {
                    let this = call.this()?;
                    this.set_field("last", Value::from(call.string(0)?));
                    Ok(())
                })
                .with_param(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("pick", |_| Ok(Value::from("int")))
                    .with_param(TypeDesc::int())
                    .returns(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("pick", |_| Ok(Value::from("long")))
                    .with_param(TypeDesc::long())
                    .returns(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("pick", |_| Ok(Value::from("double")))
                    .with_param(TypeDesc::double())
                    .returns(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("pick", |_| Ok(Value::from("object")))
                    .with_param(TypeDesc::Object)
                    .returns(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("sum", |call| {
                    let total = match call.arg(0).as_object().and_then(|o| o.as_array()) {
                        Some(array) => array.elements().lock().iter().filter_map(Value::as_i64).sum(),
                        None => 0,
                    };
                    Ok(Value::Long(total))
                })
                .with_varargs(TypeDesc::int())
                .returns(TypeDesc::long()),
            )
            .method(
                MethodDefinition::new("self", |call| Ok(Value::Object(call.this()?.clone())))
                    .returns(TypeDesc::class("demo.Calc")),
            )
            .method(
                MethodDefinition::new("nothing", |_| Ok(Value::Null)).returns(TypeDesc::String),
            )
            .method(MethodDefinition::new("fail", |_| {
                Err(Throwable::new("gate.lang.IllegalStateException", "broken")
                    .caused_by(Throwable::new("gate.lang.RuntimeException", "root")))
            }))
            .build(),
    );
    Arc::new(Gateway::new(Arc::new(classes)))
}

fn new_calc(session: &objgate_engine::Session) -> String {
    session
        .invoke_constructor("demo.Calc", vec![])
        .unwrap()
        .reference_id()
        .unwrap()
        .to_string()
}

#[test]
fn test_same_instance_same_id() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    let again = session.invoke("self", &id, vec![]).unwrap();
    assert_eq!(again.reference_id(), Some(id.as_str()));
}

#[test]
fn test_references_do_not_cross_sessions() {
    let gateway = create_gateway();
    let first = gateway.session();
    let second = gateway.session();
    let id = new_calc(&first);
    assert!(matches!(second.object(&id), Err(GatewayError::NoSuchReference(_))));
    assert!(first.object(&id).is_ok());
}

#[test]
fn test_overload_resolution_prefers_exact_type() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);

    let pick = |arg: Value| session.invoke("pick", &id, vec![arg]).unwrap();
    assert_eq!(pick(Value::Int(1)), ReturnObject::Primitive(Value::from("int")));
    assert_eq!(pick(Value::Long(1)), ReturnObject::Primitive(Value::from("long")));
    assert_eq!(pick(Value::Double(1.5)), ReturnObject::Primitive(Value::from("double")));
    assert_eq!(pick(Value::from("s")), ReturnObject::Primitive(Value::from("object")));
    assert_eq!(pick(Value::Short(3)), ReturnObject::Primitive(Value::from("int")));
}

#[test]
fn test_overload_resolution_is_deterministic() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    let results: Vec<ReturnObject> = (0..20)
        .map(|_| session.invoke("pick", &id, vec![Value::Null]).unwrap())
        .collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0], ReturnObject::Primitive(Value::from("object")));
}

#[test]
fn test_varargs_packing() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    let result = session
        .invoke("sum", &id, vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        .unwrap();
    assert_eq!(result, ReturnObject::Primitive(Value::Long(6)));
    let result = session.invoke("sum", &id, vec![]).unwrap();
    assert_eq!(result, ReturnObject::Primitive(Value::Long(0)));
}

#[test]
fn test_null_and_void_are_distinct() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    assert_eq!(session.invoke("nothing", &id, vec![]).unwrap(), ReturnObject::Null);
    assert!(session.invoke("fail", &id, vec![]).unwrap().is_error());
}

#[test]
fn test_target_failure_carries_cause_chain() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    match session.invoke("fail", &id, vec![]).unwrap() {
        ReturnObject::Thrown { id: thrown, trace } => {
            assert!(trace.starts_with("gate.lang.IllegalStateException: broken\n\tat demo.Calc.fail\n"));
            assert!(trace.contains("Caused by: gate.lang.RuntimeException: root"));
            let throwable = session.object(&thrown).unwrap().throwable().unwrap();
            assert_eq!(throwable.render(), trace);
        }
        other => panic!("expected an error, got {:?}", other),
    }
}

#[test]
fn test_constructor_overloads() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = session
        .invoke_constructor("demo.Calc", vec![Value::from("hello")])
        .unwrap()
        .reference_id()
        .unwrap()
        .to_string();
    let object = session.object(&id).unwrap();
    assert_eq!(object.field("last"), Some(Value::from("hello")));

    let err = session.invoke_constructor("demo.Calc", vec![Value::Int(1), Value::Int(2)]);
    assert!(matches!(err, Err(GatewayError::Reflection(_))));
}

#[test]
fn test_unknown_method_is_reflection_error() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    let err = session.invoke("missing", &id, vec![]).unwrap_err();
    assert!(err.to_string().starts_with("ReflectionError"));
    assert!(!err.is_fatal());
}

#[test]
fn test_delete_releases_reference() {
    let gateway = create_gateway();
    let session = gateway.session();
    let id = new_calc(&session);
    assert!(session.delete(&id));
    assert!(!session.delete(&id));
    assert!(!session.delete("j"));
    let next = new_calc(&session);
    assert_ne!(next, id);
}

#[test]
fn test_map_set_and_iterator_references() {
    let gateway = create_gateway();
    let session = gateway.session();

    let map = session.invoke_constructor("gate.util.HashMap", vec![]).unwrap();
    assert!(matches!(map, ReturnObject::Reference { kind: ReferenceKind::Map, .. }));
    let map = map.reference_id().unwrap().to_string();
    let put = |key: &str, value: i32| session.invoke("put", &map, vec![Value::from(key), Value::Int(value)]).unwrap();
    assert_eq!(put("a", 1), ReturnObject::Null);
    assert_eq!(put("b", 2), ReturnObject::Null);
    assert_eq!(put("a", 3), ReturnObject::Primitive(Value::Int(1)));
    assert_eq!(
        session.invoke("get", &map, vec![Value::from("a")]).unwrap(),
        ReturnObject::Primitive(Value::Int(3))
    );
    assert_eq!(session.invoke("get", &map, vec![Value::from("zz")]).unwrap(), ReturnObject::Null);

    let keys = session.invoke("keySet", &map, vec![]).unwrap();
    assert!(matches!(keys, ReturnObject::Reference { kind: ReferenceKind::Set, .. }));
    let keys = keys.reference_id().unwrap().to_string();
    assert_eq!(
        session.invoke("add", &keys, vec![Value::from("b")]).unwrap(),
        ReturnObject::Primitive(Value::Bool(false))
    );

    let iter = session.invoke("iterator", &keys, vec![]).unwrap();
    assert!(matches!(iter, ReturnObject::Reference { kind: ReferenceKind::Iterator, .. }));
    let iter = iter.reference_id().unwrap().to_string();
    let mut seen = Vec::new();
    while session.invoke("hasNext", &iter, vec![]).unwrap() == ReturnObject::Primitive(Value::Bool(true)) {
        seen.push(session.invoke("next", &iter, vec![]).unwrap());
    }
    assert_eq!(
        seen,
        vec![
            ReturnObject::Primitive(Value::from("a")),
            ReturnObject::Primitive(Value::from("b"))
        ]
    );
    match session.invoke("next", &iter, vec![]).unwrap() {
        ReturnObject::Thrown { trace, .. } => {
            assert!(trace.starts_with("gate.util.NoSuchElementException"), "{}", trace)
        }
        other => panic!("expected an exhausted iterator, got {:?}", other),
    }
}
