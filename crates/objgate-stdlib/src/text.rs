//! `gate.lang.StringBuilder`

use objgate_engine::reflect::{ClassBuilder, ConstructorDefinition, FieldDefinition, Invocation, MethodDefinition};
use objgate_engine::{ClassRegistry, Object, Throwable, TypeDesc, Value};

/// Fully-qualified class name
pub const STRING_BUILDER_CLASS: &str = "gate.lang.StringBuilder";

const BUFFER: &str = "buffer";

fn buffer(this: &Object) -> String {
    match this.field(BUFFER) {
        Some(Value::Str(s)) => s,
        _ => String::new(),
    }
}

/// Apply `edit` to the receiver's buffer and return the receiver
fn edit(call: &Invocation<'_>, edit: impl FnOnce(&mut String) -> Result<(), Throwable>) -> Result<Value, Throwable> {
    let this = call.this()?;
    let mut text = buffer(this);
    edit(&mut text)?;
    this.set_field(BUFFER, Value::Str(text));
    Ok(Value::Object(this.clone()))
}

fn char_boundary(text: &str, index: i32) -> Result<usize, Throwable> {
    let chars = text.chars().count();
    if index < 0 || index as usize > chars {
        return Err(Throwable::index_out_of_bounds(index as i64, chars));
    }
    Ok(text
        .char_indices()
        .nth(index as usize)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len()))
}

/// Register `gate.lang.StringBuilder`
pub fn register(registry: &ClassRegistry) {
    let builder_type = TypeDesc::class(STRING_BUILDER_CLASS);
    let class = ClassBuilder::new(STRING_BUILDER_CLASS)
        .field(FieldDefinition::new(BUFFER, TypeDesc::String).initial_value(Value::from("")))
        .constructor(ConstructorDefinition::empty())
        .constructor(
            ConstructorDefinition::new(|call| {
                call.this()?.set_field(BUFFER, Value::from(call.string(0)?));
                Ok(())
            })
            .with_param(TypeDesc::String),
        )
        .method(
            MethodDefinition::new("append", |call| {
                let suffix = call.string(0)?.to_string();
                edit(call, |text| {
                    text.push_str(&suffix);
                    Ok(())
                })
            })
            .with_param(TypeDesc::String)
            .returns(builder_type.clone()),
        )
        .method(
            MethodDefinition::new("append", |call| {
                let suffix = call.arg(0).to_string();
                edit(call, |text| {
                    text.push_str(&suffix);
                    Ok(())
                })
            })
            .with_param(TypeDesc::Object)
            .returns(builder_type.clone()),
        )
        .method(
            MethodDefinition::new("insert", |call| {
                let index = call.int(0)?;
                let fragment = call.string(1)?.to_string();
                edit(call, |text| {
                    let at = char_boundary(text, index)?;
                    text.insert_str(at, &fragment);
                    Ok(())
                })
            })
            .with_param(TypeDesc::int())
            .with_param(TypeDesc::String)
            .returns(builder_type.clone()),
        )
        .method(
            MethodDefinition::new("reverse", |call| {
                edit(call, |text| {
                    *text = text.chars().rev().collect();
                    Ok(())
                })
            })
            .returns(builder_type),
        )
        .method(
            MethodDefinition::new("length", |call| Ok(Value::Int(buffer(call.this()?).chars().count() as i32)))
                .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("toString", |call| Ok(Value::Str(buffer(call.this()?)))).returns(TypeDesc::String),
        )
        .build();
    registry.register(class);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use objgate_engine::{Gateway, ReturnObject, Session};

    fn session() -> Session {
        let registry = ClassRegistry::new();
        register(&registry);
        Arc::new(Gateway::new(Arc::new(registry))).session()
    }

    fn text(session: &Session, id: &str) -> ReturnObject {
        session.invoke("toString", id, vec![]).unwrap()
    }

    #[test]
    fn test_append_chain() {
        let session = session();
        let created = session.invoke_constructor("StringBuilder", vec![Value::from("ab")]).unwrap();
        let id = created.reference_id().unwrap().to_string();

        let returned = session.invoke("append", &id, vec![Value::from("cd")]).unwrap();
        assert_eq!(returned.reference_id(), Some(id.as_str()));
        session.invoke("append", &id, vec![Value::Int(7)]).unwrap();
        assert_eq!(text(&session, &id), ReturnObject::Primitive(Value::from("abcd7")));
        assert_eq!(
            session.invoke("length", &id, vec![]).unwrap(),
            ReturnObject::Primitive(Value::Int(5))
        );
    }

    #[test]
    fn test_insert_and_reverse() {
        let session = session();
        let id = session
            .invoke_constructor(STRING_BUILDER_CLASS, vec![Value::from("héllo")])
            .unwrap()
            .reference_id()
            .unwrap()
            .to_string();
        session.invoke("insert", &id, vec![Value::Int(2), Value::from("-")]).unwrap();
        assert_eq!(text(&session, &id), ReturnObject::Primitive(Value::from("hé-llo")));
        session.invoke("reverse", &id, vec![]).unwrap();
        assert_eq!(text(&session, &id), ReturnObject::Primitive(Value::from("oll-éh")));

        let err = session.invoke("insert", &id, vec![Value::Int(99), Value::from("x")]).unwrap();
        assert!(matches!(err, ReturnObject::Thrown { trace, .. } if trace.starts_with("gate.lang.IndexOutOfBoundsException")));
    }
}
