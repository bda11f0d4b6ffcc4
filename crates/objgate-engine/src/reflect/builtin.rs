//! Core classes present in every registry

use std::sync::Arc;

use super::builder::{ClassBuilder, ConstructorDefinition, MethodDefinition};
use super::class::{ClassDef, Invocation, Layout};
use super::registry::CoreClasses;
use super::types::{
    TypeDesc, ARRAY_CLASS, CLASS_CLASS, ITERATOR_CLASS, LIST_CLASS, MAP_CLASS, OBJECT_CLASS,
    SET_CLASS, STREAM_CLASS, THROWABLE_CLASS, VIEW_CLASS,
};
use crate::throwable::{
    Throwable, ILLEGAL_ARGUMENT, INDEX_OUT_OF_BOUNDS, NO_SUCH_ELEMENT, RUNTIME_EXCEPTION,
};
use crate::value::Value;

/// Build the core classes. The second element holds classes without a
/// dedicated slot in [`CoreClasses`].
pub(crate) fn core_classes() -> (CoreClasses, Vec<ClassDef>) {
    let core = CoreClasses {
        object: Arc::new(object_class()),
        class: Arc::new(class_class()),
        array: Arc::new(ClassBuilder::new(ARRAY_CLASS).as_abstract().build()),
        list: Arc::new(list_class()),
        map: Arc::new(map_class()),
        set: Arc::new(set_class()),
        iterator: Arc::new(iterator_class()),
        stream: Arc::new(stream_class()),
        view: Arc::new(view_class()),
        throwable: Arc::new(throwable_class(THROWABLE_CLASS, OBJECT_CLASS)),
    };

    let extra = vec![
        throwable_class("gate.lang.Exception", THROWABLE_CLASS),
        throwable_class(RUNTIME_EXCEPTION, "gate.lang.Exception"),
        throwable_class(ILLEGAL_ARGUMENT, RUNTIME_EXCEPTION),
        throwable_class("gate.lang.IllegalStateException", RUNTIME_EXCEPTION),
        throwable_class(INDEX_OUT_OF_BOUNDS, RUNTIME_EXCEPTION),
        throwable_class("gate.lang.NullPointerException", RUNTIME_EXCEPTION),
        throwable_class(NO_SUCH_ELEMENT, RUNTIME_EXCEPTION),
    ];

    (core, extra)
}

fn object_class() -> ClassDef {
    ClassBuilder::new(OBJECT_CLASS)
        .method(
            MethodDefinition::new("toString", |call| Ok(Value::Str(call.this()?.to_string())))
                .returns(TypeDesc::String),
        )
        .method(
            MethodDefinition::new("hashCode", |call| {
                Ok(Value::Int(call.this()?.identity() as i32))
            })
            .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("equals", |call| {
                let this = call.this()?;
                let same = matches!(call.arg(0), Value::Object(other) if other.ptr_eq(this));
                Ok(Value::Bool(same))
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("getClass", |call| {
                let this = call.this()?;
                Ok(Value::Object(call.classes().class_object(this.class())))
            })
            .returns(TypeDesc::class(CLASS_CLASS)),
        )
        .build()
}

fn class_class() -> ClassDef {
    fn named(call: &Invocation<'_>, simple: bool) -> Result<Value, Throwable> {
        let this = call.this()?;
        let class = this
            .as_class()
            .ok_or_else(|| Throwable::illegal_argument("receiver is not a class object"))?;
        let name = if simple {
            class.simple_name()
        } else {
            class.name()
        };
        Ok(Value::Str(name.to_string()))
    }

    ClassBuilder::new(CLASS_CLASS)
        .as_abstract()
        .method(MethodDefinition::new("getName", |call| named(call, false)).returns(TypeDesc::String))
        .method(
            MethodDefinition::new("getSimpleName", |call| named(call, true)).returns(TypeDesc::String),
        )
        .build()
}

fn with_items<R>(
    call: &Invocation<'_>,
    f: impl FnOnce(&mut Vec<Value>) -> Result<R, Throwable>,
) -> Result<R, Throwable> {
    let this = call.this()?;
    let items = this
        .as_list()
        .ok_or_else(|| Throwable::illegal_argument("receiver is not a list"))?;
    let mut items = items.lock();
    f(&mut items)
}

fn checked_index(index: i32, len: usize) -> Result<usize, Throwable> {
    if index < 0 || index as usize >= len {
        return Err(Throwable::index_out_of_bounds(index as i64, len));
    }
    Ok(index as usize)
}

fn list_class() -> ClassDef {
    ClassBuilder::new(LIST_CLASS)
        .layout(Layout::List)
        .constructor(ConstructorDefinition::empty())
        .constructor(ConstructorDefinition::empty().with_param(TypeDesc::int()))
        .method(
            MethodDefinition::new("add", |call| {
                let value = call.arg(0).clone();
                with_items(call, |items| {
                    items.push(value);
                    Ok(Value::Bool(true))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("add", |call| {
                let index = call.int(0)?;
                let value = call.arg(1).clone();
                with_items(call, |items| {
                    if index < 0 || index as usize > items.len() {
                        return Err(Throwable::index_out_of_bounds(index as i64, items.len()));
                    }
                    items.insert(index as usize, value);
                    Ok(Value::Null)
                })
            })
            .with_param(TypeDesc::int())
            .with_param(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("get", |call| {
                let index = call.int(0)?;
                with_items(call, |items| {
                    let index = checked_index(index, items.len())?;
                    Ok(items[index].clone())
                })
            })
            .with_param(TypeDesc::int())
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("set", |call| {
                let index = call.int(0)?;
                let value = call.arg(1).clone();
                with_items(call, |items| {
                    let index = checked_index(index, items.len())?;
                    Ok(std::mem::replace(&mut items[index], value))
                })
            })
            .with_param(TypeDesc::int())
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("remove", |call| {
                let index = call.int(0)?;
                with_items(call, |items| {
                    let index = checked_index(index, items.len())?;
                    Ok(items.remove(index))
                })
            })
            .with_param(TypeDesc::int())
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("size", |call| {
                with_items(call, |items| Ok(Value::Int(items.len() as i32)))
            })
            .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("isEmpty", |call| {
                with_items(call, |items| Ok(Value::Bool(items.is_empty())))
            })
            .returns(TypeDesc::boolean()),
        )
        .method(MethodDefinition::new("clear", |call| {
            with_items(call, |items| {
                items.clear();
                Ok(Value::Null)
            })
        }))
        .method(
            MethodDefinition::new("contains", |call| {
                let needle = call.arg(0).clone();
                with_items(call, |items| Ok(Value::Bool(items.contains(&needle))))
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("indexOf", |call| {
                let needle = call.arg(0).clone();
                with_items(call, |items| {
                    let index = items.iter().position(|item| *item == needle);
                    Ok(Value::Int(index.map_or(-1, |i| i as i32)))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("iterator", |call| {
                let snapshot = with_items(call, |items| Ok(items.clone()))?;
                Ok(call.classes().new_iterator(snapshot).into())
            })
            .returns(TypeDesc::class(ITERATOR_CLASS)),
        )
        .build()
}

fn with_entries<R>(
    call: &Invocation<'_>,
    f: impl FnOnce(&mut Vec<(Value, Value)>) -> Result<R, Throwable>,
) -> Result<R, Throwable> {
    let this = call.this()?;
    let entries = this
        .as_map()
        .ok_or_else(|| Throwable::illegal_argument("receiver is not a map"))?;
    let mut entries = entries.lock();
    f(&mut entries)
}

fn map_class() -> ClassDef {
    ClassBuilder::new(MAP_CLASS)
        .layout(Layout::Map)
        .constructor(ConstructorDefinition::empty())
        .method(
            MethodDefinition::new("put", |call| {
                let key = call.arg(0).clone();
                let value = call.arg(1).clone();
                with_entries(call, |entries| match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => Ok(std::mem::replace(&mut slot.1, value)),
                    None => {
                        entries.push((key, value));
                        Ok(Value::Null)
                    }
                })
            })
            .with_param(TypeDesc::Object)
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("get", |call| {
                let key = call.arg(0).clone();
                with_entries(call, |entries| {
                    Ok(entries
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map_or(Value::Null, |(_, v)| v.clone()))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("containsKey", |call| {
                let key = call.arg(0).clone();
                with_entries(call, |entries| Ok(Value::Bool(entries.iter().any(|(k, _)| *k == key))))
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("remove", |call| {
                let key = call.arg(0).clone();
                with_entries(call, |entries| {
                    let removed = entries
                        .iter()
                        .position(|(k, _)| *k == key)
                        .map(|index| entries.remove(index).1);
                    Ok(removed.unwrap_or(Value::Null))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::Object),
        )
        .method(
            MethodDefinition::new("size", |call| {
                with_entries(call, |entries| Ok(Value::Int(entries.len() as i32)))
            })
            .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("isEmpty", |call| {
                with_entries(call, |entries| Ok(Value::Bool(entries.is_empty())))
            })
            .returns(TypeDesc::boolean()),
        )
        .method(MethodDefinition::new("clear", |call| {
            with_entries(call, |entries| {
                entries.clear();
                Ok(Value::Null)
            })
        }))
        .method(
            MethodDefinition::new("keySet", |call| {
                let keys: Vec<Value> =
                    with_entries(call, |entries| Ok(entries.iter().map(|(k, _)| k.clone()).collect()))?;
                Ok(call.classes().new_set(keys).into())
            })
            .returns(TypeDesc::class(SET_CLASS)),
        )
        .method(
            MethodDefinition::new("values", |call| {
                let values: Vec<Value> =
                    with_entries(call, |entries| Ok(entries.iter().map(|(_, v)| v.clone()).collect()))?;
                Ok(call.classes().new_list(values).into())
            })
            .returns(TypeDesc::class(LIST_CLASS)),
        )
        .build()
}

fn with_members<R>(
    call: &Invocation<'_>,
    f: impl FnOnce(&mut Vec<Value>) -> Result<R, Throwable>,
) -> Result<R, Throwable> {
    let this = call.this()?;
    let members = this
        .as_set()
        .ok_or_else(|| Throwable::illegal_argument("receiver is not a set"))?;
    let mut members = members.lock();
    f(&mut members)
}

fn set_class() -> ClassDef {
    ClassBuilder::new(SET_CLASS)
        .layout(Layout::Set)
        .constructor(ConstructorDefinition::empty())
        .method(
            MethodDefinition::new("add", |call| {
                let value = call.arg(0).clone();
                with_members(call, |members| {
                    if members.contains(&value) {
                        return Ok(Value::Bool(false));
                    }
                    members.push(value);
                    Ok(Value::Bool(true))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("contains", |call| {
                let needle = call.arg(0).clone();
                with_members(call, |members| Ok(Value::Bool(members.contains(&needle))))
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("remove", |call| {
                let needle = call.arg(0).clone();
                with_members(call, |members| {
                    let index = members.iter().position(|m| *m == needle);
                    Ok(Value::Bool(index.map(|i| members.remove(i)).is_some()))
                })
            })
            .with_param(TypeDesc::Object)
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("size", |call| {
                with_members(call, |members| Ok(Value::Int(members.len() as i32)))
            })
            .returns(TypeDesc::int()),
        )
        .method(
            MethodDefinition::new("isEmpty", |call| {
                with_members(call, |members| Ok(Value::Bool(members.is_empty())))
            })
            .returns(TypeDesc::boolean()),
        )
        .method(MethodDefinition::new("clear", |call| {
            with_members(call, |members| {
                members.clear();
                Ok(Value::Null)
            })
        }))
        .method(
            MethodDefinition::new("iterator", |call| {
                let snapshot = with_members(call, |members| Ok(members.clone()))?;
                Ok(call.classes().new_iterator(snapshot).into())
            })
            .returns(TypeDesc::class(ITERATOR_CLASS)),
        )
        .build()
}

fn with_rest<R>(
    call: &Invocation<'_>,
    f: impl FnOnce(&mut std::vec::IntoIter<Value>) -> Result<R, Throwable>,
) -> Result<R, Throwable> {
    let this = call.this()?;
    let rest = this
        .as_iterator()
        .ok_or_else(|| Throwable::illegal_argument("receiver is not an iterator"))?;
    let mut rest = rest.lock();
    f(&mut rest)
}

fn iterator_class() -> ClassDef {
    ClassBuilder::new(ITERATOR_CLASS)
        .as_abstract()
        .method(
            MethodDefinition::new("hasNext", |call| {
                with_rest(call, |rest| Ok(Value::Bool(!rest.as_slice().is_empty())))
            })
            .returns(TypeDesc::boolean()),
        )
        .method(
            MethodDefinition::new("next", |call| {
                with_rest(call, |rest| {
                    rest.next()
                        .ok_or_else(|| Throwable::new(NO_SUCH_ELEMENT, "iterator is exhausted"))
                })
            })
            .returns(TypeDesc::Object),
        )
        .build()
}

fn stream_class() -> ClassDef {
    ClassBuilder::new(STREAM_CLASS)
        .as_abstract()
        .method(MethodDefinition::new("close", |call| {
            drop(call.this()?.take_stream());
            Ok(Value::Null)
        }))
        .build()
}

fn view_class() -> ClassDef {
    ClassBuilder::new(VIEW_CLASS)
        .as_abstract()
        .method(
            MethodDefinition::new("getName", |call| {
                let this = call.this()?;
                let view = this
                    .as_view()
                    .ok_or_else(|| Throwable::illegal_argument("receiver is not a view"))?;
                Ok(Value::Str(view.name().to_string()))
            })
            .returns(TypeDesc::String),
        )
        .build()
}

fn init_throwable(call: &Invocation<'_>) -> Result<(), Throwable> {
    let this = call.this()?;
    let mut throwable = match call.arg(0) {
        Value::Str(message) => Throwable::new(this.class().name(), message.clone()),
        _ => Throwable::bare(this.class().name()),
    };
    if let Some(cause) = call.arg(1).as_object().and_then(|o| o.throwable()) {
        throwable = throwable.caused_by(cause);
    }
    this.set_throwable(throwable);
    Ok(())
}

pub(crate) fn throwable_class(name: &str, superclass: &str) -> ClassDef {
    let mut builder = ClassBuilder::new(name)
        .extends(superclass)
        .layout(Layout::Throwable)
        .constructor(ConstructorDefinition::new(init_throwable))
        .constructor(ConstructorDefinition::new(init_throwable).with_param(TypeDesc::String))
        .constructor(
            ConstructorDefinition::new(init_throwable)
                .with_param(TypeDesc::String)
                .with_param(TypeDesc::class(THROWABLE_CLASS)),
        );

    // Accessors are inherited from the base class
    if name == THROWABLE_CLASS {
        builder = builder
            .method(
                MethodDefinition::new("getMessage", |call| {
                    let throwable = call.this()?.throwable();
                    Ok(throwable
                        .and_then(|t| t.message().map(|m| Value::Str(m.to_string())))
                        .unwrap_or(Value::Null))
                })
                .returns(TypeDesc::String),
            )
            .method(
                MethodDefinition::new("toString", |call| {
                    Ok(Value::Str(call.this()?.to_string()))
                })
                .returns(TypeDesc::String),
            );
    }
    builder.build()
}
