//! Default entry point
//!
//! The object bound to the reserved id `t` when the server is started from
//! the command line. Clients use it to discover what the gateway exposes.

use objgate_engine::reflect::{ClassBuilder, MethodDefinition};
use objgate_engine::{ClassRegistry, Object, TypeDesc, Value};

/// Fully-qualified class name of the entry point
pub const ENTRY_POINT_CLASS: &str = "gate.app.EntryPoint";

/// Register the entry point class
pub fn register(registry: &ClassRegistry) {
    let class = ClassBuilder::new(ENTRY_POINT_CLASS)
        .method(
            MethodDefinition::new("getVersion", |_| Ok(Value::from(env!("CARGO_PKG_VERSION"))))
                .returns(TypeDesc::String),
        )
        .method(
            MethodDefinition::new("getClassNames", |call| {
                let classes = call.classes();
                let names = classes.names().into_iter().map(Value::Str).collect();
                Ok(Value::Object(classes.new_list(names)))
            })
            .returns(TypeDesc::class("gate.util.ArrayList")),
        )
        .method(
            MethodDefinition::new("echo", |call| Ok(call.arg(0).clone()))
                .with_param(TypeDesc::Object)
                .returns(TypeDesc::Object),
        )
        .build();
    registry.register(class);
}

/// Allocate the entry point object. `None` if its class was never registered.
pub fn entry_point(registry: &ClassRegistry) -> Option<Object> {
    registry
        .get(ENTRY_POINT_CLASS)
        .map(|class| registry.new_instance(&class))
}
