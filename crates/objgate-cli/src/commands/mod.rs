//! CLI subcommands

pub mod classes;
pub mod help;
pub mod serve;

use std::sync::Arc;

use objgate_engine::{ClassRegistry, Gateway};
use objgate_stdlib::{entry_point, register_stdlib};

/// Registry with the standard classes
pub fn stdlib_registry() -> Arc<ClassRegistry> {
    let registry = ClassRegistry::new();
    register_stdlib(&registry);
    Arc::new(registry)
}

/// Gateway over the standard classes with the default entry point bound
pub fn stdlib_gateway() -> Gateway {
    let registry = stdlib_registry();
    let gateway = Gateway::new(registry.clone());
    match entry_point(&registry) {
        Some(entry) => gateway.with_entry_point(entry),
        None => gateway,
    }
}
