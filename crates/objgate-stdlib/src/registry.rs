//! Stdlib class registration
//!
//! Registers every stdlib class into a gateway's `ClassRegistry` under its
//! fully-qualified name (e.g. `gate.lang.Math`, `gate.io.Files`).

use objgate_engine::ClassRegistry;

/// Register all stdlib classes into the given registry.
pub fn register_stdlib(registry: &ClassRegistry) {
    crate::math::register(registry);
    crate::text::register(registry);
    crate::system::register(registry);
    crate::io::register(registry);
    crate::entry::register(registry);
    tracing::debug!(classes = registry.len(), "stdlib registered");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_stdlib() {
        let registry = ClassRegistry::new();
        register_stdlib(&registry);
        for name in [
            "gate.lang.Math",
            "gate.lang.StringBuilder",
            "gate.lang.System",
            "gate.io.Files",
            "gate.io.ByteSource",
            "gate.io.IOException",
            "gate.app.EntryPoint",
        ] {
            assert!(registry.contains(name), "{} missing", name);
        }
        assert!(registry.is_package("gate.app"));
    }
}
