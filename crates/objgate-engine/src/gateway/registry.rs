//! Per-session object registry
//!
//! Maps reference ids to live objects, with a reverse identity index so an
//! object returned twice keeps the id it was given the first time. Lookup
//! and insert happen under one lock, so two threads returning the same
//! object can never mint two ids for it.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::value::Object;

/// Prefix of minted reference ids
pub const OBJECT_ID_PREFIX: &str = "o";

#[derive(Default)]
struct RegistryState {
    by_id: FxHashMap<String, Object>,
    by_identity: FxHashMap<usize, String>,
}

/// Registry mapping reference ids to objects
pub struct ObjectRegistry {
    state: Mutex<RegistryState>,
    next_id: AtomicU64,
}

impl ObjectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Bind an object under a reserved id
    pub fn bind(&self, id: &str, object: Object) {
        let mut state = self.state.lock();
        state.by_identity.insert(object.identity(), id.to_string());
        state.by_id.insert(id.to_string(), object);
    }

    /// Mint a fresh id without binding anything to it yet
    pub fn reserve_id(&self) -> String {
        format!(
            "{}{}",
            OBJECT_ID_PREFIX,
            self.next_id.fetch_add(1, Ordering::Relaxed)
        )
    }

    /// Return the id of `object`, minting one if it has none yet
    pub fn insert(&self, object: &Object) -> String {
        let mut state = self.state.lock();
        if let Some(id) = state.by_identity.get(&object.identity()) {
            return id.clone();
        }
        let id = self.reserve_id();
        state.by_identity.insert(object.identity(), id.clone());
        state.by_id.insert(id.clone(), object.clone());
        id
    }

    /// Look up an object by id
    pub fn get(&self, id: &str) -> Option<Object> {
        self.state.lock().by_id.get(id).cloned()
    }

    /// Remove an object by id, returning it
    pub fn remove(&self, id: &str) -> Option<Object> {
        let mut state = self.state.lock();
        let object = state.by_id.remove(id)?;
        state.by_identity.remove(&object.identity());
        Some(object)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.state.lock().by_id.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every reference
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.by_id.clear();
        state.by_identity.clear();
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ClassRegistry;

    #[test]
    fn test_same_object_same_id() {
        let classes = ClassRegistry::new();
        let registry = ObjectRegistry::new();
        let list = classes.new_list(Vec::new());

        let first = registry.insert(&list);
        let second = registry.insert(&list.clone());
        assert_eq!(first, "o0");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        let other = registry.insert(&classes.new_list(Vec::new()));
        assert_eq!(other, "o1");
    }

    #[test]
    fn test_remove_forgets_identity() {
        let classes = ClassRegistry::new();
        let registry = ObjectRegistry::new();
        let list = classes.new_list(Vec::new());

        let id = registry.insert(&list);
        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert_ne!(registry.insert(&list), id);
    }

    #[test]
    fn test_concurrent_insert_mints_one_id() {
        let classes = ClassRegistry::new();
        let registry = ObjectRegistry::new();
        let list = classes.new_list(Vec::new());

        let ids: Vec<String> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let list = list.clone();
                    let registry = &registry;
                    scope.spawn(move || (0..100).map(|_| registry.insert(&list)).last().unwrap())
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert!(ids.iter().all(|id| id == "o0"), "{:?}", ids);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.insert(&classes.new_list(Vec::new())), "o1");
    }

    #[test]
    fn test_bind_reserved_id() {
        let classes = ClassRegistry::new();
        let registry = ObjectRegistry::new();
        let entry = classes.new_list(Vec::new());
        registry.bind("t", entry.clone());
        assert_eq!(registry.insert(&entry), "t");
        assert!(registry.get("t").unwrap().ptr_eq(&entry));
    }
}
