//! Import views
//!
//! A [`JvmView`] is a named import namespace. Clients resolve short class
//! names through it, and cache its imported names keyed by the sequence id,
//! which changes on every effective mutation of the import lists.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use crate::reflect::types::simple_name;

/// Package star-imported by every new view
pub const DEFAULT_STAR_IMPORT: &str = "gate.lang";

/// Id of the default view bound in every session
pub const DEFAULT_VIEW_ID: &str = "j";

/// Name of the default view
pub const DEFAULT_VIEW_NAME: &str = "default";

struct ImportState {
    singles: BTreeMap<String, String>,
    stars: BTreeSet<String>,
    sequence_id: u64,
}

/// Named import namespace
pub struct JvmView {
    name: String,
    id: String,
    state: Mutex<ImportState>,
}

impl JvmView {
    /// Create a view with the default star import
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        let mut stars = BTreeSet::new();
        stars.insert(DEFAULT_STAR_IMPORT.to_string());
        Self {
            name: name.into(),
            id: id.into(),
            state: Mutex::new(ImportState {
                singles: BTreeMap::new(),
                stars,
                sequence_id: 1,
            }),
        }
    }

    /// View name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference id the view was created under
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current sequence id
    pub fn sequence_id(&self) -> u64 {
        self.state.lock().sequence_id
    }

    /// Import `pkg.Class` or `pkg.*`. Returns false if already imported.
    pub fn add_import(&self, import: &str) -> bool {
        let import = import.trim();
        let mut state = self.state.lock();
        let changed = match import.strip_suffix(".*") {
            Some(package) => state.stars.insert(package.to_string()),
            None => {
                let previous = state
                    .singles
                    .insert(simple_name(import).to_string(), import.to_string());
                previous.as_deref() != Some(import)
            }
        };
        if changed {
            state.sequence_id += 1;
        }
        changed
    }

    /// Remove an import. Returns false if it was not present.
    pub fn remove_import(&self, import: &str) -> bool {
        let import = import.trim();
        let mut state = self.state.lock();
        let removed = match import.strip_suffix(".*") {
            Some(package) => state.stars.remove(package),
            None => {
                let key = simple_name(import);
                if state.singles.get(key).map(String::as_str) == Some(import) {
                    state.singles.remove(key).is_some()
                } else {
                    false
                }
            }
        };
        if removed {
            state.sequence_id += 1;
        }
        removed
    }

    /// Fully-qualified name imported under a simple name
    pub fn single_import(&self, simple: &str) -> Option<String> {
        self.state.lock().singles.get(simple).cloned()
    }

    /// Star-imported packages, sorted
    pub fn star_imports(&self) -> Vec<String> {
        self.state.lock().stars.iter().cloned().collect()
    }

    /// Sequence id and single-imported simple names, read together
    pub fn snapshot(&self) -> (u64, Vec<String>) {
        let state = self.state.lock();
        (state.sequence_id, state.singles.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_bumps_on_change_only() {
        let view = JvmView::new("test", "o1");
        assert_eq!(view.sequence_id(), 1);
        assert!(view.add_import("demo.Counter"));
        assert_eq!(view.sequence_id(), 2);
        assert!(!view.add_import("demo.Counter"));
        assert_eq!(view.sequence_id(), 2);
        assert!(view.add_import("demo.util.*"));
        assert_eq!(view.sequence_id(), 3);
        assert!(!view.remove_import("demo.Other"));
        assert_eq!(view.sequence_id(), 3);
        assert!(view.remove_import("demo.Counter"));
        assert_eq!(view.sequence_id(), 4);
    }

    #[test]
    fn test_imports() {
        let view = JvmView::new("test", "o1");
        view.add_import("demo.Counter");
        view.add_import("demo.util.*");
        assert_eq!(view.single_import("Counter").as_deref(), Some("demo.Counter"));
        assert_eq!(view.star_imports(), vec!["demo.util", DEFAULT_STAR_IMPORT]);
        let (seq, names) = view.snapshot();
        assert_eq!(seq, 3);
        assert_eq!(names, vec!["Counter"]);
    }

    #[test]
    fn test_snapshot_consistent_under_concurrent_imports() {
        let view = JvmView::new("test", "o1");
        let (initial, _) = view.snapshot();

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let view = &view;
                scope.spawn(move || {
                    for i in 0..50 {
                        assert!(view.add_import(&format!("demo.Class{}x{}", writer, i)));
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..500 {
                    let (seq, names) = view.snapshot();
                    // Only single imports are added, one bump each
                    assert_eq!((seq - initial) as usize, names.len());
                }
            });
        });

        let (seq, names) = view.snapshot();
        assert_eq!(names.len(), 200);
        assert_eq!(seq, initial + 200);
    }
}
