//! Class registry
//!
//! Global (per gateway) table of host classes by fully-qualified name, plus
//! hierarchy queries and the factories that allocate objects of the core
//! classes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};

use super::class::{ClassDef, Layout};
use super::builtin;
use super::types::{TypeDesc, OBJECT_CLASS};
use crate::gateway::JvmView;
use crate::throwable::Throwable;
use crate::value::{ByteSource, Object, Payload, Value};

/// Shared handle to a registered class
pub type ClassRef = Arc<ClassDef>;

/// Core classes every registry carries
pub(crate) struct CoreClasses {
    pub object: ClassRef,
    pub class: ClassRef,
    pub array: ClassRef,
    pub list: ClassRef,
    pub map: ClassRef,
    pub set: ClassRef,
    pub iterator: ClassRef,
    pub stream: ClassRef,
    pub view: ClassRef,
    pub throwable: ClassRef,
}

impl CoreClasses {
    fn all(&self) -> [&ClassRef; 10] {
        [
            &self.object,
            &self.class,
            &self.array,
            &self.list,
            &self.map,
            &self.set,
            &self.iterator,
            &self.stream,
            &self.view,
            &self.throwable,
        ]
    }
}

/// Registry of host classes
pub struct ClassRegistry {
    classes: RwLock<FxHashMap<String, ClassRef>>,
    packages: RwLock<FxHashSet<String>>,
    class_objects: Mutex<FxHashMap<String, Object>>,
    core: CoreClasses,
}

impl ClassRegistry {
    /// Create a registry holding the core classes
    pub fn new() -> Self {
        let (core, extra) = builtin::core_classes();
        let registry = Self {
            classes: RwLock::new(FxHashMap::default()),
            packages: RwLock::new(FxHashSet::default()),
            class_objects: Mutex::new(FxHashMap::default()),
            core,
        };
        let core_refs: Vec<ClassRef> = registry.core.all().into_iter().cloned().collect();
        for class in core_refs {
            registry.insert(class);
        }
        for class in extra {
            registry.register(class);
        }
        registry
    }

    /// Register a class, replacing any class of the same name
    pub fn register(&self, class: ClassDef) -> ClassRef {
        let class = Arc::new(class);
        self.insert(class.clone());
        class
    }

    /// Register an exception class with the standard throwable
    /// constructors `()`, `(String)` and `(String, Throwable)`
    pub fn register_exception(&self, name: &str, superclass: &str) -> ClassRef {
        self.register(builtin::throwable_class(name, superclass))
    }

    fn insert(&self, class: ClassRef) {
        {
            let mut packages = self.packages.write();
            let mut package = class.package();
            while !package.is_empty() {
                packages.insert(package.to_string());
                package = super::types::package_name(package);
            }
        }
        self.class_objects.lock().remove(class.name());
        self.classes.write().insert(class.name().to_string(), class);
    }

    /// Look up a class by fully-qualified name
    pub fn get(&self, name: &str) -> Option<ClassRef> {
        self.classes.read().get(name).cloned()
    }

    /// Check if a class is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Whether `name` is a package prefix of a registered class
    pub fn is_package(&self, name: &str) -> bool {
        self.packages.read().contains(name)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered class names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Superclass chain starting with `class` itself
    pub fn hierarchy(&self, class: &ClassRef) -> Vec<ClassRef> {
        let mut chain = vec![class.clone()];
        let mut seen: FxHashSet<String> = FxHashSet::default();
        seen.insert(class.name().to_string());
        let mut current = class.clone();
        while let Some(parent) = current.superclass().and_then(|name| self.get(name)) {
            if !seen.insert(parent.name().to_string()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Number of inheritance steps from `from` up to `to`, following
    /// superclasses and interfaces. `None` when `to` is not a supertype.
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let mut queue = VecDeque::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        queue.push_back((from.to_string(), 0u32));
        seen.insert(from.to_string());

        while let Some((name, depth)) = queue.pop_front() {
            let Some(class) = self.get(&name) else {
                continue;
            };
            let parents = class
                .superclass()
                .into_iter()
                .map(str::to_string)
                .chain(class.interfaces().iter().cloned());
            for parent in parents {
                if parent == to {
                    return Some(depth + 1);
                }
                if seen.insert(parent.clone()) {
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        // Everything is an Object, even classes with unregistered parents
        if to == OBJECT_CLASS {
            Some(1)
        } else {
            None
        }
    }

    /// Depth of a class below `gate.lang.Object`
    pub fn depth(&self, name: &str) -> u32 {
        self.distance(name, OBJECT_CLASS).unwrap_or(1)
    }

    /// Whether instances of `from` can be used where `to` is expected
    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        self.distance(from, to).is_some()
    }

    // ------------------------------------------------------------------------
    // Object factories
    // ------------------------------------------------------------------------

    /// The `gate.util.ArrayList` class
    pub fn list_class(&self) -> &ClassRef {
        &self.core.list
    }

    /// The `gate.lang.Object` class
    pub fn object_class(&self) -> &ClassRef {
        &self.core.object
    }

    /// Allocate an uninitialised instance according to the class layout
    pub fn new_instance(&self, class: &ClassRef) -> Object {
        match class.layout() {
            Layout::List => Object::with_list(class.clone(), Vec::new()),
            Layout::Map => Object::new(class.clone(), Payload::Map(Mutex::new(Vec::new()))),
            Layout::Set => Object::new(class.clone(), Payload::Set(Mutex::new(Vec::new()))),
            Layout::Throwable => Object::new(
                class.clone(),
                Payload::Throwable(Mutex::new(Throwable::bare(class.name()))),
            ),
            Layout::Fields => {
                let mut fields = FxHashMap::default();
                for ancestor in self.hierarchy(class).iter().rev() {
                    for field in ancestor.declared_fields().iter().filter(|f| !f.is_static) {
                        fields.insert(field.name.clone(), field.initial_value());
                    }
                }
                Object::with_fields(class.clone(), fields)
            }
        }
    }

    /// Allocate a list
    pub fn new_list(&self, items: Vec<Value>) -> Object {
        Object::with_list(self.core.list.clone(), items)
    }

    /// Allocate a map holding `entries`. Later duplicates of a key win.
    pub fn new_map(&self, entries: Vec<(Value, Value)>) -> Object {
        let mut distinct: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match distinct.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => distinct.push((key, value)),
            }
        }
        Object::new(self.core.map.clone(), Payload::Map(Mutex::new(distinct)))
    }

    /// Allocate a set of the distinct `items`, keeping first occurrences
    pub fn new_set(&self, items: Vec<Value>) -> Object {
        let mut distinct: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !distinct.contains(&item) {
                distinct.push(item);
            }
        }
        Object::new(self.core.set.clone(), Payload::Set(Mutex::new(distinct)))
    }

    /// Allocate an iterator over a snapshot of `items`
    pub fn new_iterator(&self, items: Vec<Value>) -> Object {
        Object::new(self.core.iterator.clone(), Payload::Iterator(Mutex::new(items.into_iter())))
    }

    /// Allocate an array with the given elements
    pub fn new_array(&self, component: TypeDesc, items: Vec<Value>) -> Object {
        Object::with_array(self.core.array.clone(), component, items)
    }

    /// Allocate a stream object over a byte source
    pub fn new_stream(&self, source: ByteSource) -> Object {
        Object::new(self.core.stream.clone(), Payload::Stream(Mutex::new(Some(source))))
    }

    /// Wrap an import view
    pub fn new_view(&self, view: Arc<JvmView>) -> Object {
        Object::new(self.core.view.clone(), Payload::View(view))
    }

    /// Wrap a throwable as an object of its registered class
    pub fn throwable_object(&self, throwable: Throwable) -> Object {
        let class = self
            .get(throwable.class_name())
            .unwrap_or_else(|| self.core.throwable.clone());
        Object::new(class, Payload::Throwable(Mutex::new(throwable)))
    }

    /// Class object for a class. The same object is returned on every call.
    pub fn class_object(&self, class: &ClassRef) -> Object {
        self.class_objects
            .lock()
            .entry(class.name().to_string())
            .or_insert_with(|| Object::new(self.core.class.clone(), Payload::Class(class.clone())))
            .clone()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::builder::{ClassBuilder, FieldDefinition};
    use crate::reflect::types::{ARRAY_CLASS, LIST_CLASS, MAP_CLASS, SET_CLASS};

    fn create_test_registry() -> ClassRegistry {
        let registry = ClassRegistry::new();
        registry.register(
            ClassBuilder::new("demo.Animal")
                .field(FieldDefinition::new("name", TypeDesc::String))
                .build(),
        );
        registry.register(
            ClassBuilder::new("demo.Dog")
                .extends("demo.Animal")
                .implements("demo.Pet")
                .field(FieldDefinition::new("tricks", TypeDesc::int()))
                .build(),
        );
        registry.register(ClassBuilder::new("demo.Pet").as_interface().build());
        registry
    }

    #[test]
    fn test_core_classes_registered() {
        let registry = ClassRegistry::new();
        assert!(registry.contains(OBJECT_CLASS));
        assert!(registry.contains(LIST_CLASS));
        assert!(registry.contains(ARRAY_CLASS));
        assert!(registry.is_package("gate.lang"));
        assert!(registry.is_package("gate"));
        assert!(!registry.is_package("gate.lang.Object"));
    }

    #[test]
    fn test_get_class_hierarchy() {
        let registry = create_test_registry();
        let dog = registry.get("demo.Dog").unwrap();
        let names: Vec<String> = registry
            .hierarchy(&dog)
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["demo.Dog", "demo.Animal", OBJECT_CLASS]);
    }

    #[test]
    fn test_distance() {
        let registry = create_test_registry();
        assert_eq!(registry.distance("demo.Dog", "demo.Dog"), Some(0));
        assert_eq!(registry.distance("demo.Dog", "demo.Animal"), Some(1));
        assert_eq!(registry.distance("demo.Dog", "demo.Pet"), Some(1));
        assert_eq!(registry.distance("demo.Dog", OBJECT_CLASS), Some(2));
        assert_eq!(registry.distance("demo.Animal", "demo.Dog"), None);
        assert_eq!(registry.depth("demo.Animal"), 1);
    }

    #[test]
    fn test_new_instance_inherits_fields() {
        let registry = create_test_registry();
        let dog = registry.get("demo.Dog").unwrap();
        let instance = registry.new_instance(&dog);
        assert_eq!(instance.field("name"), Some(Value::Null));
        assert_eq!(instance.field("tricks"), Some(Value::Int(0)));
    }

    #[test]
    fn test_register_exception() {
        let registry = ClassRegistry::new();
        let class = registry.register_exception("demo.BoomException", "gate.lang.RuntimeException");
        assert!(registry.is_assignable("demo.BoomException", "gate.lang.Throwable"));
        assert_eq!(class.constructors().len(), 3);
        assert_eq!(class.layout(), Layout::Throwable);
    }

    #[test]
    fn test_collection_factories_dedupe() {
        let registry = ClassRegistry::new();
        let map = registry.new_map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
            (Value::from("a"), Value::Int(3)),
        ]);
        let entries = map.as_map().unwrap().lock().clone();
        assert_eq!(entries, vec![(Value::from("a"), Value::Int(3)), (Value::from("b"), Value::Int(2))]);

        let set = registry.new_set(vec![Value::Int(1), Value::Int(1), Value::Long(1)]);
        assert_eq!(set.as_set().unwrap().lock().len(), 2);
        assert_eq!(set.class().name(), SET_CLASS);

        let instance = registry.new_instance(registry.get(MAP_CLASS).as_ref().unwrap());
        assert!(instance.as_map().is_some());
    }

    #[test]
    fn test_class_object_is_cached() {
        let registry = create_test_registry();
        let dog = registry.get("demo.Dog").unwrap();
        let a = registry.class_object(&dog);
        let b = registry.class_object(&dog);
        assert!(a.ptr_eq(&b));
    }
}
