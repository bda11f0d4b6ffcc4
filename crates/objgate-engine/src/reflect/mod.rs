//! Reflection over host classes
//!
//! Host code declares classes with [`ClassBuilder`] and registers them in a
//! [`ClassRegistry`]. The [`ReflectionEngine`] then resolves fields, methods
//! and constructors by name against concrete runtime arguments.
//!
//! ## Overload resolution
//!
//! Every argument is scored against every candidate parameter with the cost
//! table in [`convert`]. A candidate is eligible only if every argument
//! converts; the lowest total wins, then the fewest numeric widenings, then
//! the most specific parameter list, then declaration order. Resolution runs
//! on every call; nothing is cached.

pub mod builder;
pub mod class;
pub mod convert;
mod builtin;
pub mod engine;
pub mod help;
pub mod registry;
pub mod resolve;
pub mod types;

pub use builder::{ClassBuilder, ConstructorDefinition, FieldDefinition, MethodDefinition};
pub use class::{ClassDef, ConstructorDef, FieldDef, Invocation, Layout, MethodDef};
pub use convert::{coerce, ArgType, TypeConverter};
pub use engine::{FieldRef, MemberContext, MethodInvoker, ReflectionEngine};
pub use registry::{ClassRef, ClassRegistry};
pub use resolve::{resolve, Resolution, Signature};
pub use types::{Primitive, TypeDesc};
