//! Objgate Standard Library
//!
//! Host classes every gateway can expose: math helpers, a string builder,
//! system access, file and byte streams, and the default entry point.

#![warn(missing_docs)]

pub mod entry;
pub mod io;
pub mod math;
pub mod registry;
pub mod system;
pub mod text;

pub use entry::{entry_point, ENTRY_POINT_CLASS};
pub use registry::register_stdlib;
