//! `gate.io` classes
//!
//! [`FILES_CLASS`] exposes the local filesystem through static methods.
//! [`BYTE_SOURCE_CLASS`] wraps an in-memory buffer. Both hand out
//! `gate.io.InputStream` objects, which a client drains with the stream
//! command.

use std::io::Cursor;
use std::path::Path;

use objgate_engine::reflect::{
    ClassBuilder, ConstructorDefinition, FieldDefinition, Invocation, MethodDefinition, Primitive,
};
use objgate_engine::{ClassRegistry, Throwable, TypeDesc, Value};

/// Fully-qualified name of the filesystem helper class
pub const FILES_CLASS: &str = "gate.io.Files";

/// Fully-qualified name of the in-memory byte source class
pub const BYTE_SOURCE_CLASS: &str = "gate.io.ByteSource";

/// Fully-qualified name of the I/O failure class
pub const IO_EXCEPTION: &str = "gate.io.IOException";

const STREAM_CLASS: &str = "gate.io.InputStream";
const DATA: &str = "data";

fn io_error(path: &str, err: std::io::Error) -> Throwable {
    Throwable::new(IO_EXCEPTION, format!("{}: {}", path, err))
}

fn bytes_type() -> TypeDesc {
    TypeDesc::Primitive(Primitive::Byte).array_of()
}

fn files_class() -> ClassBuilder {
    ClassBuilder::new(FILES_CLASS)
        .as_abstract()
        .method(
            MethodDefinition::new("open", |call| {
                let path = call.string(0)?;
                let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
                tracing::debug!(path, "opened file stream");
                Ok(Value::Object(call.classes().new_stream(Box::new(file))))
            })
            .as_static()
            .with_param(TypeDesc::String)
            .returns(TypeDesc::class(STREAM_CLASS)),
        )
        .method(
            MethodDefinition::new("readString", |call| {
                let path = call.string(0)?;
                std::fs::read_to_string(path)
                    .map(Value::Str)
                    .map_err(|e| io_error(path, e))
            })
            .as_static()
            .with_param(TypeDesc::String)
            .returns(TypeDesc::String),
        )
        .method(
            MethodDefinition::new("exists", |call| Ok(Value::Bool(Path::new(call.string(0)?).exists())))
                .as_static()
                .with_param(TypeDesc::String)
                .returns(TypeDesc::boolean()),
        )
}

fn data(call: &Invocation<'_>) -> Result<Vec<u8>, Throwable> {
    match call.this()?.field(DATA) {
        Some(Value::Bytes(bytes)) => Ok(bytes),
        _ => Ok(Vec::new()),
    }
}

fn byte_source_class() -> ClassBuilder {
    ClassBuilder::new(BYTE_SOURCE_CLASS)
        .field(FieldDefinition::new(DATA, bytes_type()).as_readonly())
        .constructor(
            ConstructorDefinition::new(|call| {
                let text = call.string(0)?;
                call.this()?.set_field(DATA, Value::Bytes(text.as_bytes().to_vec()));
                Ok(())
            })
            .with_param(TypeDesc::String),
        )
        .constructor(
            ConstructorDefinition::new(|call| {
                let bytes = match call.arg(0) {
                    Value::Bytes(bytes) => bytes.clone(),
                    other => {
                        return Err(Throwable::illegal_argument(format!(
                            "expected byte[], got {}",
                            other.type_name()
                        )))
                    }
                };
                call.this()?.set_field(DATA, Value::Bytes(bytes));
                Ok(())
            })
            .with_param(bytes_type()),
        )
        .method(
            MethodDefinition::new("open", |call| {
                let bytes = data(call)?;
                Ok(Value::Object(call.classes().new_stream(Box::new(Cursor::new(bytes)))))
            })
            .returns(TypeDesc::class(STREAM_CLASS)),
        )
        .method(
            MethodDefinition::new("size", |call| Ok(Value::Int(data(call)?.len() as i32)))
                .returns(TypeDesc::int()),
        )
}

/// Register the `gate.io` classes
pub fn register(registry: &ClassRegistry) {
    registry.register_exception(IO_EXCEPTION, "gate.lang.Exception");
    registry.register(files_class().build());
    registry.register(byte_source_class().build());
}
