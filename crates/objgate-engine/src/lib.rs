//! Objgate Engine
//!
//! An object gateway: a line-framed RPC protocol that lets a remote process
//! construct objects, invoke methods, read and write fields, and manipulate
//! arrays and lists on live objects of this process through opaque reference
//! ids.
//!
//! # Module Organization
//!
//! - [`protocol`] - value codec, response envelopes and command framing
//! - [`reflect`] - class registry, type descriptors and overload resolution
//! - [`gateway`] - shared gateway state, per-connection sessions and views
//! - [`commands`] - one command per operation family
//! - [`server`] - TCP accept loop and per-connection handlers
//! - [`config`] - server configuration loaded from TOML

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod reflect;
pub mod server;
pub mod throwable;
pub mod value;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult, ReflectError};
pub use gateway::{Gateway, JvmView, Session};
pub use protocol::ReturnObject;
pub use reflect::{ClassBuilder, ClassDef, ClassRegistry, TypeDesc};
pub use server::{GatewayServer, GatewayServerListener};
pub use throwable::Throwable;
pub use value::{Object, Value};
