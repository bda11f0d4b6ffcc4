//! Tagged results
//!
//! Every value that crosses the boundary is wrapped in a [`ReturnObject`]
//! before it is encoded.

use super::codec::{encode, escape};
use super::{
    ARRAY_TYPE, ERROR, ITERATOR_TYPE, LIST_TYPE, MAP_TYPE, NULL_TYPE, REFERENCE_TYPE, SET_TYPE,
    STRING_TYPE, SUCCESS, VOID_TYPE,
};
use crate::error::GatewayError;
use crate::value::Value;

/// Shape of a referenced object, so the client can pick a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Plain object
    Object,
    /// List
    List,
    /// Array
    Array,
    /// Map
    Map,
    /// Set
    Set,
    /// Iterator
    Iterator,
}

impl ReferenceKind {
    fn tag(self) -> char {
        match self {
            ReferenceKind::Object => REFERENCE_TYPE,
            ReferenceKind::List => LIST_TYPE,
            ReferenceKind::Array => ARRAY_TYPE,
            ReferenceKind::Map => MAP_TYPE,
            ReferenceKind::Set => SET_TYPE,
            ReferenceKind::Iterator => ITERATOR_TYPE,
        }
    }
}

/// Result of one gateway operation
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnObject {
    /// No value
    Void,
    /// Absent value; encoded distinctly from void
    Null,
    /// A value sent by value
    Primitive(Value),
    /// A registered object
    Reference {
        /// Reference id
        id: String,
        /// Object shape
        kind: ReferenceKind,
    },
    /// Failure description
    Error(String),
    /// Failure raised by invoked code. The throwable stays registered under
    /// `id` so the client can fetch its trace with the exception command.
    Thrown {
        /// Reference id of the throwable
        id: String,
        /// Rendered trace
        trace: String,
    },
}

impl ReturnObject {
    /// ERROR carrying the error's description
    pub fn error(err: &GatewayError) -> Self {
        ReturnObject::Error(err.description())
    }

    /// Whether this is an ERROR
    pub fn is_error(&self) -> bool {
        matches!(self, ReturnObject::Error(_) | ReturnObject::Thrown { .. })
    }

    /// Failure text of an ERROR; the rendered trace for a thrown failure
    pub fn error_text(&self) -> Option<&str> {
        match self {
            ReturnObject::Error(description) => Some(description),
            ReturnObject::Thrown { trace, .. } => Some(trace),
            _ => None,
        }
    }

    /// Reference id, if this is a REFERENCE
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            ReturnObject::Reference { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Status tag followed by the encoded value
    pub fn encode(&self) -> String {
        match self {
            ReturnObject::Void => format!("{}{}", SUCCESS, VOID_TYPE),
            ReturnObject::Null => format!("{}{}", SUCCESS, NULL_TYPE),
            ReturnObject::Primitive(value) => match encode(value) {
                Some(line) => format!("{}{}", SUCCESS, line),
                None => format!("{}{}", SUCCESS, NULL_TYPE),
            },
            ReturnObject::Reference { id, kind } => format!("{}{}{}", SUCCESS, kind.tag(), id),
            ReturnObject::Error(description) if description.is_empty() => ERROR.to_string(),
            ReturnObject::Error(description) => {
                format!("{}{}{}", ERROR, STRING_TYPE, escape(description))
            }
            ReturnObject::Thrown { id, .. } => format!("{}{}{}", ERROR, REFERENCE_TYPE, id),
        }
    }
}
