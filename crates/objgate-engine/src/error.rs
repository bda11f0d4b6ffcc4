//! Error types for the gateway
//!
//! Every failure is classified by whether it is fatal to the connection.
//! Recoverable failures are turned into ERROR envelopes by the command that
//! hit them; fatal ones unwind the connection loop.

use crate::throwable::Throwable;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed line, unknown tag or command, unterminated command
    #[error("ProtocolError: {0}")]
    Protocol(String),

    /// A reference id that is not registered in the session
    #[error("ReferenceError: object id {0} is not registered")]
    NoSuchReference(String),

    /// Member lookup or argument conversion failed
    #[error("ReflectionError: {0}")]
    Reflection(#[from] ReflectError),

    /// Invoked code failed
    #[error("TargetException: {0}")]
    Target(Throwable),

    /// Authentication gate rejected the connection
    #[error("AuthenticationError: {0}")]
    Authentication(String),

    /// Operation is not valid for the given operands
    #[error("GatewayError: {0}")]
    Invalid(String),

    /// The peer closed the channel
    #[error("channel closed by peer")]
    ChannelClosed,

    /// The channel failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Whether the error ends the connection instead of producing an
    /// ERROR envelope.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::Protocol(_)
                | GatewayError::Authentication(_)
                | GatewayError::ChannelClosed
                | GatewayError::Io(_)
        )
    }

    /// Whether the channel itself failed, so nothing more can be written.
    pub fn is_channel_failure(&self) -> bool {
        matches!(self, GatewayError::ChannelClosed | GatewayError::Io(_))
    }

    /// Text carried by the ERROR envelope for this error.
    pub fn description(&self) -> String {
        match self {
            GatewayError::Target(throwable) => throwable.render(),
            other => other.to_string(),
        }
    }
}

/// Reflection failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// No class registered under the name
    #[error("class {0} does not exist")]
    NoSuchClass(String),

    /// No eligible method overload
    #[error("method {name}({args}) does not exist on class {class}")]
    NoSuchMethod {
        /// Class searched
        class: String,
        /// Method name
        name: String,
        /// Argument type names, comma separated
        args: String,
    },

    /// No eligible constructor overload
    #[error("constructor {class}({args}) does not exist")]
    NoSuchConstructor {
        /// Class searched
        class: String,
        /// Argument type names, comma separated
        args: String,
    },

    /// No field with the name
    #[error("field {name} does not exist on class {class}")]
    NoSuchField {
        /// Class searched
        class: String,
        /// Field name
        name: String,
    },

    /// An instance member was named through a class
    #[error("trying to access a non-static member from static context: {class}.{name}")]
    StaticContext {
        /// Class searched
        class: String,
        /// Member name
        name: String,
    },

    /// Field declared read-only
    #[error("field {class}.{name} is read-only")]
    ReadOnlyField {
        /// Declaring class
        class: String,
        /// Field name
        name: String,
    },

    /// Value cannot be converted to the declared type
    #[error("cannot convert {from} to {to}")]
    Conversion {
        /// Runtime type of the value
        from: String,
        /// Declared type
        to: String,
    },

    /// Invalid array type or dimensions
    #[error("invalid array: {0}")]
    InvalidArray(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(GatewayError::Protocol("bad".into()).is_fatal());
        assert!(GatewayError::ChannelClosed.is_fatal());
        assert!(!GatewayError::NoSuchReference("o3".into()).is_fatal());
        assert!(!GatewayError::Reflection(ReflectError::NoSuchClass("x.Y".into())).is_fatal());
    }

    #[test]
    fn test_reference_description_names_kind() {
        let err = GatewayError::NoSuchReference("o9".into());
        assert!(err.description().starts_with("ReferenceError"));
        assert!(err.description().contains("o9"));
    }
}
