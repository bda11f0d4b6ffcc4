//! Wire protocol
//!
//! Requests are newline-framed: a command token line, an optional
//! sub-command line, operand lines, and the end-of-command line `e`.
//! Every response is one line starting with `!`, a status tag and the
//! encoded value.
//!
//! ```text
//! c            call
//! o3           target id
//! increment    method name
//! i5           argument
//! e            end of command
//! ```

pub mod codec;
pub mod response;
pub mod return_object;

pub use codec::{decode, encode, escape, unescape, ReferenceResolver};
pub use response::{MemberKind, Response};
pub use return_object::{ReferenceKind, ReturnObject};

// ============================================================================
// Framing
// ============================================================================

/// End-of-command marker line
pub const END: &str = "e";
/// Prefix of every response line
pub const RETURN_MESSAGE: char = '!';
/// Success status
pub const SUCCESS: char = 'y';
/// Error status
pub const ERROR: char = 'x';
/// Fatal error status; the connection closes after it
pub const FATAL_ERROR: char = 'z';
/// End-of-output marker
pub const END_OUTPUT: char = '\n';

// ============================================================================
// Value tags
// ============================================================================

/// null
pub const NULL_TYPE: char = 'n';
/// void
pub const VOID_TYPE: char = 'v';
/// boolean
pub const BOOLEAN_TYPE: char = 'b';
/// int
pub const INTEGER_TYPE: char = 'i';
/// long
pub const LONG_TYPE: char = 'L';
/// double
pub const DOUBLE_TYPE: char = 'd';
/// decimal (not supported)
pub const DECIMAL_TYPE: char = 'D';
/// string
pub const STRING_TYPE: char = 's';
/// byte array, base64
pub const BYTES_TYPE: char = 'j';
/// object reference
pub const REFERENCE_TYPE: char = 'r';
/// list reference
pub const LIST_TYPE: char = 'l';
/// array reference
pub const ARRAY_TYPE: char = 't';
/// map reference
pub const MAP_TYPE: char = 'a';
/// set reference
pub const SET_TYPE: char = 'h';
/// iterator reference
pub const ITERATOR_TYPE: char = 'g';
/// class member lookup result
pub const CLASS_TYPE: char = 'c';
/// method member lookup result
pub const METHOD_TYPE: char = 'm';
/// package member lookup result
pub const PACKAGE_TYPE: char = 'p';
/// missing member sentinel
pub const NO_MEMBER: char = 'o';

/// Literal for NaN doubles
pub const NAN: &str = "nan";
/// Literal for positive infinity
pub const INFINITY: &str = "inf";
/// Literal for negative infinity
pub const NEGATIVE_INFINITY: &str = "-inf";

// ============================================================================
// Reserved ids and prefixes
// ============================================================================

/// Id of the entry point object
pub const ENTRY_POINT_ID: &str = "t";
/// Target prefix selecting a static call: `z:gate.lang.Math`
pub const STATIC_PREFIX: &str = "z:";

// ============================================================================
// Command tokens
// ============================================================================

/// Call a method
pub const CALL_COMMAND: &str = "c";
/// Construct an object
pub const CONSTRUCTOR_COMMAND: &str = "i";
/// Field access
pub const FIELD_COMMAND: &str = "f";
/// Array operations
pub const ARRAY_COMMAND: &str = "a";
/// List operations
pub const LIST_COMMAND: &str = "l";
/// Class and member lookup
pub const REFLECTION_COMMAND: &str = "r";
/// Member listings
pub const DIR_COMMAND: &str = "d";
/// Help pages
pub const HELP_COMMAND: &str = "h";
/// Render a throwable
pub const EXCEPTION_COMMAND: &str = "p";
/// Reference management
pub const MEMORY_COMMAND: &str = "m";
/// Import views
pub const JVMVIEW_COMMAND: &str = "j";
/// Authenticate
pub const AUTH_COMMAND: &str = "A";
/// Stop the server
pub const SHUTDOWN_COMMAND: &str = "s";
/// Stream raw bytes
pub const STREAM_COMMAND: &str = "S";
/// Close the connection
pub const QUIT_COMMAND: &str = "q";
