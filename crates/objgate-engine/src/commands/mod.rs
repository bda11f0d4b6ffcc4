//! Commands
//!
//! One [`Command`] per operation family, looked up by its token in a
//! [`CommandRegistry`]. A command reads its own operand lines, performs one
//! operation through the [`Session`], and writes exactly one response.
//! Operand lines are read in full before anything is decoded, so a failing
//! operation never leaves part of the request unread.

mod array;
mod auth;
mod call;
mod constructor;
mod dir;
mod exception;
mod field;
mod help;
mod list;
mod memory;
mod reflection;
mod shutdown;
mod stream;
mod view;

pub use array::ArrayCommand;
pub use auth::AuthCommand;
pub use call::CallCommand;
pub use constructor::ConstructorCommand;
pub use dir::DirCommand;
pub use exception::ExceptionCommand;
pub use field::FieldCommand;
pub use help::HelpCommand;
pub use list::ListCommand;
pub use memory::MemoryCommand;
pub use reflection::ReflectionCommand;
pub use shutdown::ShutdownCommand;
pub use stream::StreamCommand;
pub use view::JvmViewCommand;

use std::io::{BufRead, Write};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{JvmView, Session};
use crate::protocol::{decode, Response, END};
use crate::value::{Object, Value};

/// What the connection does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Read the next command
    Continue,
    /// Close the connection
    Close,
}

/// Read one line without its terminator. `None` at end of input.
pub fn read_line(reader: &mut dyn BufRead) -> GatewayResult<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

/// Channel and session available to a running command
pub struct CommandContext<'a> {
    /// Session of the connection
    pub session: &'a Session,
    reader: &'a mut dyn BufRead,
    writer: &'a mut dyn Write,
}

impl<'a> CommandContext<'a> {
    /// Create a context
    pub fn new(session: &'a Session, reader: &'a mut dyn BufRead, writer: &'a mut dyn Write) -> Self {
        Self {
            session,
            reader,
            writer,
        }
    }

    /// Read an operand line. End of input mid-command closes the connection.
    pub fn read_line(&mut self) -> GatewayResult<String> {
        read_line(self.reader)?.ok_or(GatewayError::ChannelClosed)
    }

    /// Consume the end-of-command marker
    pub fn read_end(&mut self) -> GatewayResult<()> {
        let line = self.read_line()?;
        if line == END {
            Ok(())
        } else {
            Err(GatewayError::Protocol(format!(
                "expected end of command, got '{}'",
                line
            )))
        }
    }

    /// Read raw operand lines up to and including the end-of-command marker
    pub fn read_operands(&mut self) -> GatewayResult<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line == END {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Raw output channel
    pub fn writer(&mut self) -> &mut dyn Write {
        self.writer
    }

    /// Write one response
    pub fn respond(&mut self, response: impl Into<Response>) -> GatewayResult<CommandOutcome> {
        response.into().write_to(self.writer)?;
        Ok(CommandOutcome::Continue)
    }

    /// Write the outcome of an operation. Recoverable failures become an
    /// ERROR; fatal ones are returned to the connection loop.
    pub fn respond_result(&mut self, result: GatewayResult<Response>) -> GatewayResult<CommandOutcome> {
        match result {
            Ok(response) => self.respond(response),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::debug!(error = %err, "command failed");
                let response = self.session.error_object(&err);
                self.respond(response)
            }
        }
    }
}

/// A protocol command
pub trait Command: Send + Sync {
    /// Command token
    fn name(&self) -> &'static str;

    /// Read operands, perform the operation and respond
    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome>;
}

/// Commands by token
pub struct CommandRegistry {
    commands: FxHashMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            commands: FxHashMap::default(),
        }
    }

    /// Registry with every standard command. Authentication is handled by
    /// the connection, not through this table.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CallCommand));
        registry.register(Box::new(ConstructorCommand));
        registry.register(Box::new(FieldCommand));
        registry.register(Box::new(ArrayCommand));
        registry.register(Box::new(ListCommand));
        registry.register(Box::new(ReflectionCommand));
        registry.register(Box::new(DirCommand));
        registry.register(Box::new(HelpCommand));
        registry.register(Box::new(ExceptionCommand));
        registry.register(Box::new(MemoryCommand));
        registry.register(Box::new(JvmViewCommand));
        registry.register(Box::new(ShutdownCommand));
        registry.register(Box::new(StreamCommand));
        registry
    }

    /// Register a command under its token
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    /// Look up a command by token
    pub fn get(&self, token: &str) -> Option<&dyn Command> {
        self.commands.get(token).map(|c| c.as_ref())
    }

    /// Check if a token is registered
    pub fn contains(&self, token: &str) -> bool {
        self.commands.contains_key(token)
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Operand helpers
// ============================================================================

pub(crate) fn unknown_subcommand(command: &str, sub: &str) -> GatewayError {
    GatewayError::Protocol(format!("unknown sub-command '{}' for command '{}'", sub, command))
}

pub(crate) fn expect_int(value: &Value, what: &str) -> GatewayResult<i32> {
    value
        .as_i32()
        .ok_or_else(|| GatewayError::Invalid(format!("{} must be an int, got {}", what, value.type_name())))
}

pub(crate) fn expect_string(value: Value, what: &str) -> GatewayResult<String> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(GatewayError::Invalid(format!(
            "{} must be a string, got {}",
            what,
            other.type_name()
        ))),
    }
}

pub(crate) fn expect_list<'o>(object: &'o Object, id: &str) -> GatewayResult<&'o parking_lot::Mutex<Vec<Value>>> {
    object
        .as_list()
        .ok_or_else(|| GatewayError::Invalid(format!("{} is not a list", id)))
}

/// Import view named by an encoded reference operand
pub(crate) fn view_operand(session: &Session, line: &str) -> GatewayResult<Arc<JvmView>> {
    match decode(line, session)? {
        Value::Object(object) => object
            .as_view()
            .cloned()
            .ok_or_else(|| GatewayError::Invalid(format!("{} is not a JVM view", line))),
        other => Err(GatewayError::Invalid(format!(
            "expected a JVM view reference, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn checked_index(index: i32, len: usize) -> GatewayResult<usize> {
    if index < 0 || index as usize >= len {
        return Err(GatewayError::Invalid(format!(
            "index {} out of bounds for length {}",
            index, len
        )));
    }
    Ok(index as usize)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory driver for command tests

    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;
    use crate::gateway::Gateway;
    use crate::reflect::ClassRegistry;

    pub fn session() -> Session {
        Arc::new(Gateway::new(Arc::new(ClassRegistry::new()))).session()
    }

    /// Run one command over the given operand lines, returning the output
    pub fn run(command: &dyn Command, session: &Session, lines: &[&str]) -> (GatewayResult<CommandOutcome>, String) {
        let mut input = String::new();
        for line in lines {
            input.push_str(line);
            input.push('\n');
        }
        let mut reader = Cursor::new(input.into_bytes());
        let mut output = Vec::new();
        let outcome = {
            let mut ctx = CommandContext::new(session, &mut reader, &mut output);
            command.execute(&mut ctx)
        };
        (outcome, String::from_utf8_lossy(&output).into_owned())
    }
}
