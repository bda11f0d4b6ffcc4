//! Raw byte streams
//!
//! After the void acknowledgement the connection carries raw bytes, not
//! protocol lines, so it ends when the source is exhausted. A failure while
//! copying can only be signalled by closing the channel.

use std::io::{self, Write};

use super::{Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{ReturnObject, STREAM_COMMAND};
use crate::value::{ByteSource, Value};

/// `S`: target id, method name, arguments. The method must return a
/// stream object.
pub struct StreamCommand;

fn open_stream(session: &Session, target_id: &str, method: &str, operands: &[String]) -> GatewayResult<ByteSource> {
    let args = session.decode_arguments(operands)?;
    match session.call(target_id, method, args)? {
        Some(Value::Object(object)) => object
            .take_stream()
            .ok_or_else(|| GatewayError::Invalid(format!("{}.{} did not return an open stream", target_id, method))),
        _ => Err(GatewayError::Invalid(format!(
            "{}.{} did not return a stream",
            target_id, method
        ))),
    }
}

impl Command for StreamCommand {
    fn name(&self) -> &'static str {
        STREAM_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let target_id = ctx.read_line()?;
        let method = ctx.read_line()?;
        let operands = ctx.read_operands()?;

        let mut source = match open_stream(ctx.session, &target_id, &method, &operands) {
            Ok(source) => source,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                let response = ctx.session.error_object(&err);
                ctx.respond(response)?;
                return Ok(CommandOutcome::Continue);
            }
        };

        ctx.respond(ReturnObject::Void)?;
        let copied = io::copy(&mut source, ctx.writer())?;
        ctx.writer().flush()?;
        tracing::debug!(target = %target_id, method = %method, bytes = copied, "stream finished");
        Ok(CommandOutcome::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::commands::testing::{run, session};
    use crate::reflect::{ClassBuilder, MethodDefinition, TypeDesc};

    fn register_source(session: &Session) -> String {
        let class = session.gateway().classes().register(
            ClassBuilder::new("demo.Source")
                .method(
                    MethodDefinition::new("open", |call| {
                        let bytes = b"raw\x00bytes".to_vec();
                        Ok(call.classes().new_stream(Box::new(Cursor::new(bytes))).into())
                    })
                    .returns(TypeDesc::class("gate.io.InputStream")),
                )
                .method(MethodDefinition::new("name", |_| Ok(Value::from("src"))).returns(TypeDesc::String))
                .build(),
        );
        let object = session.gateway().classes().new_instance(&class);
        session.return_object(object.into()).reference_id().unwrap().to_string()
    }

    #[test]
    fn test_stream_pipes_raw_bytes() {
        let session = session();
        let id = register_source(&session);
        let (outcome, out) = run(&StreamCommand, &session, &[&id, "open", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Close);
        assert_eq!(out, "!yv\nraw\u{0}bytes");
    }

    #[test]
    fn test_non_stream_result_is_an_error() {
        let session = session();
        let id = register_source(&session);
        let (outcome, out) = run(&StreamCommand, &session, &[&id, "name", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert!(out.starts_with("!xsGatewayError"));
    }
}
