//! Exception traces

use super::{Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{Response, ReturnObject, EXCEPTION_COMMAND};
use crate::value::Value;

/// `p`: rendered trace of a referenced throwable
pub struct ExceptionCommand;

fn trace(session: &Session, id: &str) -> GatewayResult<Response> {
    let throwable = session
        .object(id)?
        .throwable()
        .ok_or_else(|| GatewayError::Invalid(format!("{} is not a throwable", id)))?;
    Ok(ReturnObject::Primitive(Value::Str(throwable.render())).into())
}

impl Command for ExceptionCommand {
    fn name(&self) -> &'static str {
        EXCEPTION_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let id = ctx.read_line()?;
        ctx.read_end()?;
        let result = trace(ctx.session, &id);
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};
    use crate::throwable::Throwable;

    #[test]
    fn test_trace_of_throwable() {
        let session = session();
        let throwable = Throwable::new("gate.lang.IllegalStateException", "closed").with_frame("demo.Door.open");
        let object = session.gateway().classes().throwable_object(throwable);
        let id = session.return_object(object.into()).reference_id().unwrap().to_string();

        let (_, out) = run(&ExceptionCommand, &session, &[&id, "e"]);
        assert_eq!(out, "!ysgate.lang.IllegalStateException: closed\\n\tat demo.Door.open\\n\n");
    }

    #[test]
    fn test_not_a_throwable() {
        let session = session();
        let list = session.gateway().classes().new_list(Vec::new());
        let id = session.return_object(list.into()).reference_id().unwrap().to_string();
        let (_, out) = run(&ExceptionCommand, &session, &[&id, "e"]);
        assert!(out.starts_with("!xsGatewayError"));
    }
}
