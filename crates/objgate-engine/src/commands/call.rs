//! Method calls

use super::{Command, CommandContext, CommandOutcome};
use crate::error::GatewayResult;
use crate::protocol::{Response, CALL_COMMAND};

/// `c`: target id, method name, arguments
pub struct CallCommand;

impl Command for CallCommand {
    fn name(&self) -> &'static str {
        CALL_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let target_id = ctx.read_line()?;
        let method = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(target = %target_id, method = %method, args = operands.len(), "call");

        let result = ctx
            .session
            .decode_arguments(&operands)
            .and_then(|args| ctx.session.invoke(&method, &target_id, args))
            .map(Response::from);
        ctx.respond_result(result)
    }
}
