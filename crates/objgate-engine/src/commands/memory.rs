//! Reference release

use super::{unknown_subcommand, Command, CommandContext, CommandOutcome};
use crate::error::GatewayResult;
use crate::protocol::{ReturnObject, MEMORY_COMMAND};

const DELETE: &str = "d";

/// `m`: release a reference id (`d`). Unknown ids are ignored.
pub struct MemoryCommand;

impl Command for MemoryCommand {
    fn name(&self) -> &'static str {
        MEMORY_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let id = ctx.read_line()?;
        ctx.read_end()?;
        if sub != DELETE {
            return Err(unknown_subcommand(MEMORY_COMMAND, &sub));
        }

        let released = ctx.session.delete(&id);
        tracing::debug!(id = %id, released, "release reference");
        ctx.respond(ReturnObject::Void)
    }
}
