//! Server shutdown

use super::{Command, CommandContext, CommandOutcome};
use crate::error::GatewayResult;
use crate::protocol::{ReturnObject, SHUTDOWN_COMMAND};

/// `s`: acknowledge, stop the whole server and close this connection
pub struct ShutdownCommand;

impl Command for ShutdownCommand {
    fn name(&self) -> &'static str {
        SHUTDOWN_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        ctx.read_end()?;
        ctx.respond(ReturnObject::Void)?;
        ctx.session.gateway().shutdown();
        Ok(CommandOutcome::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn test_shutdown_sets_flag() {
        let session = session();
        let (outcome, out) = run(&ShutdownCommand, &session, &["e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Close);
        assert_eq!(out, "!yv\n");
        assert!(session.gateway().is_shutting_down());
    }
}
