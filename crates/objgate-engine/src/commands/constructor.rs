//! Constructor calls

use super::{Command, CommandContext, CommandOutcome};
use crate::error::GatewayResult;
use crate::protocol::{Response, CONSTRUCTOR_COMMAND};

/// `i`: class name, arguments
pub struct ConstructorCommand;

impl Command for ConstructorCommand {
    fn name(&self) -> &'static str {
        CONSTRUCTOR_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let class_name = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(class = %class_name, args = operands.len(), "construct");

        let result = ctx
            .session
            .decode_arguments(&operands)
            .and_then(|args| ctx.session.invoke_constructor(&class_name, args))
            .map(Response::from);
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn test_construct_list() {
        let session = session();
        let (_, out) = run(&ConstructorCommand, &session, &["gate.util.ArrayList", "e"]);
        assert_eq!(out, "!ylo0\n");
    }

    #[test]
    fn test_construct_through_default_import() {
        let session = session();
        let (_, out) = run(&ConstructorCommand, &session, &["Object", "e"]);
        assert_eq!(out, "!yro0\n");
    }

    #[test]
    fn test_no_matching_constructor() {
        let session = session();
        let (outcome, out) = run(&ConstructorCommand, &session, &["gate.util.ArrayList", "sx", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert!(out.starts_with("!xsReflectionError"));

        let (_, out) = run(&ConstructorCommand, &session, &["demo.Missing", "e"]);
        assert!(out.starts_with("!xsReflectionError"));
    }
}
