//! Help pages

use super::{unknown_subcommand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{decode, Response, ReturnObject, HELP_COMMAND};
use crate::reflect::{help::help_page, ClassRef};
use crate::value::Value;

const OBJECT: &str = "o";
const CLASS: &str = "c";

/// `h`: help page for an object's class (`o`) or a named class (`c`)
pub struct HelpCommand;

fn page(session: &Session, class: &ClassRef, pattern_line: &str, short_line: &str) -> GatewayResult<Response> {
    let pattern = match decode(pattern_line, session)? {
        Value::Null => None,
        Value::Str(pattern) => Some(pattern),
        other => {
            return Err(GatewayError::Invalid(format!(
                "help pattern must be a string, got {}",
                other.type_name()
            )))
        }
    };
    let short_name = decode(short_line, session)?.as_bool().unwrap_or(false);
    let text = help_page(class, session.gateway().classes(), pattern.as_deref(), short_name);
    Ok(ReturnObject::Primitive(Value::Str(text)).into())
}

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        HELP_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let target = ctx.read_line()?;
        let pattern = ctx.read_line()?;
        let short_name = ctx.read_line()?;
        ctx.read_end()?;
        tracing::debug!(sub = %sub, target = %target, "help");

        let session = ctx.session;
        let class = match sub.as_str() {
            OBJECT => session.object(&target).map(|object| object.class().clone()),
            CLASS => session.resolve_class(&target),
            other => return Err(unknown_subcommand(HELP_COMMAND, other)),
        };
        let result = class.and_then(|class| page(session, &class, &pattern, &short_name));
        ctx.respond_result(result)
    }
}
