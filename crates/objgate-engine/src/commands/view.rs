//! Import views

use super::{unknown_subcommand, view_operand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{unescape, Response, ReturnObject, JVMVIEW_COMMAND};
use crate::value::Value;

const CREATE: &str = "c";
const IMPORT: &str = "i";
const REMOVE_IMPORT: &str = "r";

/// `j`: create a view (`c`), add an import (`i`) or remove one (`r`)
pub struct JvmViewCommand;

fn add_import(session: &Session, view: &str, import: &str) -> GatewayResult<Response> {
    view_operand(session, view)?.add_import(&unescape(import));
    Ok(ReturnObject::Void.into())
}

fn remove_import(session: &Session, view: &str, import: &str) -> GatewayResult<Response> {
    let removed = view_operand(session, view)?.remove_import(&unescape(import));
    Ok(ReturnObject::Primitive(Value::Bool(removed)).into())
}

impl Command for JvmViewCommand {
    fn name(&self) -> &'static str {
        JVMVIEW_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(sub = %sub, operands = ?operands, "jvm view");

        let session = ctx.session;
        let result = match (sub.as_str(), operands.as_slice()) {
            (CREATE, [name]) => Ok(session.create_view(&unescape(name)).into()),
            (IMPORT, [view, import]) => add_import(session, view, import),
            (REMOVE_IMPORT, [view, import]) => remove_import(session, view, import),
            (CREATE | IMPORT | REMOVE_IMPORT, _) => {
                return Err(GatewayError::Protocol(format!(
                    "wrong number of operands for view sub-command '{}'",
                    sub
                )))
            }
            (other, _) => return Err(unknown_subcommand(JVMVIEW_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn test_create_view_and_import() {
        let session = session();
        let (_, out) = run(&JvmViewCommand, &session, &["c", "scratch", "e"]);
        assert_eq!(out, "!yro0\n");
        let view = session.view("o0").unwrap();
        assert_eq!(view.name(), "scratch");
        assert_eq!(view.id(), "o0");

        let (_, out) = run(&JvmViewCommand, &session, &["i", "ro0", "gate.util.ArrayList", "e"]);
        assert_eq!(out, "!yv\n");
        assert_eq!(view.single_import("ArrayList").as_deref(), Some("gate.util.ArrayList"));

        let (_, out) = run(&JvmViewCommand, &session, &["r", "ro0", "gate.util.ArrayList", "e"]);
        assert_eq!(out, "!ybtrue\n");
        let (_, out) = run(&JvmViewCommand, &session, &["r", "ro0", "gate.util.ArrayList", "e"]);
        assert_eq!(out, "!ybfalse\n");
    }

    #[test]
    fn test_star_import_on_default_view() {
        let session = session();
        run(&JvmViewCommand, &session, &["i", "rj", "gate.util.*", "e"]);
        let view = session.view("j").unwrap();
        assert!(view.star_imports().contains(&"gate.util".to_string()));
        assert!(session.resolve_class("ArrayList").is_ok());
    }

    #[test]
    fn test_view_operand_must_be_a_view() {
        let session = session();
        let list = session.gateway().classes().new_list(Vec::new());
        session.return_object(list.into());
        let (outcome, out) = run(&JvmViewCommand, &session, &["i", "ro0", "gate.util.*", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert!(out.starts_with("!xsGatewayError"));
    }
}
