//! Member listings

use super::{unknown_subcommand, view_operand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{decode, Response, ReturnObject, DIR_COMMAND};
use crate::value::Value;

const FIELDS: &str = "f";
const METHODS: &str = "m";
const STATICS: &str = "s";
const JVMVIEW: &str = "v";

/// `d`: names of fields (`f`), methods (`m`), static members (`s`) or
/// the imports of a view (`v`), joined by newlines
pub struct DirCommand;

fn joined(names: Vec<String>) -> Response {
    ReturnObject::Primitive(Value::Str(names.join("\n"))).into()
}

/// `None` when the client's cached sequence id is still current
fn view_names(session: &Session, view_line: &str, sequence_line: &str) -> GatewayResult<Option<Vec<String>>> {
    let last_seen = match decode(sequence_line, session)? {
        Value::Null => 0,
        Value::Str(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| GatewayError::Invalid(format!("bad sequence id '{}'", s)))?,
        other => other
            .as_i64()
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| GatewayError::Invalid(format!("bad sequence id of type {}", other.type_name())))?,
    };

    let view = view_operand(session, view_line)?;
    let (sequence_id, names) = view.snapshot();
    if sequence_id == last_seen {
        return Ok(None);
    }
    let mut listing = Vec::with_capacity(names.len() + 1);
    listing.push(sequence_id.to_string());
    listing.extend(names);
    Ok(Some(listing))
}

impl Command for DirCommand {
    fn name(&self) -> &'static str {
        DIR_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(sub = %sub, operands = ?operands, "dir");

        let session = ctx.session;
        let engine = session.gateway().engine();
        let result = match (sub.as_str(), operands.as_slice()) {
            (FIELDS, [id]) => session
                .object(id)
                .map(|object| joined(engine.field_names(object.class()))),
            (METHODS, [id]) => session
                .object(id)
                .map(|object| joined(engine.method_names(object.class()))),
            (STATICS, [class]) => session
                .resolve_class(class)
                .map(|class| joined(engine.static_member_names(&class))),
            (JVMVIEW, [view, sequence]) => view_names(session, view, sequence).map(|names| match names {
                Some(names) => joined(names),
                None => ReturnObject::Null.into(),
            }),
            (FIELDS | METHODS | STATICS | JVMVIEW, _) => {
                return Err(GatewayError::Protocol(format!(
                    "wrong number of operands for dir sub-command '{}'",
                    sub
                )))
            }
            (other, _) => return Err(unknown_subcommand(DIR_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};
    use crate::reflect::{ClassBuilder, FieldDefinition, MethodDefinition, TypeDesc};

    #[test]
    fn test_jvmview_unchanged_and_changed() {
        let session = session();
        let (_, out) = run(&DirCommand, &session, &["v", "rj", "n", "e"]);
        assert_eq!(out, "!ys1\n");

        let (_, out) = run(&DirCommand, &session, &["v", "rj", "s1", "e"]);
        assert_eq!(out, "!yn\n");

        session.view("j").unwrap().add_import("gate.util.ArrayList");
        let (_, out) = run(&DirCommand, &session, &["v", "rj", "s1", "e"]);
        assert_eq!(out, "!ys2\\nArrayList\n");
    }

    #[test]
    fn test_fields_methods_statics() {
        let session = session();
        let class = session.gateway().classes().register(
            ClassBuilder::new("demo.Box")
                .field(FieldDefinition::new("width", TypeDesc::int()))
                .field(FieldDefinition::new("COUNT", TypeDesc::int()).as_static())
                .method(MethodDefinition::new("open", |_| Ok(Value::Null)))
                .method(MethodDefinition::new("make", |_| Ok(Value::Null)).as_static())
                .build(),
        );
        let object = session.gateway().classes().new_instance(&class);
        let id = session.return_object(object.into()).reference_id().unwrap().to_string();

        let (_, out) = run(&DirCommand, &session, &["f", &id, "e"]);
        assert_eq!(out, "!ysCOUNT\\nwidth\n");
        let (_, out) = run(&DirCommand, &session, &["m", &id, "e"]);
        assert!(out.contains("open"));
        assert!(out.contains("toString"));
        let (_, out) = run(&DirCommand, &session, &["s", "demo.Box", "e"]);
        assert_eq!(out, "!ysCOUNT\\nmake\n");
    }

    #[test]
    fn test_unknown_subcommand_is_fatal() {
        let session = session();
        let (outcome, out) = run(&DirCommand, &session, &["q", "x", "e"]);
        assert!(matches!(outcome, Err(GatewayError::Protocol(_))));
        assert!(out.is_empty());
    }
}
