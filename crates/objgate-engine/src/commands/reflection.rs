//! Member and class lookup by name

use super::{unknown_subcommand, view_operand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult, ReflectError};
use crate::gateway::Session;
use crate::protocol::{MemberKind, Response, REFLECTION_COMMAND};
use crate::reflect::MemberContext;

const UNKNOWN: &str = "u";
const MEMBER: &str = "m";
const CLASS: &str = "c";

/// `r`: resolve an unknown name (`u`), a static member (`m`) or a class
/// object (`c`)
pub struct ReflectionCommand;

/// A name that is not a class through the view is taken to be a package
fn unknown_member(session: &Session, name: &str, view_line: &str) -> GatewayResult<Response> {
    let view = view_operand(session, view_line)?;
    match session.gateway().resolve_class(name, Some(view.as_ref())) {
        Ok(class) => Ok(Response::Member(MemberKind::Class(class.name().to_string()))),
        Err(ReflectError::NoSuchClass(_)) => Ok(Response::Member(MemberKind::Package)),
        Err(err) => Err(err.into()),
    }
}

/// Static field, then static method, then nested class
fn static_member(session: &Session, class_name: &str, member: &str) -> GatewayResult<Response> {
    let engine = session.gateway().engine();
    let class = session.resolve_class(class_name)?;

    if let Some(field) = engine.get_field(&class, member, MemberContext::Static) {
        let value = engine.get_field_value(None, &field);
        return Ok(session.return_object(value).into());
    }

    match engine.has_method(&class, member, MemberContext::Static) {
        Some(true) => return Ok(Response::Member(MemberKind::Method)),
        Some(false) => {
            return Err(ReflectError::StaticContext {
                class: class.name().to_string(),
                name: member.to_string(),
            }
            .into())
        }
        None => {}
    }

    match engine.nested_class(&class, member) {
        Some(nested) => Ok(Response::Member(MemberKind::Class(nested.name().to_string()))),
        None => Err(GatewayError::Invalid(format!(
            "{} has no static member named {}",
            class.name(),
            member
        ))),
    }
}

fn class_object(session: &Session, class_name: &str) -> GatewayResult<Response> {
    let class = session.resolve_class(class_name)?;
    let object = session.gateway().classes().class_object(&class);
    Ok(session.return_object(object.into()).into())
}

impl Command for ReflectionCommand {
    fn name(&self) -> &'static str {
        REFLECTION_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(sub = %sub, operands = ?operands, "reflection");

        let session = ctx.session;
        let result = match (sub.as_str(), operands.as_slice()) {
            (UNKNOWN, [name, view]) => unknown_member(session, name, view),
            (MEMBER, [class, member]) => static_member(session, class, member),
            (CLASS, [class]) => class_object(session, class),
            (UNKNOWN | MEMBER | CLASS, _) => {
                return Err(GatewayError::Protocol(format!(
                    "wrong number of operands for reflection sub-command '{}'",
                    sub
                )))
            }
            (other, _) => return Err(unknown_subcommand(REFLECTION_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};
    use crate::reflect::{ClassBuilder, FieldDefinition, MethodDefinition, TypeDesc};
    use crate::value::Value;

    fn register_shapes(session: &Session) {
        let classes = session.gateway().classes();
        classes.register(
            ClassBuilder::new("demo.Shape")
                .field(
                    FieldDefinition::new("SIDES", TypeDesc::int())
                        .as_static()
                        .initial_value(Value::Int(4)),
                )
                .method(MethodDefinition::new("unit", |_| Ok(Value::Int(1))).as_static().returns(TypeDesc::int()))
                .method(MethodDefinition::new("area", |_| Ok(Value::Int(0))).returns(TypeDesc::int()))
                .nested("Kind")
                .build(),
        );
        classes.register(ClassBuilder::new("demo.Shape$Kind").build());
    }

    #[test]
    fn test_member_lookup_order() {
        let session = session();
        register_shapes(&session);

        let (_, out) = run(&ReflectionCommand, &session, &["m", "demo.Shape", "SIDES", "e"]);
        assert_eq!(out, "!yi4\n");
        let (_, out) = run(&ReflectionCommand, &session, &["m", "demo.Shape", "unit", "e"]);
        assert_eq!(out, "!ym\n");
        let (_, out) = run(&ReflectionCommand, &session, &["m", "demo.Shape", "Kind", "e"]);
        assert_eq!(out, "!ycdemo.Shape$Kind\n");
    }

    #[test]
    fn test_instance_method_from_static_context() {
        let session = session();
        register_shapes(&session);
        let (outcome, out) = run(&ReflectionCommand, &session, &["m", "demo.Shape", "area", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert!(out.contains("non-static member from static context"));

        let (_, out) = run(&ReflectionCommand, &session, &["m", "demo.Shape", "nothing", "e"]);
        assert!(out.starts_with("!x"));
    }

    #[test]
    fn test_unknown_class_or_package() {
        let session = session();
        register_shapes(&session);
        let (_, out) = run(&ReflectionCommand, &session, &["u", "demo.Shape", "rj", "e"]);
        assert_eq!(out, "!ycdemo.Shape\n");
        let (_, out) = run(&ReflectionCommand, &session, &["u", "Object", "rj", "e"]);
        assert_eq!(out, "!ycgate.lang.Object\n");
        let (_, out) = run(&ReflectionCommand, &session, &["u", "demo", "rj", "e"]);
        assert_eq!(out, "!yp\n");
    }

    #[test]
    fn test_class_object() {
        let session = session();
        let (_, first) = run(&ReflectionCommand, &session, &["c", "gate.util.ArrayList", "e"]);
        let (_, second) = run(&ReflectionCommand, &session, &["c", "gate.util.ArrayList", "e"]);
        assert_eq!(first, "!yro0\n");
        assert_eq!(first, second);
    }
}
