//! Field access

use super::{unknown_subcommand, Command, CommandContext, CommandOutcome};
use crate::error::GatewayResult;
use crate::gateway::Session;
use crate::protocol::{decode, Response, ReturnObject, FIELD_COMMAND, STATIC_PREFIX};
use crate::reflect::{ClassRef, FieldRef, MemberContext};
use crate::value::{Object, Value};

const GET: &str = "g";
const SET: &str = "s";

/// `f`: get (`g`) or set (`s`) a field. A target of the form `z:<class>`
/// addresses a static field.
pub struct FieldCommand;

struct FieldTarget {
    object: Option<Object>,
    class: ClassRef,
    context: MemberContext,
}

impl FieldTarget {
    fn resolve(session: &Session, target_id: &str) -> GatewayResult<Self> {
        match target_id.strip_prefix(STATIC_PREFIX) {
            Some(class_name) => Ok(Self {
                object: None,
                class: session.resolve_class(class_name)?,
                context: MemberContext::Static,
            }),
            None => {
                let object = session.object(target_id)?;
                Ok(Self {
                    class: object.class().clone(),
                    object: Some(object),
                    context: MemberContext::Instance,
                })
            }
        }
    }

    fn field(&self, session: &Session, name: &str) -> Option<FieldRef> {
        session.gateway().engine().get_field(&self.class, name, self.context)
    }
}

fn get_field(session: &Session, target_id: &str, name: &str) -> GatewayResult<Response> {
    let target = FieldTarget::resolve(session, target_id)?;
    let Some(field) = target.field(session, name) else {
        return Ok(Response::NoSuchField);
    };
    let value = session
        .gateway()
        .engine()
        .get_field_value(target.object.as_ref(), &field);
    Ok(session.return_object(value).into())
}

fn set_field(session: &Session, target_id: &str, name: &str, value: Value) -> GatewayResult<Response> {
    let target = FieldTarget::resolve(session, target_id)?;
    let Some(field) = target.field(session, name) else {
        return Ok(Response::NoSuchField);
    };
    session
        .gateway()
        .engine()
        .set_field_value(target.object.as_ref(), &field, value)?;
    Ok(ReturnObject::Void.into())
}

impl Command for FieldCommand {
    fn name(&self) -> &'static str {
        FIELD_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let target_id = ctx.read_line()?;
        let field = ctx.read_line()?;
        tracing::debug!(sub = %sub, target = %target_id, field = %field, "field");

        let result = match sub.as_str() {
            GET => {
                ctx.read_end()?;
                get_field(ctx.session, &target_id, &field)
            }
            SET => {
                let line = ctx.read_line()?;
                ctx.read_end()?;
                decode(&line, ctx.session).and_then(|value| set_field(ctx.session, &target_id, &field, value))
            }
            other => return Err(unknown_subcommand(FIELD_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}
