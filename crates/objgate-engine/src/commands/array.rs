//! Array access and creation

use super::{checked_index, expect_int, expect_string, unknown_subcommand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{decode, Response, ReturnObject, ARRAY_COMMAND};
use crate::reflect::coerce;
use crate::value::{ArrayData, Object};

const GET: &str = "g";
const SET: &str = "s";
const SLICE: &str = "l";
const LEN: &str = "e";
const CREATE: &str = "c";

/// `a`: get, set, slice, length and create
pub struct ArrayCommand;

fn array_data<'o>(object: &'o Object, id: &str) -> GatewayResult<&'o ArrayData> {
    object
        .as_array()
        .ok_or_else(|| GatewayError::Invalid(format!("{} is not an array", id)))
}

fn get(session: &Session, operands: &[String]) -> GatewayResult<Response> {
    let [id, index] = operands else {
        return Err(arity(GET, 2, operands.len()));
    };
    let object = session.object(id)?;
    let array = array_data(&object, id)?;
    let index = expect_int(&decode(index, session)?, "array index")?;
    let value = {
        let elements = array.elements().lock();
        elements[checked_index(index, elements.len())?].clone()
    };
    Ok(session.return_object(value).into())
}

fn set(session: &Session, operands: &[String]) -> GatewayResult<Response> {
    let [id, index, value] = operands else {
        return Err(arity(SET, 3, operands.len()));
    };
    let object = session.object(id)?;
    let array = array_data(&object, id)?;
    let index = expect_int(&decode(index, session)?, "array index")?;
    let value = coerce(decode(value, session)?, array.component(), session.gateway().classes())?;
    let mut elements = array.elements().lock();
    let slot = checked_index(index, elements.len())?;
    elements[slot] = value;
    Ok(ReturnObject::Void.into())
}

fn slice(session: &Session, operands: &[String]) -> GatewayResult<Response> {
    let Some((id, indices)) = operands.split_first() else {
        return Err(arity(SLICE, 1, 0));
    };
    let object = session.object(id)?;
    let array = array_data(&object, id)?;
    let indices = session.decode_arguments(indices)?;
    let items = {
        let elements = array.elements().lock();
        indices
            .iter()
            .map(|index| {
                let index = expect_int(index, "array index")?;
                Ok(elements[checked_index(index, elements.len())?].clone())
            })
            .collect::<GatewayResult<Vec<_>>>()?
    };
    let sliced = session
        .gateway()
        .classes()
        .new_array(array.component().clone(), items);
    Ok(session.return_object(sliced.into()).into())
}

fn len(session: &Session, operands: &[String]) -> GatewayResult<Response> {
    let [id] = operands else {
        return Err(arity(LEN, 1, operands.len()));
    };
    let object = session.object(id)?;
    let len = array_data(&object, id)?.len();
    Ok(ReturnObject::Primitive((len as i32).into()).into())
}

fn create(session: &Session, operands: &[String]) -> GatewayResult<Response> {
    let mut values = session.decode_arguments(operands)?.into_iter();
    let type_name = match values.next() {
        Some(value) => expect_string(value, "array type")?,
        None => return Err(arity(CREATE, 1, 0)),
    };
    let dimensions = values
        .map(|d| expect_int(&d, "array dimension"))
        .collect::<GatewayResult<Vec<_>>>()?;
    let array = session.gateway().engine().create_array(&type_name, &dimensions)?;
    Ok(session.return_object(array.into()).into())
}

fn arity(sub: &str, expected: usize, got: usize) -> GatewayError {
    GatewayError::Protocol(format!(
        "array sub-command '{}' takes {} operands, got {}",
        sub, expected, got
    ))
}

impl Command for ArrayCommand {
    fn name(&self) -> &'static str {
        ARRAY_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(sub = %sub, operands = operands.len(), "array");

        let result = match sub.as_str() {
            GET => get(ctx.session, &operands),
            SET => set(ctx.session, &operands),
            SLICE => slice(ctx.session, &operands),
            LEN => len(ctx.session, &operands),
            CREATE => create(ctx.session, &operands),
            other => return Err(unknown_subcommand(ARRAY_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn test_create_set_get() {
        let session = session();
        let (_, out) = run(&ArrayCommand, &session, &["c", "sint", "i3", "e"]);
        assert_eq!(out, "!yto0\n");

        let (_, out) = run(&ArrayCommand, &session, &["e", "o0", "e"]);
        assert_eq!(out, "!yi3\n");

        let (_, out) = run(&ArrayCommand, &session, &["s", "o0", "i1", "i9", "e"]);
        assert_eq!(out, "!yv\n");
        let (_, out) = run(&ArrayCommand, &session, &["g", "o0", "i1", "e"]);
        assert_eq!(out, "!yi9\n");
        let (_, out) = run(&ArrayCommand, &session, &["g", "o0", "i0", "e"]);
        assert_eq!(out, "!yi0\n");
    }

    #[test]
    fn test_set_converts_to_component() {
        let session = session();
        run(&ArrayCommand, &session, &["c", "sgate.lang.String", "i1", "e"]);
        let (_, out) = run(&ArrayCommand, &session, &["s", "o0", "i0", "i4", "e"]);
        assert!(out.starts_with("!xsReflectionError"));
        let (_, out) = run(&ArrayCommand, &session, &["s", "o0", "i0", "sok", "e"]);
        assert_eq!(out, "!yv\n");
    }

    #[test]
    fn test_slice_keeps_request_order() {
        let session = session();
        let (_, out) = run(&ArrayCommand, &session, &["c", "sint", "i4", "e"]);
        assert_eq!(out, "!yto0\n");
        for i in 0..4 {
            let index = format!("i{}", i);
            let value = format!("i{}", i * 10);
            run(&ArrayCommand, &session, &["s", "o0", &index, &value, "e"]);
        }
        let (_, out) = run(&ArrayCommand, &session, &["l", "o0", "i3", "i1", "e"]);
        assert_eq!(out, "!yto1\n");
        let (_, out) = run(&ArrayCommand, &session, &["g", "o1", "i0", "e"]);
        assert_eq!(out, "!yi30\n");
        let (_, out) = run(&ArrayCommand, &session, &["g", "o1", "i1", "e"]);
        assert_eq!(out, "!yi10\n");
    }

    #[test]
    fn test_out_of_bounds_is_recoverable() {
        let session = session();
        run(&ArrayCommand, &session, &["c", "sint", "i2", "e"]);
        let (outcome, out) = run(&ArrayCommand, &session, &["g", "o0", "i5", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert!(out.starts_with("!xsGatewayError"));
    }
}
