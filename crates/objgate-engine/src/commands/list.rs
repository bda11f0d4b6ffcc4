//! List operations
//!
//! Sub-commands that allocate (`l` slice, `a` concat, `m` multiply) always
//! return a new list; the in-place ones (`s` sort, `r` reverse, `i`
//! in-place multiply) return void.

use std::cmp::Ordering;

use super::{checked_index, expect_int, expect_list, unknown_subcommand, Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{Response, ReturnObject, LIST_COMMAND};
use crate::value::{Object, Value};

const SORT: &str = "s";
const REVERSE: &str = "r";
const MAX: &str = "x";
const MIN: &str = "n";
const SLICE: &str = "l";
const CONCAT: &str = "a";
const MULT: &str = "m";
const IMULT: &str = "i";
const COUNT: &str = "f";

/// `l`: list operations
pub struct ListCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordinal {
    Number,
    Text,
    Char,
    Bool,
}

fn ordinal(value: &Value) -> Option<Ordinal> {
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_) => {
            Some(Ordinal::Number)
        }
        Value::Str(_) => Some(Ordinal::Text),
        Value::Char(_) => Some(Ordinal::Char),
        Value::Bool(_) => Some(Ordinal::Bool),
        _ => None,
    }
}

/// Natural order of two values of the same ordinal kind
fn natural_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Char(x), Value::Char(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = a.as_f64().unwrap_or(f64::NAN);
                let y = b.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
    }
}

/// Fail unless every element shares one ordinal kind
fn ensure_comparable(items: &[Value]) -> GatewayResult<()> {
    let mut kinds = items.iter().map(|v| (v, ordinal(v)));
    let Some((first, expected)) = kinds.next() else {
        return Ok(());
    };
    let Some(expected) = expected else {
        return Err(not_comparable(first));
    };
    match kinds.find(|(_, kind)| *kind != Some(expected)) {
        Some((value, _)) => Err(not_comparable(value)),
        None => Ok(()),
    }
}

fn not_comparable(value: &Value) -> GatewayError {
    GatewayError::Invalid(format!("list element of type {} is not comparable", value.type_name()))
}

fn list_object(session: &Session, id: &str) -> GatewayResult<Object> {
    let object = session.object(id)?;
    expect_list(&object, id)?;
    Ok(object)
}

fn items_of(object: &Object, id: &str) -> GatewayResult<Vec<Value>> {
    Ok(expect_list(object, id)?.lock().clone())
}

fn new_list(session: &Session, items: Vec<Value>) -> Response {
    let list = session.gateway().classes().new_list(items);
    session.return_object(list.into()).into()
}

fn sort(session: &Session, id: &str) -> GatewayResult<Response> {
    let object = list_object(session, id)?;
    let mut items = expect_list(&object, id)?.lock();
    ensure_comparable(&items)?;
    items.sort_by(natural_order);
    Ok(ReturnObject::Void.into())
}

fn reverse(session: &Session, id: &str) -> GatewayResult<Response> {
    let object = list_object(session, id)?;
    expect_list(&object, id)?.lock().reverse();
    Ok(ReturnObject::Void.into())
}

fn extreme(session: &Session, id: &str, wanted: Ordering) -> GatewayResult<Response> {
    let object = list_object(session, id)?;
    let items = items_of(&object, id)?;
    ensure_comparable(&items)?;
    let best = items
        .into_iter()
        .reduce(|best, v| if natural_order(&v, &best) == wanted { v } else { best })
        .ok_or_else(|| GatewayError::Invalid(format!("{} is empty", id)))?;
    Ok(session.return_object(best).into())
}

fn slice(session: &Session, id: &str, indices: &[String]) -> GatewayResult<Response> {
    let object = list_object(session, id)?;
    let items = items_of(&object, id)?;
    let selected = session
        .decode_arguments(indices)?
        .iter()
        .map(|index| {
            let index = expect_int(index, "list index")?;
            Ok(items[checked_index(index, items.len())?].clone())
        })
        .collect::<GatewayResult<Vec<_>>>()?;
    Ok(new_list(session, selected))
}

fn concat(session: &Session, first: &str, second: &str) -> GatewayResult<Response> {
    let mut items = items_of(&list_object(session, first)?, first)?;
    items.extend(items_of(&list_object(session, second)?, second)?);
    Ok(new_list(session, items))
}

fn multiply(session: &Session, id: &str, times: &str) -> GatewayResult<Response> {
    let items = items_of(&list_object(session, id)?, id)?;
    let times = decode_times(session, times)?;
    let len = items.len() * times;
    let repeated = items.into_iter().cycle().take(len).collect();
    Ok(new_list(session, repeated))
}

fn multiply_in_place(session: &Session, id: &str, times: &str) -> GatewayResult<Response> {
    let object = list_object(session, id)?;
    let times = decode_times(session, times)?;
    let mut items = expect_list(&object, id)?.lock();
    if times == 0 {
        items.clear();
    } else {
        let original = items.clone();
        for _ in 1..times {
            items.extend(original.iter().cloned());
        }
    }
    Ok(ReturnObject::Void.into())
}

/// Repeat count; zero or negative means none
fn decode_times(session: &Session, line: &str) -> GatewayResult<usize> {
    let times = expect_int(&crate::protocol::decode(line, session)?, "multiplier")?;
    Ok(times.max(0) as usize)
}

fn count(session: &Session, id: &str, value: &str) -> GatewayResult<Response> {
    let items = items_of(&list_object(session, id)?, id)?;
    let needle = crate::protocol::decode(value, session)?;
    let count = items.iter().filter(|v| **v == needle).count();
    Ok(ReturnObject::Primitive(Value::Int(count as i32)).into())
}

fn arity(sub: &str, got: usize) -> GatewayError {
    GatewayError::Protocol(format!("wrong number of operands for list sub-command '{}': {}", sub, got))
}

impl Command for ListCommand {
    fn name(&self) -> &'static str {
        LIST_COMMAND
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let sub = ctx.read_line()?;
        let operands = ctx.read_operands()?;
        tracing::debug!(sub = %sub, operands = operands.len(), "list");

        let session = ctx.session;
        let result = match (sub.as_str(), operands.as_slice()) {
            (SORT, [id]) => sort(session, id),
            (REVERSE, [id]) => reverse(session, id),
            (MAX, [id]) => extreme(session, id, Ordering::Greater),
            (MIN, [id]) => extreme(session, id, Ordering::Less),
            (SLICE, [id, indices @ ..]) => slice(session, id, indices),
            (CONCAT, [first, second]) => concat(session, first, second),
            (MULT, [id, times]) => multiply(session, id, times),
            (IMULT, [id, times]) => multiply_in_place(session, id, times),
            (COUNT, [id, value]) => count(session, id, value),
            (SORT | REVERSE | MAX | MIN | SLICE | CONCAT | MULT | IMULT | COUNT, _) => {
                return Err(arity(&sub, operands.len()));
            }
            (other, _) => return Err(unknown_subcommand(LIST_COMMAND, other)),
        };
        ctx.respond_result(result)
    }
}
