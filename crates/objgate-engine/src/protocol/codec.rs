//! Value codec
//!
//! A value is one line: a one-character type tag followed by its payload.
//! Strings are escaped so no payload contains a raw line terminator.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::{
    ARRAY_TYPE, BOOLEAN_TYPE, BYTES_TYPE, DECIMAL_TYPE, DOUBLE_TYPE, INFINITY, INTEGER_TYPE,
    ITERATOR_TYPE, LIST_TYPE, LONG_TYPE, MAP_TYPE, NAN, NEGATIVE_INFINITY, NULL_TYPE,
    REFERENCE_TYPE, SET_TYPE, STRING_TYPE, VOID_TYPE,
};
use crate::error::{GatewayError, GatewayResult};
use crate::value::{Object, Value};

/// Turns reference ids into live objects while decoding
pub trait ReferenceResolver {
    /// Look up a referenced object
    fn resolve_reference(&self, id: &str) -> GatewayResult<Object>;
}

/// Escape backslashes and line terminators
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown escapes keep the escaped character.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn encode_double(v: f64) -> String {
    if v.is_nan() {
        NAN.to_string()
    } else if v == f64::INFINITY {
        INFINITY.to_string()
    } else if v == f64::NEG_INFINITY {
        NEGATIVE_INFINITY.to_string()
    } else {
        format!("{:?}", v)
    }
}

/// Encode a value that travels by value. Objects have no value encoding;
/// they must be registered and sent as references.
///
/// The wire has no char, byte, short or float tags. Chars go out as
/// one-character strings, byte and short as ints, float as a double, so
/// decoding the line yields the widened value.
pub fn encode(value: &Value) -> Option<String> {
    let line = match value {
        Value::Null => NULL_TYPE.to_string(),
        Value::Bool(b) => format!("{}{}", BOOLEAN_TYPE, b),
        Value::Char(c) => format!("{}{}", STRING_TYPE, escape(c.encode_utf8(&mut [0u8; 4]))),
        Value::Byte(v) => format!("{}{}", INTEGER_TYPE, v),
        Value::Short(v) => format!("{}{}", INTEGER_TYPE, v),
        Value::Int(v) => format!("{}{}", INTEGER_TYPE, v),
        Value::Long(v) => format!("{}{}", LONG_TYPE, v),
        Value::Float(v) => format!("{}{}", DOUBLE_TYPE, encode_double(*v as f64)),
        Value::Double(v) => format!("{}{}", DOUBLE_TYPE, encode_double(*v)),
        Value::Str(s) => format!("{}{}", STRING_TYPE, escape(s)),
        Value::Bytes(b) => format!("{}{}", BYTES_TYPE, STANDARD.encode(b)),
        Value::Object(_) => return None,
    };
    Some(line)
}

fn malformed(line: &str, what: &str) -> GatewayError {
    GatewayError::Protocol(format!("malformed {} value: {}", what, line))
}

/// Decode one value line. References resolve through `resolver`.
pub fn decode(line: &str, resolver: &dyn ReferenceResolver) -> GatewayResult<Value> {
    let mut chars = line.chars();
    let tag = chars
        .next()
        .ok_or_else(|| GatewayError::Protocol("empty value line".to_string()))?;
    let payload = chars.as_str();

    match tag {
        NULL_TYPE | VOID_TYPE => Ok(Value::Null),
        BOOLEAN_TYPE => Ok(Value::Bool(payload.eq_ignore_ascii_case("true"))),
        INTEGER_TYPE => match payload.parse::<i32>() {
            Ok(v) => Ok(Value::Int(v)),
            // Too large for an int: widen like the client would
            Err(_) => payload
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|_| malformed(line, "integer")),
        },
        LONG_TYPE => payload
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|_| malformed(line, "long")),
        DOUBLE_TYPE => match payload {
            NAN => Ok(Value::Double(f64::NAN)),
            INFINITY => Ok(Value::Double(f64::INFINITY)),
            NEGATIVE_INFINITY => Ok(Value::Double(f64::NEG_INFINITY)),
            _ => payload
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| malformed(line, "double")),
        },
        STRING_TYPE => Ok(Value::Str(unescape(payload))),
        BYTES_TYPE => STANDARD
            .decode(payload)
            .map(Value::Bytes)
            .map_err(|_| malformed(line, "bytes")),
        REFERENCE_TYPE | LIST_TYPE | ARRAY_TYPE | MAP_TYPE | SET_TYPE | ITERATOR_TYPE => {
            resolver.resolve_reference(payload).map(Value::Object)
        }
        // Well-framed but unsupported; the command fails, the connection lives
        DECIMAL_TYPE => Err(GatewayError::Invalid(format!(
            "decimal values are not supported: {}",
            line
        ))),
        other => Err(GatewayError::Protocol(format!("unknown type tag '{}'", other))),
    }
}
