//! Argument conversion and its cost table
//!
//! [`conversion`] decides whether a runtime argument can be passed to a
//! declared parameter and at what cost. Overload resolution sums these costs;
//! the returned [`TypeConverter`] is applied once a candidate is chosen.

use super::registry::ClassRegistry;
use super::types::{Primitive, TypeDesc, ARRAY_CLASS, OBJECT_CLASS};
use crate::error::ReflectError;
use crate::value::{Payload, Value};

/// Identical types
pub const EXACT_COST: u32 = 0;
/// Unboxing a wire value into a primitive parameter
pub const BOXING_COST: u32 = 1;
/// One step up the numeric widening ladder
pub const WIDENING_COST: u32 = 1;
/// Base cost of a narrowing numeric conversion
pub const NARROWING_COST: u32 = 10;
/// One-character string to `char`
pub const CHAR_CONVERSION_COST: u32 = 1;
/// Cost per inheritance step between argument class and parameter type
pub const DISTANCE_FACTOR: u32 = 100;
/// Element-wise array or list conversion
pub const ARRAY_CONVERSION_COST: u32 = 1_000;
/// Packing trailing arguments into a variable-arity array
pub const VARARGS_COST: u32 = 5_000;
/// Null passed to `gate.lang.Object`; deeper parameter types cost less
pub const NULL_COST: u32 = 10_000;

/// Runtime type of an argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    /// null
    Null,
    /// A scalar wire value
    Primitive(Primitive),
    /// String; `true` when it is exactly one character long
    Str(bool),
    /// byte[]
    Bytes,
    /// Plain object of the named class
    Object(String),
    /// List object of the named class
    List(String),
    /// Array with the given component type
    Array(TypeDesc),
}

impl ArgType {
    /// Runtime type of a value
    pub fn of(value: &Value) -> ArgType {
        match value {
            Value::Null => ArgType::Null,
            Value::Bool(_) => ArgType::Primitive(Primitive::Boolean),
            Value::Char(_) => ArgType::Primitive(Primitive::Char),
            Value::Byte(_) => ArgType::Primitive(Primitive::Byte),
            Value::Short(_) => ArgType::Primitive(Primitive::Short),
            Value::Int(_) => ArgType::Primitive(Primitive::Int),
            Value::Long(_) => ArgType::Primitive(Primitive::Long),
            Value::Float(_) => ArgType::Primitive(Primitive::Float),
            Value::Double(_) => ArgType::Primitive(Primitive::Double),
            Value::Str(s) => ArgType::Str(s.chars().count() == 1),
            Value::Bytes(_) => ArgType::Bytes,
            Value::Object(o) => match o.payload() {
                Payload::List(_) => ArgType::List(o.class().name().to_string()),
                Payload::Array(array) => ArgType::Array(array.component().clone()),
                _ => ArgType::Object(o.class().name().to_string()),
            },
        }
    }

    /// Static view of a declared type, used to compare parameter lists
    pub fn of_desc(desc: &TypeDesc) -> ArgType {
        match desc {
            TypeDesc::Void => ArgType::Null,
            TypeDesc::Primitive(p) | TypeDesc::Boxed(p) => ArgType::Primitive(*p),
            TypeDesc::String => ArgType::Str(false),
            TypeDesc::Object => ArgType::Object(OBJECT_CLASS.to_string()),
            TypeDesc::Class(name) => ArgType::Object(name.clone()),
            TypeDesc::Array(component) => ArgType::Array((**component).clone()),
        }
    }

    /// Display name used in error messages
    pub fn name(&self) -> String {
        match self {
            ArgType::Null => "null".to_string(),
            ArgType::Primitive(p) => p.boxed_name().to_string(),
            ArgType::Str(_) => TypeDesc::String.name(),
            ArgType::Bytes => "byte[]".to_string(),
            ArgType::Object(name) | ArgType::List(name) => name.clone(),
            ArgType::Array(component) => format!("{}[]", component.name()),
        }
    }
}

/// Transformation applied to an argument once its overload is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConverter {
    /// Pass through unchanged
    Identity,
    /// Numeric or character cast to the primitive
    Primitive(Primitive),
    /// Array of bytes to `byte[]`
    ToBytes,
    /// Copy a list or array into a new array of the component type
    ToArray(TypeDesc),
}

/// A possible argument conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Cost contributed to the candidate total
    pub cost: u32,
    /// Whether this is an implicit numeric widening
    pub widening: bool,
    /// How to transform the value
    pub converter: TypeConverter,
}

impl Conversion {
    fn new(cost: u32, converter: TypeConverter) -> Self {
        Self {
            cost,
            widening: false,
            converter,
        }
    }

    fn identity(cost: u32) -> Self {
        Self::new(cost, TypeConverter::Identity)
    }
}

/// Cost of passing an argument of runtime type `arg` to `param`, or `None`
/// when no conversion exists.
pub fn conversion(param: &TypeDesc, arg: &ArgType, classes: &ClassRegistry) -> Option<Conversion> {
    match (param, arg) {
        (TypeDesc::Void, _) => None,

        (TypeDesc::Primitive(_), ArgType::Null) => None,
        (_, ArgType::Null) => {
            let depth = match param {
                TypeDesc::Object => 0,
                TypeDesc::Class(name) => classes.depth(name),
                _ => 1,
            };
            Some(Conversion::identity(NULL_COST.saturating_sub(depth)))
        }

        (TypeDesc::Primitive(p), _) => {
            let mut conv = primitive_conversion(*p, arg)?;
            conv.cost += BOXING_COST;
            Some(conv)
        }
        (TypeDesc::Boxed(p), ArgType::Primitive(a)) if p == a => {
            Some(Conversion::identity(EXACT_COST))
        }
        (TypeDesc::Boxed(Primitive::Char), ArgType::Str(true)) => Some(Conversion::new(
            CHAR_CONVERSION_COST,
            TypeConverter::Primitive(Primitive::Char),
        )),
        (TypeDesc::Boxed(_), _) => None,

        (TypeDesc::String, ArgType::Str(_)) => Some(Conversion::identity(EXACT_COST)),
        (TypeDesc::String, _) => None,

        (TypeDesc::Object, ArgType::Object(name) | ArgType::List(name)) => Some(
            Conversion::identity(classes.depth(name) * DISTANCE_FACTOR),
        ),
        (TypeDesc::Object, _) => Some(Conversion::identity(DISTANCE_FACTOR)),

        (TypeDesc::Class(target), ArgType::Object(name) | ArgType::List(name)) => classes
            .distance(name, target)
            .map(|d| Conversion::identity(d * DISTANCE_FACTOR)),
        (TypeDesc::Class(target), ArgType::Array(_)) if target == ARRAY_CLASS => {
            Some(Conversion::identity(EXACT_COST))
        }
        (TypeDesc::Class(_), _) => None,

        (TypeDesc::Array(component), _) => array_conversion(component, arg, classes),
    }
}

/// Conversion of a scalar argument to a primitive, excluding the boxing cost
fn primitive_conversion(param: Primitive, arg: &ArgType) -> Option<Conversion> {
    let arg = match arg {
        ArgType::Primitive(a) => *a,
        ArgType::Str(true) if param == Primitive::Char => {
            return Some(Conversion::new(
                CHAR_CONVERSION_COST,
                TypeConverter::Primitive(Primitive::Char),
            ));
        }
        _ => return None,
    };

    if arg == param {
        return Some(Conversion::identity(EXACT_COST));
    }

    let (to, from) = (param.numeric_rank()?, arg.numeric_rank()?);
    if to > from {
        // Integral to floating widening keeps the ladder cost
        return Some(Conversion {
            cost: (to - from) * WIDENING_COST,
            widening: true,
            converter: TypeConverter::Primitive(param),
        });
    }

    let narrowing = matches!(
        (arg, param),
        (Primitive::Int, Primitive::Short)
            | (Primitive::Int, Primitive::Byte)
            | (Primitive::Double, Primitive::Float)
    );
    narrowing.then(|| {
        Conversion::new(
            NARROWING_COST + (from - to),
            TypeConverter::Primitive(param),
        )
    })
}

fn array_conversion(
    component: &TypeDesc,
    arg: &ArgType,
    classes: &ClassRegistry,
) -> Option<Conversion> {
    let bytes_param = *component == TypeDesc::Primitive(Primitive::Byte);
    match arg {
        ArgType::Bytes if bytes_param => Some(Conversion::identity(EXACT_COST)),
        ArgType::Array(actual) if actual == component && !bytes_param => {
            Some(Conversion::identity(EXACT_COST))
        }
        ArgType::Array(actual) => {
            let elements_fit = *component == TypeDesc::Object
                || conversion(component, &ArgType::of_desc(actual), classes).is_some();
            elements_fit.then(|| Conversion::new(ARRAY_CONVERSION_COST, array_converter(component)))
        }
        ArgType::List(_) => Some(Conversion::new(
            ARRAY_CONVERSION_COST,
            array_converter(component),
        )),
        _ => None,
    }
}

fn array_converter(component: &TypeDesc) -> TypeConverter {
    if *component == TypeDesc::Primitive(Primitive::Byte) {
        TypeConverter::ToBytes
    } else {
        TypeConverter::ToArray(component.clone())
    }
}

impl TypeConverter {
    /// Apply the conversion
    pub fn convert(&self, value: Value, classes: &ClassRegistry) -> Result<Value, ReflectError> {
        match self {
            TypeConverter::Identity => Ok(value),
            TypeConverter::Primitive(p) => cast(value, *p),
            TypeConverter::ToBytes => {
                let elements = elements_of(&value)?;
                elements
                    .iter()
                    .map(|e| match cast(e.clone(), Primitive::Byte)? {
                        Value::Byte(b) => Ok(b as u8),
                        other => Err(conversion_error(&other, "byte")),
                    })
                    .collect::<Result<Vec<u8>, _>>()
                    .map(Value::Bytes)
            }
            TypeConverter::ToArray(component) => {
                let elements = elements_of(&value)?
                    .into_iter()
                    .map(|e| coerce(e, component, classes))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Object(classes.new_array(component.clone(), elements)))
            }
        }
    }
}

fn elements_of(value: &Value) -> Result<Vec<Value>, ReflectError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes.iter().map(|b| Value::Byte(*b as i8)).collect()),
        Value::Object(o) => match o.payload() {
            Payload::List(items) => Ok(items.lock().clone()),
            Payload::Array(array) => Ok(array.elements().lock().clone()),
            _ => Err(conversion_error(value, "array")),
        },
        _ => Err(conversion_error(value, "array")),
    }
}

fn cast(value: Value, target: Primitive) -> Result<Value, ReflectError> {
    if let (Primitive::Char, Value::Str(s)) = (target, &value) {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Value::Char(c));
        }
    }
    let converted = match target {
        Primitive::Boolean => value.as_bool().map(Value::Bool),
        Primitive::Char => match value {
            Value::Char(c) => Some(Value::Char(c)),
            _ => None,
        },
        Primitive::Byte => value.as_i64().map(|v| Value::Byte(v as i8)),
        Primitive::Short => value.as_i64().map(|v| Value::Short(v as i16)),
        Primitive::Int => value.as_i64().map(|v| Value::Int(v as i32)),
        Primitive::Long => value.as_i64().map(Value::Long),
        Primitive::Float => value.as_f64().map(|v| Value::Float(v as f32)),
        Primitive::Double => value.as_f64().map(Value::Double),
    };
    converted.ok_or_else(|| conversion_error(&value, target.name()))
}

fn conversion_error(value: &Value, to: &str) -> ReflectError {
    ReflectError::Conversion {
        from: value.type_name(),
        to: to.to_string(),
    }
}

/// Convert a single value to a declared type, as done for field and array
/// element writes.
pub fn coerce(value: Value, ty: &TypeDesc, classes: &ClassRegistry) -> Result<Value, ReflectError> {
    match conversion(ty, &ArgType::of(&value), classes) {
        Some(conv) => conv.converter.convert(value, classes),
        None => Err(ReflectError::Conversion {
            from: value.type_name(),
            to: ty.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(param: TypeDesc, arg: ArgType) -> Option<u32> {
        let classes = ClassRegistry::new();
        conversion(&param, &arg, &classes).map(|c| c.cost)
    }

    #[test]
    fn test_exact_and_boxing_costs() {
        let int = ArgType::Primitive(Primitive::Int);
        assert_eq!(cost(TypeDesc::Boxed(Primitive::Int), int.clone()), Some(0));
        assert_eq!(cost(TypeDesc::int(), int.clone()), Some(BOXING_COST));
        assert_eq!(cost(TypeDesc::long(), int.clone()), Some(BOXING_COST + WIDENING_COST));
        assert_eq!(cost(TypeDesc::Boxed(Primitive::Long), int), None);
    }

    #[test]
    fn test_narrowing_is_penalised() {
        let int = ArgType::Primitive(Primitive::Int);
        let short = cost(TypeDesc::Primitive(Primitive::Short), int.clone()).unwrap();
        let long = cost(TypeDesc::long(), int.clone()).unwrap();
        assert!(short > long);
        assert_eq!(cost(TypeDesc::Primitive(Primitive::Short), ArgType::Primitive(Primitive::Long)), None);
    }

    #[test]
    fn test_null_and_primitives() {
        assert_eq!(cost(TypeDesc::int(), ArgType::Null), None);
        let to_object = cost(TypeDesc::Object, ArgType::Null).unwrap();
        let to_string = cost(TypeDesc::String, ArgType::Null).unwrap();
        assert!(to_string < to_object);
    }

    #[test]
    fn test_char_from_single_char_string() {
        assert_eq!(
            cost(TypeDesc::Primitive(Primitive::Char), ArgType::Str(true)),
            Some(CHAR_CONVERSION_COST + BOXING_COST)
        );
        assert_eq!(cost(TypeDesc::Primitive(Primitive::Char), ArgType::Str(false)), None);
    }

    #[test]
    fn test_coerce_casts_numbers() {
        let classes = ClassRegistry::new();
        let v = coerce(Value::Int(7), &TypeDesc::double(), &classes).unwrap();
        assert_eq!(v, Value::Double(7.0));
        let err = coerce(Value::Str("x".into()), &TypeDesc::int(), &classes).unwrap_err();
        assert!(matches!(err, ReflectError::Conversion { .. }));
    }

    #[test]
    fn test_list_to_array_conversion() {
        let classes = ClassRegistry::new();
        let list = classes.new_list(vec![Value::Int(1), Value::Int(2)]);
        let converted = coerce(Value::Object(list), &TypeDesc::long().array_of(), &classes).unwrap();
        let array = converted.as_object().unwrap().as_array().unwrap();
        assert_eq!(*array.elements().lock(), vec![Value::Long(1), Value::Long(2)]);
    }
}
