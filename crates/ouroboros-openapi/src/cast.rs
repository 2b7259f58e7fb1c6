//! Type casting
//!
//! Converts raw wire values (usually strings from query parameters, headers or
//! form fields) into the primitive representation of a schema's `type`. Casting
//! ignores `format`; format-aware conversion happens in the unmarshaller.

use crate::errors::CastError;
use crate::schema::{Schema, SchemaType};
use crate::types::Value;

/// Cast `value` to the primitive type declared by `schema`
///
/// `null` is returned unchanged. `string`, `object` and untyped schemas pass
/// the value through.
///
/// # Example
///
/// ```
/// use ouroboros_openapi::{cast, Schema, Value};
///
/// let schema = Schema::array(Schema::integer());
/// let raw = Value::List(vec![Value::string("1"), Value::string(" 2 ")]);
///
/// assert_eq!(cast(&schema, raw).unwrap(), Value::List(vec![Value::Int(1), Value::Int(2)]));
/// assert!(cast(&Schema::integer(), Value::string("abc")).is_err());
/// ```
pub fn cast(schema: &Schema, value: Value) -> Result<Value, CastError> {
    if value.is_null() {
        return Ok(value);
    }

    match schema.schema_type {
        SchemaType::Integer => cast_integer(value),
        SchemaType::Number => cast_number(value),
        SchemaType::Boolean => cast_boolean(value),
        SchemaType::Array => cast_array(schema, value),
        SchemaType::String | SchemaType::Object | SchemaType::Any => Ok(value),
    }
}

/// Cast a possibly-absent value; absence is preserved
pub fn cast_optional(schema: &Schema, value: Option<Value>) -> Result<Option<Value>, CastError> {
    value.map(|v| cast(schema, v)).transpose()
}

fn cast_integer(value: Value) -> Result<Value, CastError> {
    let cast = match &value {
        Value::Int(i) => Some(*i),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        // truncates toward zero
        Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    cast.map(Value::Int)
        .ok_or_else(|| CastError::new(value, SchemaType::Integer))
}

fn cast_number(value: Value) -> Result<Value, CastError> {
    let cast = match &value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    cast.map(Value::Float)
        .ok_or_else(|| CastError::new(value, SchemaType::Number))
}

fn cast_boolean(value: Value) -> Result<Value, CastError> {
    let cast = match &value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        _ => None,
    };
    cast.map(Value::Bool)
        .ok_or_else(|| CastError::new(value, SchemaType::Boolean))
}

fn cast_array(schema: &Schema, value: Value) -> Result<Value, CastError> {
    match value {
        Value::List(items) => {
            let Some(item_schema) = schema.items.as_deref() else {
                return Ok(Value::List(items));
            };
            items
                .into_iter()
                .map(|item| cast(item_schema, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        }
        other => Err(CastError::new(other, SchemaType::Array)),
    }
}

/// Parse the usual spellings of a boolean (case-insensitive)
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
