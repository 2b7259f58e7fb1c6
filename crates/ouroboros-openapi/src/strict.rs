//! Strict mode shape checks
//!
//! In strict mode the unmarshaller performs no coercion: `"123"` is not a
//! valid `integer`. A value passes when it already has the schema type's
//! native runtime shape.

use crate::errors::UnmarshalCause;
use crate::schema::SchemaType;
use crate::types::Value;

/// Whether `value` already has the native shape of `schema_type`
///
/// Typed format results (`Date`, `DateTime`, `Uuid`, `Bytes`) count as
/// strings so that unmarshalling an already-converted value is a no-op.
pub fn is_native(schema_type: SchemaType, value: &Value) -> bool {
    match schema_type {
        SchemaType::String => matches!(
            value,
            Value::String(_) | Value::Bytes(_) | Value::Date(_) | Value::DateTime(_) | Value::Uuid(_)
        ),
        SchemaType::Integer => matches!(value, Value::Int(_)),
        SchemaType::Number => matches!(value, Value::Int(_) | Value::Float(_)),
        SchemaType::Boolean => matches!(value, Value::Bool(_)),
        SchemaType::Array => matches!(value, Value::List(_)),
        SchemaType::Object => matches!(value, Value::Object(_)),
        SchemaType::Any => true,
    }
}

/// Fail with `UnmarshalCause::NotNative` unless `value` is native
pub fn ensure_native(schema_type: SchemaType, value: &Value) -> Result<(), UnmarshalCause> {
    if is_native(schema_type, value) {
        Ok(())
    } else {
        Err(UnmarshalCause::NotNative {
            expected: schema_type,
            got: value.type_name(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
