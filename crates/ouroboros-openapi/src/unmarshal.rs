//! Unmarshalling
//!
//! Turns wire values into typed values for a schema. Per node the unmarshaller
//! either applies the registered format conversion (after a strict shape check
//! or a lenient cast) or falls back to plain type casting, descending into
//! object properties and array items along the way.
//!
//! Constraints (`enum`, bounds, `required`) are not checked here. Callers that
//! need both run `SchemaValidator` as a separate step.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cast;
use crate::config::SchemaConfig;
use crate::errors::{CastError, UnmarshalCause, UnmarshalValueError};
use crate::formats::{Format, FormatRegistry};
use crate::schema::{AdditionalProperties, Schema, SchemaType};
use crate::strict;
use crate::types::Value;
use crate::validators::SchemaValidator;

/// Converts raw values into typed values according to a schema
#[derive(Debug, Clone)]
pub struct SchemaUnmarshaller {
    formats: FormatRegistry,
    strict: bool,
    // Picks the matching branch of an untyped `oneOf`
    validator: SchemaValidator,
}

impl Default for SchemaUnmarshaller {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}

impl SchemaUnmarshaller {
    /// Unmarshaller using the config's formats and strictness
    pub fn new(config: &SchemaConfig) -> Self {
        let formats = config.registry();
        Self {
            validator: SchemaValidator::with_registry(formats.clone()),
            formats,
            strict: config.strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Unmarshal using the configured strictness
    ///
    /// # Example
    ///
    /// ```
    /// use ouroboros_openapi::{Schema, SchemaConfig, SchemaUnmarshaller, Value};
    ///
    /// let schema = Schema::object().property("a", Schema::array(Schema::integer()));
    /// let raw = Value::object([("a", Value::List(vec![Value::string("1"), Value::string("2")]))]);
    ///
    /// let lenient = SchemaUnmarshaller::new(&SchemaConfig::new().lenient());
    /// let typed = lenient.unmarshal(&schema, raw.clone()).unwrap();
    /// assert_eq!(typed, Value::object([("a", Value::List(vec![Value::Int(1), Value::Int(2)]))]));
    ///
    /// let strict = SchemaUnmarshaller::new(&SchemaConfig::new());
    /// assert!(strict.unmarshal(&schema, raw).is_err());
    /// ```
    pub fn unmarshal(&self, schema: &Schema, value: Value) -> Result<Value, UnmarshalValueError> {
        self.unmarshal_with(schema, value, self.strict)
    }

    /// Unmarshal with an explicit strictness for this call
    pub fn unmarshal_with(
        &self,
        schema: &Schema,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        self.unmarshal_value(schema, value, strict).map_err(|err| {
            debug!("Failed to unmarshal {} value: {}", schema.schema_type, err);
            err
        })
    }

    /// Unmarshal a possibly-absent value
    ///
    /// An absent value takes the schema default when one is configured
    /// (a `null` default yields `Some(Value::Null)`); otherwise it stays absent.
    pub fn unmarshal_optional(
        &self,
        schema: &Schema,
        value: Option<Value>,
    ) -> Result<Option<Value>, UnmarshalValueError> {
        match value.or_else(|| schema.default.clone()) {
            Some(value) => self.unmarshal(schema, value).map(Some),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn unmarshal_value(
        &self,
        schema: &Schema,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        if value.is_null() {
            return Ok(value);
        }

        if let Some(format) = self.formats.resolve(schema) {
            return self.unmarshal_format(schema, format, value, strict);
        }

        match schema.schema_type {
            SchemaType::Object => self.unmarshal_object(schema, value, strict),
            SchemaType::Array => self.unmarshal_array(schema, value, strict),
            SchemaType::Any => self.unmarshal_any(schema, value, strict),
            SchemaType::String | SchemaType::Integer | SchemaType::Number | SchemaType::Boolean => {
                coerce(schema, value, strict)
            }
        }
    }

    fn unmarshal_format(
        &self,
        schema: &Schema,
        format: &Format,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        let original = value.clone();
        let value = coerce(schema, value, strict)?;
        (format.unmarshal)(&value)
            .map_err(|err| UnmarshalValueError::new(original, schema.schema_type, err))
    }

    // ========================================================================
    // Containers
    // ========================================================================

    fn unmarshal_object(
        &self,
        schema: &Schema,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(shape_error(SchemaType::Object, other, strict)),
        };

        let all_properties = schema.get_all_properties();
        let mut result = BTreeMap::new();

        for (name, field_value) in fields {
            let unmarshalled = match all_properties.get(name.as_str()) {
                Some(property) => self.unmarshal_value(property, field_value, strict)?,
                None => match &schema.additional_properties {
                    AdditionalProperties::Schema(additional) => {
                        self.unmarshal_value(additional, field_value, strict)?
                    }
                    AdditionalProperties::Allowed(_) => field_value,
                },
            };
            result.insert(name, unmarshalled);
        }

        for (name, property) in &all_properties {
            if result.contains_key(*name) {
                continue;
            }
            if let Some(default) = &property.default {
                let value = self.unmarshal_value(property, default.clone(), strict)?;
                result.insert(name.to_string(), value);
            }
        }

        Ok(Value::Object(result))
    }

    fn unmarshal_array(
        &self,
        schema: &Schema,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(shape_error(SchemaType::Array, other, strict)),
        };

        let Some(item_schema) = schema.items.as_deref() else {
            return Ok(Value::List(items));
        };

        items
            .into_iter()
            .map(|item| self.unmarshal_value(item_schema, item, strict))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    // Untyped schemas: a single matching `oneOf` branch drives conversion,
    // objects composed with `allOf` descend into the merged properties.
    fn unmarshal_any(
        &self,
        schema: &Schema,
        value: Value,
        strict: bool,
    ) -> Result<Value, UnmarshalValueError> {
        if !schema.one_of.is_empty() {
            let matching: Vec<&Schema> = schema
                .one_of
                .iter()
                .filter(|subschema| self.validator.is_valid(subschema, &value))
                .collect();
            if let [only] = matching.as_slice() {
                return self.unmarshal_value(only, value, strict);
            }
            debug!(
                "{} of {} oneOf schemas match, passing value through",
                matching.len(),
                schema.one_of.len()
            );
        }

        if matches!(value, Value::Object(_)) && !schema.get_all_properties().is_empty() {
            return self.unmarshal_object(schema, value, strict);
        }

        Ok(value)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strict: require the native shape. Lenient: cast from the wire form.
fn coerce(schema: &Schema, value: Value, strict: bool) -> Result<Value, UnmarshalValueError> {
    if strict {
        return match strict::ensure_native(schema.schema_type, &value) {
            Ok(()) => Ok(value),
            Err(cause) => Err(UnmarshalValueError::new(value, schema.schema_type, cause)),
        };
    }

    let original = value.clone();
    cast::cast(schema, value)
        .map_err(|err| UnmarshalValueError::new(original, schema.schema_type, err))
}

fn shape_error(schema_type: SchemaType, value: Value, strict: bool) -> UnmarshalValueError {
    let cause = if strict {
        UnmarshalCause::NotNative {
            expected: schema_type,
            got: value.type_name(),
        }
    } else {
        UnmarshalCause::Cast(CastError::new(value.clone(), schema_type))
    };
    UnmarshalValueError::new(value, schema_type, cause)
}
