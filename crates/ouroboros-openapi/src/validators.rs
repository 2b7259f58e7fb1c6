//! Constraint validation engine
//!
//! Checks a value against a `Schema` and reports every violation found,
//! descending into object properties, array items and `allOf` / `oneOf`
//! children. Validation never converts the value; run the unmarshaller
//! separately when typed output is needed.

use tracing::debug;

use crate::config::SchemaConfig;
use crate::constraints::{ArrayConstraints, NumericConstraints, ObjectConstraints, StringConstraints};
use crate::errors::{ErrorType, InvalidSchemaValue, ValidationContext, ValidationErrors};
use crate::formats::FormatRegistry;
use crate::schema::{AdditionalProperties, Schema};
use crate::strict;
use crate::types::Value;

// ============================================================================
// Public API
// ============================================================================

/// Validates values against schemas using a fixed format table
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    formats: FormatRegistry,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaValidator {
    /// Validator using built-in formats overridden by the config's custom ones
    pub fn new(config: &SchemaConfig) -> Self {
        Self::with_registry(config.registry())
    }

    /// Validator using built-in formats only
    pub fn builtin() -> Self {
        Self::with_registry(FormatRegistry::builtin())
    }

    pub fn with_registry(formats: FormatRegistry) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Validate a value against a schema
    ///
    /// This is the main entry point. All violations are collected and
    /// returned together inside a single `InvalidSchemaValue`.
    ///
    /// # Example
    ///
    /// ```
    /// use ouroboros_openapi::{Schema, SchemaValidator, Value, ErrorType};
    ///
    /// let schema = Schema::integer().minimum(1.0).maximum(10.0);
    /// let validator = SchemaValidator::builtin();
    ///
    /// assert!(validator.validate(&schema, &Value::Int(5)).is_ok());
    ///
    /// let err = validator.validate(&schema, &Value::Int(15)).unwrap_err();
    /// assert_eq!(err.errors.len(), 1);
    /// assert_eq!(err.errors.as_slice()[0].error_type, ErrorType::Maximum);
    /// ```
    pub fn validate(&self, schema: &Schema, value: &Value) -> Result<(), InvalidSchemaValue> {
        let mut ctx = ValidationContext::new();
        self.validate_with_context(schema, value, &mut ctx)
    }

    /// Validate with a caller-provided context (e.g. rooted at "query.limit")
    pub fn validate_with_context(
        &self,
        schema: &Schema,
        value: &Value,
        ctx: &mut ValidationContext,
    ) -> Result<(), InvalidSchemaValue> {
        let mut errors = ValidationErrors::new();
        self.validate_value(schema, value, ctx, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(
                "Value rejected by {} schema at '{}': {} violation(s)",
                schema.schema_type,
                ctx.current_path(),
                errors.len()
            );
            Err(InvalidSchemaValue {
                value: value.clone(),
                schema_type: schema.schema_type,
                errors,
            })
        }
    }

    /// Collect every violation without wrapping them in an error
    pub fn iter_errors(&self, schema: &Schema, value: &Value) -> ValidationErrors {
        let mut ctx = ValidationContext::new();
        let mut errors = ValidationErrors::new();
        self.validate_value(schema, value, &mut ctx, &mut errors);
        errors
    }

    pub fn is_valid(&self, schema: &Schema, value: &Value) -> bool {
        self.iter_errors(schema, value).is_empty()
    }

    // ========================================================================
    // Core Validation Function
    // ========================================================================

    /// Recursively validate a value, accumulating violations into `errors`
    pub fn validate_value(
        &self,
        schema: &Schema,
        value: &Value,
        ctx: &mut ValidationContext,
        errors: &mut ValidationErrors,
    ) {
        if value.is_null() {
            if !schema.nullable {
                errors.add(ctx.error(
                    ErrorType::Type,
                    schema.schema_type,
                    value,
                    format!("Value cannot be null, expected {}", schema.schema_type),
                ));
            }
            return;
        }

        if !strict::is_native(schema.schema_type, value) {
            errors.add(ctx.error(
                ErrorType::Type,
                schema.schema_type,
                value,
                format!("Expected {}, got {}", schema.schema_type, value.type_name()),
            ));
            return;
        }

        // Typed format values are checked through their wire string so the
        // outcome does not depend on whether unmarshalling already ran.
        let wire = value.canonical_string().map(Value::String);
        let checked = wire.as_ref().unwrap_or(value);

        if let Some(allowed) = &schema.enum_values {
            validate_enum(schema, value, checked, allowed, ctx, errors);
        }

        if let Some(format) = self.formats.resolve(schema) {
            if !(format.validate)(value) {
                errors.add(ctx.error(
                    ErrorType::Format,
                    schema.schema_type,
                    value,
                    format!("Invalid {} format", schema.format.as_deref().unwrap_or_default()),
                ));
            }
        }

        match checked {
            Value::String(s) => validate_string(schema, value, s, &schema.string, ctx, errors),
            Value::Int(_) | Value::Float(_) => {
                validate_numeric(schema, value, &schema.numeric, ctx, errors)
            }
            Value::List(items) => {
                validate_array_bounds(schema, value, items, &schema.array, ctx, errors);
                self.validate_items(schema, items, ctx, errors);
            }
            Value::Object(fields) => {
                validate_object_bounds(schema, value, fields.len(), &schema.object, ctx, errors);
                for name in &schema.object.required {
                    if !fields.contains_key(name) {
                        ctx.push(name);
                        errors.add(ctx.error(
                            ErrorType::Required,
                            schema.schema_type,
                            value,
                            "Field required".to_string(),
                        ));
                        ctx.pop();
                    }
                }
                self.validate_properties(schema, fields, ctx, errors);
            }
            _ => {}
        }

        for subschema in &schema.all_of {
            self.validate_value(subschema, value, ctx, errors);
        }

        if !schema.one_of.is_empty() {
            self.validate_one_of(schema, value, ctx, errors);
        }
    }

    // ========================================================================
    // Recursion
    // ========================================================================

    fn validate_items(
        &self,
        schema: &Schema,
        items: &[Value],
        ctx: &mut ValidationContext,
        errors: &mut ValidationErrors,
    ) {
        let Some(item_schema) = schema.items.as_deref() else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            ctx.push(&format!("[{}]", i));
            self.validate_value(item_schema, item, ctx, errors);
            ctx.pop();
        }
    }

    fn validate_properties(
        &self,
        schema: &Schema,
        fields: &std::collections::BTreeMap<String, Value>,
        ctx: &mut ValidationContext,
        errors: &mut ValidationErrors,
    ) {
        for (name, field_value) in fields {
            ctx.push(name);
            if let Some(property) = schema.properties.get(name) {
                self.validate_value(property, field_value, ctx, errors);
            } else {
                match &schema.additional_properties {
                    AdditionalProperties::Schema(additional) => {
                        self.validate_value(additional, field_value, ctx, errors);
                    }
                    AdditionalProperties::Allowed(false) => {
                        errors.add(ctx.error(
                            ErrorType::AdditionalProperties,
                            schema.schema_type,
                            field_value,
                            format!("Additional property '{}' is not allowed", name),
                        ));
                    }
                    AdditionalProperties::Allowed(true) => {}
                }
            }
            ctx.pop();
        }
    }

    // Zero matches and several matches are reported as the same failure kind.
    fn validate_one_of(
        &self,
        schema: &Schema,
        value: &Value,
        ctx: &mut ValidationContext,
        errors: &mut ValidationErrors,
    ) {
        let matched = schema
            .one_of
            .iter()
            .filter(|subschema| {
                let mut branch_ctx = ctx.clone();
                let mut branch_errors = ValidationErrors::new();
                self.validate_value(subschema, value, &mut branch_ctx, &mut branch_errors);
                branch_errors.is_empty()
            })
            .count();

        if matched == 1 {
            return;
        }

        let message = if matched == 0 {
            format!(
                "Value does not match any of the {} oneOf schemas",
                schema.one_of.len()
            )
        } else {
            format!("Value matches {} oneOf schemas, expected exactly one", matched)
        };
        errors.add(ctx.error(ErrorType::OneOf, schema.schema_type, value, message));
    }
}

// ============================================================================
// Enum
// ============================================================================

fn validate_enum(
    schema: &Schema,
    value: &Value,
    checked: &Value,
    allowed: &[Value],
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if allowed
        .iter()
        .any(|candidate| candidate.json_eq(value) || candidate.json_eq(checked))
    {
        return;
    }

    let formatted: Vec<String> = allowed
        .iter()
        .map(|v| match v {
            Value::String(s) => format!("\"{}\"", s),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => format!("{:?}", v),
        })
        .collect();

    errors.add(ctx.error(
        ErrorType::Enum,
        schema.schema_type,
        value,
        format!("Value must be one of: [{}]", formatted.join(", ")),
    ));
}

// ============================================================================
// String Validation
// ============================================================================

fn validate_string(
    schema: &Schema,
    value: &Value,
    s: &str,
    constraints: &StringConstraints,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    // Length is measured in characters, not bytes
    let char_count = s.chars().count();

    if let Some(min) = constraints.min_length {
        if char_count < min {
            errors.add(ctx.error(
                ErrorType::MinLength,
                schema.schema_type,
                value,
                format!("String must be at least {} characters (got {})", min, char_count),
            ));
        }
    }

    if let Some(max) = constraints.max_length {
        if char_count > max {
            errors.add(ctx.error(
                ErrorType::MaxLength,
                schema.schema_type,
                value,
                format!("String must be at most {} characters (got {})", max, char_count),
            ));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_match(s) {
            errors.add(ctx.error(
                ErrorType::Pattern,
                schema.schema_type,
                value,
                format!("String does not match pattern: {}", pattern.as_str()),
            ));
        }
    }
}

// ============================================================================
// Numeric Validation
// ============================================================================

fn validate_numeric(
    schema: &Schema,
    value: &Value,
    constraints: &NumericConstraints,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if constraints.is_empty() {
        return;
    }
    let Some(num) = value.as_f64() else {
        return;
    };

    if let Some(min) = constraints.minimum {
        if constraints.exclusive_minimum && num <= min {
            errors.add(ctx.error(
                ErrorType::Minimum,
                schema.schema_type,
                value,
                format!("Value must be > {} (got {})", min, num),
            ));
        } else if num < min {
            errors.add(ctx.error(
                ErrorType::Minimum,
                schema.schema_type,
                value,
                format!("Value must be >= {} (got {})", min, num),
            ));
        }
    }

    if let Some(max) = constraints.maximum {
        if constraints.exclusive_maximum && num >= max {
            errors.add(ctx.error(
                ErrorType::Maximum,
                schema.schema_type,
                value,
                format!("Value must be < {} (got {})", max, num),
            ));
        } else if num > max {
            errors.add(ctx.error(
                ErrorType::Maximum,
                schema.schema_type,
                value,
                format!("Value must be <= {} (got {})", max, num),
            ));
        }
    }

    if let Some(multiple) = constraints.multiple_of {
        if !is_multiple_of(value, multiple) {
            errors.add(ctx.error(
                ErrorType::MultipleOf,
                schema.schema_type,
                value,
                format!("Value must be a multiple of {}", multiple),
            ));
        }
    }
}

fn is_multiple_of(value: &Value, multiple: f64) -> bool {
    if multiple == 0.0 {
        return true;
    }
    match value {
        // Exact arithmetic when both sides are whole numbers
        Value::Int(n) if multiple.fract() == 0.0 && multiple.abs() < i64::MAX as f64 => {
            n.checked_rem(multiple as i64).map_or(true, |r| r == 0)
        }
        _ => {
            let num = value.as_f64().unwrap_or_default();
            let remainder = (num % multiple).abs();
            let tolerance = multiple.abs() * 0.0001;
            remainder <= tolerance || (multiple.abs() - remainder).abs() <= tolerance
        }
    }
}

// ============================================================================
// Array / Object Bounds
// ============================================================================

fn validate_array_bounds(
    schema: &Schema,
    value: &Value,
    items: &[Value],
    constraints: &ArrayConstraints,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if let Some(min) = constraints.min_items {
        if items.len() < min {
            errors.add(ctx.error(
                ErrorType::MinItems,
                schema.schema_type,
                value,
                format!("Array must have at least {} items (got {})", min, items.len()),
            ));
        }
    }

    if let Some(max) = constraints.max_items {
        if items.len() > max {
            errors.add(ctx.error(
                ErrorType::MaxItems,
                schema.schema_type,
                value,
                format!("Array must have at most {} items (got {})", max, items.len()),
            ));
        }
    }

    if constraints.unique_items {
        let duplicate = items
            .iter()
            .enumerate()
            .find(|(i, item)| items[..*i].iter().any(|earlier| earlier.json_eq(item)));
        if let Some((i, _)) = duplicate {
            errors.add(ctx.error(
                ErrorType::UniqueItems,
                schema.schema_type,
                value,
                format!("Array contains duplicate value at index {}", i),
            ));
        }
    }
}

fn validate_object_bounds(
    schema: &Schema,
    value: &Value,
    count: usize,
    constraints: &ObjectConstraints,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if let Some(min) = constraints.min_properties {
        if count < min {
            errors.add(ctx.error(
                ErrorType::MinProperties,
                schema.schema_type,
                value,
                format!("Object must have at least {} properties (got {})", min, count),
            ));
        }
    }

    if let Some(max) = constraints.max_properties {
        if count > max {
            errors.add(ctx.error(
                ErrorType::MaxProperties,
                schema.schema_type,
                value,
                format!("Object must have at most {} properties (got {})", max, count),
            ));
        }
    }
}
