//! Error types
//!
//! Two layers live here. Per-constraint violations (`ValidationError`,
//! collected into `ValidationErrors`) describe exactly what failed inside a
//! single validation call. The terminal error kinds (`CastError`,
//! `InvalidSchemaValue`, `UnmarshalValueError`) are what callers see; raw
//! parse, regex and format failures never escape without being wrapped in one
//! of them.

use std::fmt;

use thiserror::Error;

use crate::schema::SchemaType;
use crate::types::Value;

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Terminal Errors
// ============================================================================

/// Raw value cannot be converted to the schema's primitive type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to cast value {value:?} to type {schema_type}")]
pub struct CastError {
    /// The offending value
    pub value: Value,
    /// Target type
    pub schema_type: SchemaType,
}

impl CastError {
    pub fn new(value: Value, schema_type: SchemaType) -> Self {
        Self { value, schema_type }
    }
}

/// Format-specific validation or conversion failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct FormatError(pub String);

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Value fails one or more structural constraints
#[derive(Error, Debug, Clone)]
#[error("value {value:?} not valid for schema of type {schema_type}: {errors}")]
pub struct InvalidSchemaValue {
    /// The offending value
    pub value: Value,
    /// Declared type of the top-level schema
    pub schema_type: SchemaType,
    /// Every violation found during the call
    pub errors: ValidationErrors,
}

/// Underlying cause of an unmarshalling failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnmarshalCause {
    /// Type-level coercion failed
    #[error(transparent)]
    Cast(#[from] CastError),

    /// Format-level conversion failed
    #[error("format conversion failed: {0}")]
    Format(#[from] FormatError),

    /// Strict mode: value is not already of the schema's native shape
    #[error("strict mode: expected {expected}, got {got}")]
    NotNative {
        /// Declared type
        expected: SchemaType,
        /// Runtime type name of the value
        got: &'static str,
    },
}

/// Conversion failed during unmarshalling
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to unmarshal value {value:?} to type {schema_type}: {cause}")]
pub struct UnmarshalValueError {
    /// The original value
    pub value: Value,
    /// Declared type
    pub schema_type: SchemaType,
    /// What went wrong
    #[source]
    pub cause: UnmarshalCause,
}

impl UnmarshalValueError {
    pub fn new(value: Value, schema_type: SchemaType, cause: impl Into<UnmarshalCause>) -> Self {
        Self {
            value,
            schema_type,
            cause: cause.into(),
        }
    }
}

/// Unified error type for schema operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    InvalidSchemaValue(#[from] InvalidSchemaValue),

    #[error(transparent)]
    Unmarshal(#[from] UnmarshalValueError),

    /// A `pattern` keyword that does not compile
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of constraint violations
///
/// Violations from nested object/array structure and from composed schemas
/// are aggregated here within one validation call.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    /// List of individual violations
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a violation to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Get errors as a slice
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Iterate over the violations
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Whether any violation of the given kind was recorded
    pub fn contains(&self, error_type: ErrorType) -> bool {
        self.errors.iter().any(|e| e.error_type == error_type)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// ============================================================================
// Single Violation
// ============================================================================

/// A single constraint violation
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the offending value (e.g. "user.tags.[2]"), empty at the root
    pub path: String,

    /// Human-readable error message
    pub message: String,

    /// Which constraint failed
    pub error_type: ErrorType,

    /// The offending value
    pub value: Value,

    /// Declared type of the schema that rejected the value
    pub schema_type: SchemaType,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "{}: {} [{}]", path, self.message, self.error_type)
    }
}

// ============================================================================
// Error Type Classification
// ============================================================================

/// The constraint a violation failed, named after its OpenAPI keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Runtime shape does not match `type` (includes null on non-nullable)
    Type,
    Enum,
    Format,
    Minimum,
    Maximum,
    MultipleOf,
    MinLength,
    MaxLength,
    Pattern,
    MinItems,
    MaxItems,
    UniqueItems,
    MinProperties,
    MaxProperties,
    Required,
    AdditionalProperties,
    /// Zero or more than one `oneOf` branch matched
    OneOf,
}

impl ErrorType {
    /// OpenAPI keyword for this constraint
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Enum => "enum",
            Self::Format => "format",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::MultipleOf => "multipleOf",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::MinItems => "minItems",
            Self::MaxItems => "maxItems",
            Self::UniqueItems => "uniqueItems",
            Self::MinProperties => "minProperties",
            Self::MaxProperties => "maxProperties",
            Self::Required => "required",
            Self::AdditionalProperties => "additionalProperties",
            Self::OneOf => "oneOf",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ============================================================================
// Validation Context
// ============================================================================

/// Tracks the current location while descending into nested values
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Current path segments
    pub path: Vec<String>,
}

impl ValidationContext {
    /// Create a new validation context rooted at the top-level value
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with an initial location (e.g. "body", "query.limit")
    pub fn with_location(location: &str) -> Self {
        Self {
            path: vec![location.to_string()],
        }
    }

    /// Push a property name or item index onto the path
    pub fn push(&mut self, segment: &str) {
        self.path.push(segment.to_string());
    }

    /// Pop the last segment
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Get the current path as a string (e.g. "body.user.address")
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Build a violation at the current path
    pub fn error(
        &self,
        error_type: ErrorType,
        schema_type: SchemaType,
        value: &Value,
        message: String,
    ) -> ValidationError {
        ValidationError {
            path: self.current_path(),
            message,
            error_type,
            value: value.clone(),
            schema_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_empty() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
    }

    #[test]
    fn test_validation_errors_add() {
        let ctx = ValidationContext::with_location("age");
        let mut errors = ValidationErrors::new();
        errors.add(ctx.error(
            ErrorType::Type,
            SchemaType::Integer,
            &Value::string("x"),
            "Expected integer".to_string(),
        ));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(ErrorType::Type));
        assert!(!errors.contains(ErrorType::Enum));
        assert_eq!(errors.as_slice()[0].path, "age");
    }

    #[test]
    fn test_validation_context() {
        let mut ctx = ValidationContext::new();
        assert_eq!(ctx.current_path(), "");

        ctx.push("user");
        ctx.push("tags");
        ctx.push("[1]");
        assert_eq!(ctx.current_path(), "user.tags.[1]");

        ctx.pop();
        assert_eq!(ctx.current_path(), "user.tags");
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Type.to_string(), "type");
        assert_eq!(ErrorType::MultipleOf.to_string(), "multipleOf");
        assert_eq!(ErrorType::AdditionalProperties.to_string(), "additionalProperties");
    }

    #[test]
    fn test_unmarshal_error_wraps_cast_error() {
        let cast = CastError::new(Value::string("abc"), SchemaType::Integer);
        let err = UnmarshalValueError::new(Value::string("abc"), SchemaType::Integer, cast.clone());
        assert_eq!(err.cause, UnmarshalCause::Cast(cast));
        assert!(err.to_string().contains("integer"));
    }
}
