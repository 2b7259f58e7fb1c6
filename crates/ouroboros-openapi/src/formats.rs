//! Format registry
//!
//! A `format` keyword refines a schema `type` (e.g. `string` + `date-time`).
//! Each known `(type, format)` pair maps to a `Format`: a pair of plain
//! functions, one to check a raw value and one to convert it into its typed
//! form. The registry is filled once (built-ins, then caller overrides) and is
//! only read afterwards.

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use crate::errors::FormatError;
use crate::schema::{Schema, SchemaType};
use crate::types::Value;

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

// ============================================================================
// Format Capability
// ============================================================================

/// Checks whether a value is acceptable for the format
pub type ValidateFn = fn(&Value) -> bool;

/// Converts a value into the format's typed representation
pub type UnmarshalFn = fn(&Value) -> Result<Value, FormatError>;

/// Capability pair bound to a `(type, format)` key
#[derive(Clone, Copy)]
pub struct Format {
    pub validate: ValidateFn,
    pub unmarshal: UnmarshalFn,
}

impl Format {
    pub fn new(validate: ValidateFn, unmarshal: UnmarshalFn) -> Self {
        Self { validate, unmarshal }
    }

    /// A format that only validates; unmarshalling returns the value as-is
    pub fn validate_only(validate: ValidateFn) -> Self {
        Self::new(validate, identity)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format").finish_non_exhaustive()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Lookup table from `(type, format)` to `Format`
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<SchemaType, HashMap<String, Format>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in OpenAPI formats
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(SchemaType::Integer, "int32", Format::new(is_int32, to_int32));
        registry.insert(SchemaType::Integer, "int64", Format::validate_only(is_int));
        registry.insert(SchemaType::Number, "float", Format::new(is_number, to_float));
        registry.insert(SchemaType::Number, "double", Format::new(is_number, to_float));
        registry.insert(SchemaType::String, "date", Format::new(is_date, to_date));
        registry.insert(SchemaType::String, "date-time", Format::new(is_datetime, to_datetime));
        registry.insert(SchemaType::String, "uuid", Format::new(is_uuid, to_uuid));
        registry.insert(SchemaType::String, "byte", Format::new(is_byte, to_byte));
        registry.insert(SchemaType::String, "binary", Format::new(is_binary, to_binary));
        registry.insert(SchemaType::String, "email", Format::validate_only(is_email));
        registry.insert(SchemaType::String, "password", Format::validate_only(is_string));
        registry.insert(SchemaType::String, "ipv4", Format::validate_only(is_ipv4));
        registry.insert(SchemaType::String, "ipv6", Format::validate_only(is_ipv6));
        registry
    }

    fn insert(&mut self, schema_type: SchemaType, name: &str, format: Format) -> Option<Format> {
        self.formats
            .entry(schema_type)
            .or_default()
            .insert(name.to_string(), format)
    }

    /// Register a format, fully replacing any existing entry for the key
    pub fn register(
        &mut self,
        schema_type: SchemaType,
        name: impl Into<String>,
        format: Format,
    ) -> Option<Format> {
        let name = name.into();
        let previous = self.insert(schema_type, &name, format);
        if previous.is_some() {
            debug!("Format {}/{} overridden", schema_type, name);
        }
        previous
    }

    /// Copy every entry of `other` into this registry, overriding on conflict
    pub fn extend(&mut self, other: &FormatRegistry) {
        for (schema_type, formats) in &other.formats {
            for (name, format) in formats {
                self.register(*schema_type, name.clone(), *format);
            }
        }
    }

    /// Look up a format
    pub fn get(&self, schema_type: SchemaType, name: &str) -> Option<&Format> {
        self.formats.get(&schema_type)?.get(name)
    }

    /// Look up the format a schema declares, if it is registered
    pub fn resolve(&self, schema: &Schema) -> Option<&Format> {
        let name = schema.format.as_deref()?;
        let format = self.get(schema.schema_type, name);
        if format.is_none() {
            debug!("No format registered for {}/{}, using type casting", schema.schema_type, name);
        }
        format
    }

    pub fn contains(&self, schema_type: SchemaType, name: &str) -> bool {
        self.get(schema_type, name).is_some()
    }

    /// Number of registered formats
    pub fn len(&self) -> usize {
        self.formats.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Built-in Validators
// ============================================================================

fn is_int(value: &Value) -> bool {
    matches!(value, Value::Int(_))
}

fn is_int32(value: &Value) -> bool {
    matches!(value, Value::Int(i) if i32::try_from(*i).is_ok())
}

fn is_number(value: &Value) -> bool {
    value.as_f64().is_some()
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

/// Validate date format (YYYY-MM-DD)
///
/// # Example
/// ```
/// use ouroboros_openapi::formats::validate_date;
///
/// assert!(validate_date("2024-01-19"));
/// assert!(!validate_date("2024-02-30"));
/// assert!(!validate_date("01/19/2024"));
/// ```
pub fn validate_date(value: &str) -> bool {
    parse_date(value).is_ok()
}

/// Validate RFC 3339 date-time format
///
/// # Example
/// ```
/// use ouroboros_openapi::formats::validate_datetime;
///
/// assert!(validate_datetime("2024-01-19T12:00:00Z"));
/// assert!(validate_datetime("2024-01-19T12:00:00.123456789+08:00"));
/// assert!(!validate_datetime("2024-01-19 12:00"));
/// ```
pub fn validate_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
}

/// Validate email format
///
/// # Example
/// ```
/// use ouroboros_openapi::formats::validate_email;
///
/// assert!(validate_email("user@example.com"));
/// assert!(!validate_email("invalid-email"));
/// ```
pub fn validate_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

fn is_date(value: &Value) -> bool {
    match value {
        Value::String(s) => validate_date(s),
        Value::Date(_) => true,
        _ => false,
    }
}

fn is_datetime(value: &Value) -> bool {
    match value {
        Value::String(s) => validate_datetime(s),
        Value::DateTime(_) => true,
        _ => false,
    }
}

fn is_uuid(value: &Value) -> bool {
    match value {
        Value::String(s) => Uuid::parse_str(s).is_ok(),
        Value::Uuid(_) => true,
        _ => false,
    }
}

fn is_byte(value: &Value) -> bool {
    match value {
        Value::String(s) => BASE64.decode(s).is_ok(),
        Value::Bytes(_) => true,
        _ => false,
    }
}

fn is_binary(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Bytes(_))
}

fn is_email(value: &Value) -> bool {
    matches!(value, Value::String(s) if validate_email(s))
}

fn is_ipv4(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.parse::<Ipv4Addr>().is_ok())
}

fn is_ipv6(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.parse::<Ipv6Addr>().is_ok())
}

// ============================================================================
// Built-in Unmarshallers
// ============================================================================

fn identity(value: &Value) -> Result<Value, FormatError> {
    Ok(value.clone())
}

fn unexpected(format: &str, value: &Value) -> FormatError {
    FormatError::new(format!("{} format cannot convert {}", format, value.type_name()))
}

fn parse_date(s: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| FormatError::new(format!("invalid date {:?}: {}", s, e)))
}

fn to_int32(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::Int(i) if i32::try_from(*i).is_ok() => Ok(Value::Int(*i)),
        Value::Int(i) => Err(FormatError::new(format!("{} out of int32 range", i))),
        other => Err(unexpected("int32", other)),
    }
}

fn to_float(value: &Value) -> Result<Value, FormatError> {
    value
        .as_f64()
        .map(Value::Float)
        .ok_or_else(|| unexpected("float", value))
}

fn to_date(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => parse_date(s).map(Value::Date),
        Value::Date(d) => Ok(Value::Date(*d)),
        other => Err(unexpected("date", other)),
    }
}

fn to_datetime(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(Value::DateTime)
            .map_err(|e| FormatError::new(format!("invalid date-time {:?}: {}", s, e))),
        Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
        other => Err(unexpected("date-time", other)),
    }
}

fn to_uuid(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => Uuid::parse_str(s)
            .map(Value::Uuid)
            .map_err(|e| FormatError::new(format!("invalid uuid {:?}: {}", s, e))),
        Value::Uuid(u) => Ok(Value::Uuid(*u)),
        other => Err(unexpected("uuid", other)),
    }
}

fn to_byte(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => BASE64
            .decode(s)
            .map(Value::Bytes)
            .map_err(|e| FormatError::new(format!("invalid base64: {}", e))),
        Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
        other => Err(unexpected("byte", other)),
    }
}

fn to_binary(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => Ok(Value::Bytes(s.clone().into_bytes())),
        Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
        other => Err(unexpected("binary", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = FormatRegistry::builtin();
        assert!(registry.contains(SchemaType::String, "date"));
        assert!(registry.contains(SchemaType::String, "uuid"));
        assert!(registry.contains(SchemaType::Number, "float"));
        // format names are scoped by type
        assert!(!registry.contains(SchemaType::Integer, "date"));
        assert!(registry.get(SchemaType::String, "unknown").is_none());
    }

    #[test]
    fn test_resolve_from_schema() {
        let registry = FormatRegistry::builtin();
        assert!(registry.resolve(&Schema::string().format("date-time")).is_some());
        assert!(registry.resolve(&Schema::string().format("custom")).is_none());
        assert!(registry.resolve(&Schema::string()).is_none());
    }

    #[test]
    fn test_register_replaces_builtin() {
        fn never(_: &Value) -> bool {
            false
        }
        fn shout(value: &Value) -> Result<Value, FormatError> {
            match value {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                other => Ok(other.clone()),
            }
        }

        let mut registry = FormatRegistry::builtin();
        let before = registry.len();
        let previous = registry.register(SchemaType::String, "uuid", Format::new(never, shout));
        assert!(previous.is_some());
        assert_eq!(registry.len(), before);

        let format = registry.get(SchemaType::String, "uuid").unwrap();
        let raw = Value::string("550e8400-e29b-41d4-a716-446655440000");
        assert!(!(format.validate)(&raw));
        assert_eq!(
            (format.unmarshal)(&raw).unwrap(),
            Value::string("550E8400-E29B-41D4-A716-446655440000")
        );
    }

    #[test]
    fn test_date_unmarshal() {
        let value = to_date(&Value::string("2021-01-05")).unwrap();
        assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap()));
        assert!(to_date(&Value::string("not-a-date")).is_err());
        // already converted
        assert_eq!(to_date(&value).unwrap(), value);
    }

    #[test]
    fn test_datetime_unmarshal() {
        let value = to_datetime(&Value::string("2024-01-19T12:00:00+08:00")).unwrap();
        match value {
            Value::DateTime(dt) => assert_eq!(dt.offset().local_minus_utc(), 8 * 3600),
            other => panic!("expected date-time, got {:?}", other),
        }
        assert!(to_datetime(&Value::string("2024-01-19")).is_err());
    }

    #[test]
    fn test_byte_and_binary() {
        assert_eq!(to_byte(&Value::string("aGVsbG8=")).unwrap(), Value::Bytes(b"hello".to_vec()));
        assert!(to_byte(&Value::string("***")).is_err());
        assert_eq!(to_binary(&Value::string("raw")).unwrap(), Value::Bytes(b"raw".to_vec()));
    }

    #[test]
    fn test_int32_range() {
        assert!(is_int32(&Value::Int(i32::MAX as i64)));
        assert!(!is_int32(&Value::Int(i32::MAX as i64 + 1)));
        assert!(to_int32(&Value::Int(1 << 40)).is_err());
    }

    #[test]
    fn test_ip_formats() {
        assert!(is_ipv4(&Value::string("192.168.0.1")));
        assert!(!is_ipv4(&Value::string("::1")));
        assert!(is_ipv6(&Value::string("::1")));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@subdomain.example.co.uk"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@example"));
    }
}
