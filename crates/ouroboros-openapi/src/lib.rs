//! Ouroboros OpenAPI
//!
//! OpenAPI 3.0 Schema Object engine for the Ouroboros framework.
//!
//! Given a `Schema` and a raw value pulled out of an HTTP request or response
//! (a query string, a header, a decoded JSON body), this crate can:
//!
//! - **cast** the value to the schema's primitive type (`"42"` → `42`)
//! - **validate** it against the structural constraints (`type`, bounds,
//!   `enum`, `pattern`, `required`, `allOf` / `oneOf`, ...)
//! - **unmarshal** it into typed values, applying `format` conversions such
//!   as `date`, `date-time`, `uuid` and `byte` and recursing into objects and
//!   arrays
//!
//! Validation and unmarshalling are independent: run either, or both in the
//! order that suits the caller. Loading schemas from an OpenAPI document and
//! mapping errors onto HTTP responses are left to the framework adapters.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_openapi::{Schema, SchemaConfig, SchemaUnmarshaller, SchemaValidator, Value};
//!
//! let schema = Schema::object()
//!     .property("id", Schema::string().format("uuid"))
//!     .property("limit", Schema::integer().minimum(1.0).maximum(100.0))
//!     .required(["id"]);
//!
//! let raw = Value::object([
//!     ("id", Value::string("550e8400-e29b-41d4-a716-446655440000")),
//!     ("limit", Value::string("20")),
//! ]);
//!
//! let unmarshaller = SchemaUnmarshaller::new(&SchemaConfig::new().lenient());
//! let typed = unmarshaller.unmarshal(&schema, raw).unwrap();
//!
//! assert!(SchemaValidator::builtin().validate(&schema, &typed).is_ok());
//! ```

// Public modules
pub mod cast;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod formats;
pub mod schema;
pub mod strict;
pub mod types;
pub mod unmarshal;
pub mod validators;

// Re-export commonly used types
pub use cast::{cast, cast_optional};
pub use config::SchemaConfig;
pub use constraints::{ArrayConstraints, NumericConstraints, ObjectConstraints, StringConstraints};
pub use errors::{
    CastError, Error, ErrorType, FormatError, InvalidSchemaValue, Result, UnmarshalCause,
    UnmarshalValueError, ValidationContext, ValidationError, ValidationErrors,
};
pub use formats::{Format, FormatRegistry};
pub use schema::{AdditionalProperties, Schema, SchemaType};
pub use types::Value;
pub use unmarshal::SchemaUnmarshaller;
pub use validators::SchemaValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
