//! Configuration for validation and unmarshalling
//!
//! Holds the caller-supplied custom formats and the strictness flag. Both the
//! validator and the unmarshaller resolve their format table from a config at
//! construction time.

use crate::formats::{Format, FormatRegistry};
use crate::schema::SchemaType;

// ============================================================================
// Schema Config
// ============================================================================

/// Construction-time options for `SchemaValidator` and `SchemaUnmarshaller`
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Reject values not already of the schema's native shape (no coercion)
    pub strict: bool,

    /// Custom formats; these replace built-ins registered under the same key
    pub custom_formats: FormatRegistry,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            strict: true,
            custom_formats: FormatRegistry::new(),
        }
    }
}

impl SchemaConfig {
    /// Create a new config with defaults (strict, no custom formats)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Coerce string input to the schema type before conversion
    pub fn lenient(self) -> Self {
        self.strict(false)
    }

    /// Register a custom format
    pub fn format(mut self, schema_type: SchemaType, name: impl Into<String>, format: Format) -> Self {
        self.custom_formats.register(schema_type, name, format);
        self
    }

    /// Built-in formats overridden by the custom ones
    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::builtin();
        registry.extend(&self.custom_formats);
        registry
    }
}

// ============================================================================
// Tests
// ============================================================================
