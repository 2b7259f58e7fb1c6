//! Validation constraints grouped by the value shape they apply to
//!
//! A `Schema` carries one of each group; only the group matching the runtime
//! value is consulted during validation.

use std::collections::BTreeSet;

use regex::Regex;

// ============================================================================
// String Constraints
// ============================================================================

/// Constraints for string validation
#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    /// Minimum length (in characters, not bytes)
    pub min_length: Option<usize>,
    /// Maximum length (in characters, not bytes)
    pub max_length: Option<usize>,
    /// Compiled `pattern`; matched with search semantics, so it only
    /// anchors when the expression itself does
    pub pattern: Option<Regex>,
}

// ============================================================================
// Numeric Constraints
// ============================================================================

/// Constraints for `integer` and `number` validation
///
/// `exclusive_minimum` / `exclusive_maximum` are the OpenAPI 3.0 boolean
/// modifiers: they turn `minimum` / `maximum` into strict bounds and have no
/// effect on their own.
#[derive(Debug, Clone, Default)]
pub struct NumericConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    /// Value must be a multiple of this number
    pub multiple_of: Option<f64>,
}

impl NumericConstraints {
    /// Whether no bound is configured at all
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none() && self.multiple_of.is_none()
    }
}

// ============================================================================
// Array Constraints
// ============================================================================

/// Constraints for array validation
#[derive(Debug, Clone, Default)]
pub struct ArrayConstraints {
    /// Minimum number of items
    pub min_items: Option<usize>,
    /// Maximum number of items
    pub max_items: Option<usize>,
    /// Whether all items must be unique (JSON equality)
    pub unique_items: bool,
}

// ============================================================================
// Object Constraints
// ============================================================================

/// Constraints for object validation
#[derive(Debug, Clone, Default)]
pub struct ObjectConstraints {
    /// Property names that must be present
    pub required: BTreeSet<String>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_constraints_default() {
        let constraints = StringConstraints::default();
        assert!(constraints.min_length.is_none());
        assert!(constraints.max_length.is_none());
        assert!(constraints.pattern.is_none());
    }

    #[test]
    fn test_numeric_constraints_default() {
        let constraints = NumericConstraints::default();
        assert!(constraints.is_empty());
        assert!(!constraints.exclusive_minimum);
        assert!(!constraints.exclusive_maximum);
    }

    #[test]
    fn test_numeric_exclusive_flag_alone_is_empty() {
        let constraints = NumericConstraints {
            exclusive_minimum: true,
            ..Default::default()
        };
        assert!(constraints.is_empty());
    }

    #[test]
    fn test_array_constraints_default() {
        let constraints = ArrayConstraints::default();
        assert!(constraints.min_items.is_none());
        assert!(constraints.max_items.is_none());
        assert!(!constraints.unique_items);
    }
}
