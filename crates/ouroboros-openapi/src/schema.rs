//! Schema Object model
//!
//! `Schema` is the typed, in-memory form of one OpenAPI 3.0 Schema Object.
//! Children (`properties`, `items`, `allOf`, `oneOf`, `additionalProperties`)
//! are owned by their parent, so a schema is a tree. Schemas are built once and
//! only read afterwards: nothing in this crate mutates a schema it is handed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde_json::json;

use crate::cast;
use crate::config::SchemaConfig;
use crate::constraints::{ArrayConstraints, NumericConstraints, ObjectConstraints, StringConstraints};
use crate::errors::{CastError, Error, InvalidSchemaValue, Result, UnmarshalValueError};
use crate::types::Value;
use crate::unmarshal::SchemaUnmarshaller;
use crate::validators::SchemaValidator;

// ============================================================================
// Schema Type
// ============================================================================

/// Value of the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// No `type` keyword: any shape is accepted and nothing is cast
    Any,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown schema type: {}", other)),
        }
    }
}

// ============================================================================
// Additional Properties
// ============================================================================

/// Value of the `additionalProperties` keyword
#[derive(Debug, Clone)]
pub enum AdditionalProperties {
    /// `true` accepts extra properties unchecked, `false` rejects them
    Allowed(bool),
    /// Extra properties must match this schema
    Schema(Box<Schema>),
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        Self::Allowed(true)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// An OpenAPI Schema Object
#[derive(Debug, Clone)]
pub struct Schema {
    pub schema_type: SchemaType,
    pub format: Option<String>,
    /// Declared properties; ordered for deterministic iteration
    pub properties: BTreeMap<String, Schema>,
    pub items: Option<Box<Schema>>,
    /// `None` = no default configured, `Some(Value::Null)` = default is null
    pub default: Option<Value>,
    pub nullable: bool,
    pub enum_values: Option<Vec<Value>>,
    /// Informational only
    pub deprecated: bool,
    pub all_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    pub additional_properties: AdditionalProperties,
    pub string: StringConstraints,
    pub numeric: NumericConstraints,
    pub array: ArrayConstraints,
    pub object: ObjectConstraints,
    /// `x-` vendor extensions, carried but never interpreted
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl Schema {
    /// Create a schema of the given type with no constraints
    pub fn new(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            format: None,
            properties: BTreeMap::new(),
            items: None,
            default: None,
            nullable: false,
            enum_values: None,
            deprecated: false,
            all_of: Vec::new(),
            one_of: Vec::new(),
            additional_properties: AdditionalProperties::default(),
            string: StringConstraints::default(),
            numeric: NumericConstraints::default(),
            array: ArrayConstraints::default(),
            object: ObjectConstraints::default(),
            extensions: BTreeMap::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::new(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaType::Boolean)
    }

    pub fn object() -> Self {
        Self::new(SchemaType::Object)
    }

    pub fn any() -> Self {
        Self::new(SchemaType::Any)
    }

    /// Array schema; `items` is mandatory for arrays
    pub fn array(items: Schema) -> Self {
        let mut schema = Self::new(SchemaType::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    // ------------------------------------------------------------------------
    // Builder
    // ------------------------------------------------------------------------

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Add a declared property
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark properties as required
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the default value (`Value::Null` is a legitimate default)
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn all_of(mut self, schemas: Vec<Schema>) -> Self {
        self.all_of = schemas;
        self
    }

    pub fn one_of(mut self, schemas: Vec<Schema>) -> Self {
        self.one_of = schemas;
        self
    }

    pub fn additional_properties(mut self, additional: AdditionalProperties) -> Self {
        self.additional_properties = additional;
        self
    }

    /// Reject properties not named in `properties`
    pub fn no_additional_properties(self) -> Self {
        self.additional_properties(AdditionalProperties::Allowed(false))
    }

    /// Constrain extra properties with a schema
    pub fn additional_properties_schema(self, schema: Schema) -> Self {
        self.additional_properties(AdditionalProperties::Schema(Box::new(schema)))
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.string.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.string.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.string.pattern = Some(pattern);
        self
    }

    /// Compile and set `pattern`
    pub fn try_pattern(self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(self.pattern(regex))
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.numeric.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.numeric.maximum = Some(maximum);
        self
    }

    pub fn exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.numeric.exclusive_minimum = exclusive;
        self
    }

    pub fn exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.numeric.exclusive_maximum = exclusive;
        self
    }

    pub fn multiple_of(mut self, multiple: f64) -> Self {
        self.numeric.multiple_of = Some(multiple);
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.array.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.array.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.array.unique_items = unique;
        self
    }

    pub fn min_properties(mut self, min: usize) -> Self {
        self.object.min_properties = Some(min);
        self
    }

    pub fn max_properties(mut self, max: usize) -> Self {
        self.object.max_properties = Some(max);
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Whether a default is configured (a null default counts)
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Own properties merged with those contributed by `allOf` children.
    ///
    /// An `allOf` child redeclaring a property replaces the parent's
    /// declaration; later children replace earlier ones.
    pub fn get_all_properties(&self) -> BTreeMap<&str, &Schema> {
        let mut properties: BTreeMap<&str, &Schema> = self
            .properties
            .iter()
            .map(|(name, schema)| (name.as_str(), schema))
            .collect();
        for subschema in &self.all_of {
            properties.extend(subschema.get_all_properties());
        }
        properties
    }

    pub fn get_all_properties_names(&self) -> BTreeSet<&str> {
        self.get_all_properties().into_keys().collect()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Cast a raw value to this schema's primitive type
    pub fn cast(&self, value: Value) -> std::result::Result<Value, CastError> {
        cast::cast(self, value)
    }

    /// Validate against built-in formats only
    pub fn validate(&self, value: &Value) -> std::result::Result<(), InvalidSchemaValue> {
        SchemaValidator::builtin().validate(self, value)
    }

    /// Unmarshal with the given configuration (custom formats + strictness)
    pub fn unmarshal(
        &self,
        value: Value,
        config: &SchemaConfig,
    ) -> std::result::Result<Value, UnmarshalValueError> {
        SchemaUnmarshaller::new(config).unmarshal(self, value)
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Project the schema back into a plain OpenAPI keyword map
    pub fn to_dict(&self) -> serde_json::Value {
        let mut dict = serde_json::Map::new();

        if self.schema_type != SchemaType::Any {
            dict.insert("type".into(), json!(self.schema_type.as_str()));
        }
        if let Some(format) = &self.format {
            dict.insert("format".into(), json!(format));
        }
        if !self.properties.is_empty() {
            let properties: serde_json::Map<String, serde_json::Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_dict()))
                .collect();
            dict.insert("properties".into(), serde_json::Value::Object(properties));
        }
        if let Some(items) = &self.items {
            dict.insert("items".into(), items.to_dict());
        }
        if !self.object.required.is_empty() {
            dict.insert("required".into(), json!(self.object.required));
        }
        if let Some(default) = &self.default {
            dict.insert("default".into(), default.clone().into());
        }
        if self.nullable {
            dict.insert("nullable".into(), json!(true));
        }
        if let Some(values) = &self.enum_values {
            let values: Vec<serde_json::Value> = values.iter().cloned().map(Into::into).collect();
            dict.insert("enum".into(), json!(values));
        }
        if self.deprecated {
            dict.insert("deprecated".into(), json!(true));
        }
        if !self.all_of.is_empty() {
            let schemas: Vec<_> = self.all_of.iter().map(Schema::to_dict).collect();
            dict.insert("allOf".into(), json!(schemas));
        }
        if !self.one_of.is_empty() {
            let schemas: Vec<_> = self.one_of.iter().map(Schema::to_dict).collect();
            dict.insert("oneOf".into(), json!(schemas));
        }
        match &self.additional_properties {
            AdditionalProperties::Allowed(true) => {}
            AdditionalProperties::Allowed(false) => {
                dict.insert("additionalProperties".into(), json!(false));
            }
            AdditionalProperties::Schema(schema) => {
                dict.insert("additionalProperties".into(), schema.to_dict());
            }
        }

        insert_count(&mut dict, "minLength", self.string.min_length);
        insert_count(&mut dict, "maxLength", self.string.max_length);
        if let Some(pattern) = &self.string.pattern {
            dict.insert("pattern".into(), json!(pattern.as_str()));
        }

        insert_number(&mut dict, "minimum", self.numeric.minimum);
        insert_number(&mut dict, "maximum", self.numeric.maximum);
        if self.numeric.exclusive_minimum {
            dict.insert("exclusiveMinimum".into(), json!(true));
        }
        if self.numeric.exclusive_maximum {
            dict.insert("exclusiveMaximum".into(), json!(true));
        }
        insert_number(&mut dict, "multipleOf", self.numeric.multiple_of);

        insert_count(&mut dict, "minItems", self.array.min_items);
        insert_count(&mut dict, "maxItems", self.array.max_items);
        if self.array.unique_items {
            dict.insert("uniqueItems".into(), json!(true));
        }

        insert_count(&mut dict, "minProperties", self.object.min_properties);
        insert_count(&mut dict, "maxProperties", self.object.max_properties);

        for (key, value) in &self.extensions {
            dict.insert(key.clone(), value.clone());
        }

        serde_json::Value::Object(dict)
    }
}

fn insert_count(dict: &mut serde_json::Map<String, serde_json::Value>, key: &str, value: Option<usize>) {
    if let Some(value) = value {
        dict.insert(key.into(), json!(value));
    }
}

// Whole numbers render as JSON integers so `minimum: 1` round-trips as `1`
fn insert_number(dict: &mut serde_json::Map<String, serde_json::Value>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        let number = if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            json!(value as i64)
        } else {
            json!(value)
        };
        dict.insert(key.into(), number);
    }
}
