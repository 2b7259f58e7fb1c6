//! Casting and unmarshalling tests

use chrono::NaiveDate;
use ouroboros_openapi::{
    cast, Format, FormatError, Schema, SchemaConfig, SchemaType, SchemaUnmarshaller,
    SchemaValidator, UnmarshalCause, Value,
};
use serde_json::json;

fn lenient() -> SchemaUnmarshaller {
    SchemaUnmarshaller::new(&SchemaConfig::new().lenient())
}

fn strict() -> SchemaUnmarshaller {
    SchemaUnmarshaller::new(&SchemaConfig::new())
}

// ============================================================================
// Casting
// ============================================================================

#[test]
fn test_integer_like_strings_cast_to_integers() {
    let schema = Schema::integer();
    for n in [-1000_i64, -1, 0, 1, 42, i64::MAX] {
        assert_eq!(cast(&schema, Value::String(n.to_string())).unwrap(), Value::Int(n));
    }
}

#[test]
fn test_non_numeric_strings_fail_to_cast() {
    let schema = Schema::integer();
    for raw in ["", "abc", "1.5.2", "12px", "--1"] {
        let err = cast(&schema, Value::string(raw)).unwrap_err();
        assert_eq!(err.value, Value::string(raw));
        assert_eq!(err.schema_type, SchemaType::Integer);
    }
}

// ============================================================================
// Strict vs Lenient
// ============================================================================

#[test]
fn test_nested_array_round_trip() {
    let schema = Schema::object().property("a", Schema::array(Schema::integer()));
    let raw: Value = json!({"a": ["1", "2", "3"]}).into();

    let typed = lenient().unmarshal(&schema, raw.clone()).unwrap();
    assert_eq!(typed, Value::from(json!({"a": [1, 2, 3]})));

    let err = strict().unmarshal(&schema, raw).unwrap_err();
    assert_eq!(err.value, Value::string("1"));
    assert_eq!(err.schema_type, SchemaType::Integer);
    assert!(matches!(err.cause, UnmarshalCause::NotNative { .. }));
}

#[test]
fn test_strict_mode_is_idempotent_on_native_values() {
    let schema = Schema::object()
        .property("id", Schema::string().format("uuid"))
        .property("born", Schema::string().format("date"))
        .property("score", Schema::number().format("double"))
        .property("tags", Schema::array(Schema::string()))
        .property("active", Schema::boolean());

    let raw: Value = json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "born": "2021-01-05",
        "score": 9.5,
        "tags": ["a", "b"],
        "active": true
    })
    .into();

    let once = strict().unmarshal(&schema, raw).unwrap();
    let twice = strict().unmarshal(&schema, once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_float_format_widens_integers() {
    let schema = Schema::number().format("float");
    let widened = strict().unmarshal(&schema, Value::Int(2)).unwrap();
    assert_eq!(widened, Value::Float(2.0));
    // stable once widened
    assert_eq!(strict().unmarshal(&schema, widened.clone()).unwrap(), widened);
    // without a format, integers stay integers
    assert_eq!(strict().unmarshal(&Schema::number(), Value::Int(2)).unwrap(), Value::Int(2));
}

#[test]
fn test_nested_failure_reports_innermost_value() {
    let schema = Schema::object().property(
        "outer",
        Schema::object().property("ids", Schema::array(Schema::string().format("uuid"))),
    );
    let raw: Value = json!({
        "outer": {"ids": ["550e8400-e29b-41d4-a716-446655440000", "bogus"]}
    })
    .into();

    let err = lenient().unmarshal(&schema, raw).unwrap_err();
    assert_eq!(err.value, Value::string("bogus"));
    assert_eq!(err.schema_type, SchemaType::String);
    assert!(matches!(err.cause, UnmarshalCause::Format(_)));
}

#[test]
fn test_all_of_property_overrides_parent_declaration() {
    let schema = Schema::object()
        .property("id", Schema::integer())
        .all_of(vec![Schema::object().property("id", Schema::string())]);
    let raw = Value::object([("id", Value::string("7"))]);

    assert_eq!(
        lenient().unmarshal(&schema, raw.clone()).unwrap(),
        Value::object([("id", Value::string("7"))])
    );
    assert!(strict().unmarshal(&schema, raw).is_ok());
}

#[test]
fn test_plain_native_values_unchanged() {
    let cases = [
        (Schema::integer(), Value::Int(5)),
        (Schema::number(), Value::Float(1.25)),
        (Schema::boolean(), Value::Bool(false)),
        (Schema::string(), Value::string("x")),
    ];
    for (schema, value) in cases {
        assert_eq!(strict().unmarshal(&schema, value.clone()).unwrap(), value);
    }
}

#[test]
fn test_per_call_strictness_override() {
    let unmarshaller = strict();
    let schema = Schema::boolean();
    assert!(unmarshaller.unmarshal(&schema, Value::string("true")).is_err());
    assert_eq!(
        unmarshaller.unmarshal_with(&schema, Value::string("true"), false).unwrap(),
        Value::Bool(true)
    );
}

// ============================================================================
// Formats
// ============================================================================

#[test]
fn test_date_format() {
    let schema = Schema::string().format("date");

    let value = strict().unmarshal(&schema, Value::string("2021-01-05")).unwrap();
    assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2021, 1, 5).unwrap()));

    let err = strict().unmarshal(&schema, Value::string("not-a-date")).unwrap_err();
    assert_eq!(err.value, Value::string("not-a-date"));
    assert!(matches!(err.cause, UnmarshalCause::Format(_)));
}

#[test]
fn test_byte_format_decodes_base64() {
    let schema = Schema::string().format("byte");
    assert_eq!(
        strict().unmarshal(&schema, Value::string("aGVsbG8=")).unwrap(),
        Value::Bytes(b"hello".to_vec())
    );
}

#[test]
fn test_datetime_and_uuid_formats() {
    let schema = Schema::object()
        .property("at", Schema::string().format("date-time"))
        .property("id", Schema::string().format("uuid"));
    let raw: Value = json!({
        "at": "2024-01-19T12:00:00Z",
        "id": "6ba7b810-9dad-41d1-80b4-00c04fd430c8"
    })
    .into();

    let Value::Object(fields) = strict().unmarshal(&schema, raw).unwrap() else {
        panic!("expected object");
    };
    assert!(matches!(fields["at"], Value::DateTime(_)));
    assert!(matches!(fields["id"], Value::Uuid(_)));
}

fn always_valid(_: &Value) -> bool {
    true
}

fn tag_custom(value: &Value) -> Result<Value, FormatError> {
    match value {
        Value::String(s) => Ok(Value::String(format!("custom:{}", s))),
        other => Err(FormatError::new(format!("unexpected {}", other.type_name()))),
    }
}

#[test]
fn test_custom_format_replaces_builtin() {
    let config = SchemaConfig::new().format(
        SchemaType::String,
        "uuid",
        Format::new(always_valid, tag_custom),
    );
    let unmarshaller = SchemaUnmarshaller::new(&config);
    let schema = Schema::string().format("uuid");

    // The built-in would reject this and would produce a Value::Uuid otherwise.
    assert_eq!(
        unmarshaller.unmarshal(&schema, Value::string("not-a-uuid")).unwrap(),
        Value::string("custom:not-a-uuid")
    );
    assert_eq!(
        unmarshaller
            .unmarshal(&schema, Value::string("550e8400-e29b-41d4-a716-446655440000"))
            .unwrap(),
        Value::string("custom:550e8400-e29b-41d4-a716-446655440000")
    );

    // validation sees the override too
    let validator = SchemaValidator::new(&config);
    assert!(validator.validate(&schema, &Value::string("not-a-uuid")).is_ok());
}

#[test]
fn test_custom_format_new_key() {
    fn is_upper(value: &Value) -> bool {
        matches!(value, Value::String(s) if s.chars().all(|c| c.is_ascii_uppercase()))
    }
    fn lower(value: &Value) -> Result<Value, FormatError> {
        match value {
            Value::String(s) => Ok(Value::String(s.to_lowercase())),
            _ => Err(FormatError::new("expected string")),
        }
    }

    let config = SchemaConfig::new().format(SchemaType::String, "shout", Format::new(is_upper, lower));
    let schema = Schema::string().format("shout");

    assert_eq!(
        SchemaUnmarshaller::new(&config).unmarshal(&schema, Value::string("ABC")).unwrap(),
        Value::string("abc")
    );
    assert!(SchemaValidator::new(&config)
        .validate(&schema, &Value::string("abc"))
        .is_err());
    // without the config the format is unknown and ignored
    assert!(SchemaValidator::builtin().validate(&schema, &Value::string("abc")).is_ok());
}

// ============================================================================
// Validate + Unmarshal Composition
// ============================================================================

#[test]
fn test_unmarshal_does_not_enforce_constraints() {
    let schema = Schema::integer().maximum(10.0);
    let value = lenient().unmarshal(&schema, Value::string("15")).unwrap();
    assert_eq!(value, Value::Int(15));
    assert!(SchemaValidator::builtin().validate(&schema, &value).is_err());
}

#[test]
fn test_schema_convenience_methods() {
    let schema = Schema::array(Schema::number());
    let raw = Value::List(vec![Value::string("1.5")]);

    assert_eq!(schema.cast(raw.clone()).unwrap(), Value::List(vec![Value::Float(1.5)]));
    assert_eq!(
        schema.unmarshal(raw, &SchemaConfig::new().lenient()).unwrap(),
        Value::List(vec![Value::Float(1.5)])
    );
}
