//! Request Parameter Example
//!
//! Casts, unmarshals and validates the pieces of an incoming request the way a
//! framework adapter would: one call per parameter, plus one for the body.
//!
//! Run with:
//! ```bash
//! cargo run -p ouroboros-openapi --example request_parameters
//! ```

use ouroboros_openapi::{
    Schema, SchemaConfig, SchemaUnmarshaller, SchemaValidator, Value,
};
use serde_json::json;

fn query_schema() -> Schema {
    Schema::integer()
        .minimum(1.0)
        .maximum(100.0)
        .default_value(Value::Int(20))
}

fn body_schema() -> Schema {
    Schema::object()
        .property("id", Schema::string().format("uuid"))
        .property("born", Schema::string().format("date"))
        .property("tags", Schema::array(Schema::string()).unique_items(true))
        .required(["id"])
        .no_additional_properties()
}

fn main() {
    let config = SchemaConfig::new().lenient();
    let unmarshaller = SchemaUnmarshaller::new(&config);
    let validator = SchemaValidator::new(&config);

    println!("1. Query parameters");
    println!("-------------------");
    for raw in [Some(Value::string("50")), Some(Value::string("500")), None] {
        let limit = query_schema();
        match unmarshaller.unmarshal_optional(&limit, raw.clone()) {
            Ok(Some(value)) => match validator.validate(&limit, &value) {
                Ok(()) => println!("  limit={:?} -> {:?}", raw, value),
                Err(err) => println!("  limit={:?} -> invalid: {}", raw, err.errors),
            },
            Ok(None) => println!("  limit absent"),
            Err(err) => println!("  limit={:?} -> {}", raw, err),
        }
    }
    println!();

    println!("2. JSON body");
    println!("-----------");
    let bodies = [
        json!({"id": "550e8400-e29b-41d4-a716-446655440000", "born": "2021-01-05", "tags": ["a"]}),
        json!({"id": "550e8400-e29b-41d4-a716-446655440000", "tags": ["a", "a"], "x": 1}),
        json!({"id": "550e8400-e29b-41d4-a716-446655440000", "born": "yesterday"}),
    ];
    let schema = body_schema();
    for body in bodies {
        let raw = Value::from(body.clone());
        if let Err(err) = validator.validate(&schema, &raw) {
            println!("  {} -> rejected", body);
            for violation in &err.errors {
                println!("    {}", violation);
            }
            continue;
        }
        match unmarshaller.unmarshal(&schema, raw) {
            Ok(value) => println!("  {} -> {:?}", body, value),
            Err(err) => println!("  {} -> {}", body, err),
        }
    }
}
