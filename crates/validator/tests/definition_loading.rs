//! Loading schemas from JSON definitions.

use pretty_assertions::assert_eq;
use serde_json::json;
use sift_validator::prelude::*;

const USER: &str = r#"{
    "rules": {"excess": "clean"},
    "fields": {
        "name": {"types": ["string"]},
        "age": {"types": ["number"]},
        "email": {"format": "email", "undefined": "allow"},
        "address": {
            "types": ["nested-schema", "null"],
            "schema": {
                "rules": {"excess": "forbid"},
                "fields": {"city": {"types": ["string"]}}
            }
        }
    }
}"#;

#[test]
fn loaded_schema_validates_like_a_built_one() {
    let schema = ExtendedSchema::from_json_str(USER).unwrap();

    let clean = schema
        .check(&json!({"name": "Ann", "age": 40, "address": null, "role": "admin"}))
        .unwrap();
    assert_eq!(clean, json!({"name": "Ann", "age": 40, "address": null}));

    let failure = schema
        .check(&json!({"name": "Ann", "age": 40, "address": {"city": "Oslo", "zip": "0150"}}))
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::WrongType);
    assert_eq!(failure.root_cause().kind, FailureKind::ExcessKeys);
}

#[test]
fn definition_can_be_built_from_a_value() {
    let definition: ExtendedSchemaDefinition = serde_json::from_str(USER).unwrap();
    assert_eq!(definition.fields.len(), 4);
    let schema = ExtendedSchema::from_definition(definition.clone()).unwrap();
    assert_eq!(schema.length(), 4);

    let reparsed: ExtendedSchemaDefinition =
        serde_json::from_value(serde_json::to_value(&definition).unwrap()).unwrap();
    assert_eq!(reparsed, definition);
}

#[test]
fn minimal_definition() {
    let definition: SchemaDefinition =
        serde_json::from_value(json!({"fields": {"id": "number", "payload": "any"}})).unwrap();
    assert_eq!(definition.rules, SchemaRules::default());

    let schema = Schema::from_definition(definition).unwrap();
    assert!(schema.check(&json!({"id": 1, "payload": [1, 2]})).is_ok());
    assert_eq!(
        schema.check(&json!({"id": "1", "payload": null})).unwrap_err().kind,
        FailureKind::WrongType
    );
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = ExtendedSchema::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SchemaError::Parse(_)));
    assert!(err.to_string().starts_with("invalid schema definition"));
}
