//! Declarative schema definitions
//!
//! Schemas can be described as JSON and loaded at startup, so hosts can keep
//! them next to the rest of their configuration:
//!
//! ```json
//! {
//!   "rules": { "excess": "forbid" },
//!   "fields": {
//!     "name":    { "types": ["string"] },
//!     "email":   { "format": "email", "undefined": "allow" },
//!     "zip":     { "pattern": "^[0-9]{5}$" },
//!     "address": { "schema": { "fields": { "city": { "types": ["string"] } } } },
//!     "tags":    { "elements": { "fields": { "id": { "types": ["number"] } } } }
//!   }
//! }
//! ```
//!
//! Loading checks every invariant a hand-built schema would enforce and
//! reports the first violation as a [`SchemaError`].

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::foundation::{SchemaError, TypeTag};
use crate::schema::{
    ExtendedSchema, FieldDefinition, FieldOptions, Schema, SchemaRules, UndefinedPolicy,
};

// ============================================================================
// MINIMAL
// ============================================================================

/// Serialized form of a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Validator rules.
    #[serde(default)]
    pub rules: SchemaRules,
    /// Key → type, in declaration order.
    pub fields: IndexMap<String, TypeTag>,
}

impl Schema {
    /// Builds a schema from its definition.
    ///
    /// `nested-schema` is rejected with [`SchemaError::MissingNestedSchema`]:
    /// the minimal validator has nowhere to attach a sub-schema.
    pub fn from_definition(definition: SchemaDefinition) -> Result<Self, SchemaError> {
        if let Some((key, _)) = definition
            .fields
            .iter()
            .find(|(_, tag)| **tag == TypeTag::NestedSchema)
        {
            return Err(SchemaError::MissingNestedSchema { key: key.clone() });
        }
        Ok(Self::from_fields(definition.fields, definition.rules))
    }

    /// Parses and builds a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Self::from_definition(serde_json::from_str(json)?)
    }
}

// ============================================================================
// EXTENDED
// ============================================================================

/// Serialized form of an [`ExtendedSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtendedSchemaDefinition {
    /// Validator rules.
    #[serde(default)]
    pub rules: SchemaRules,
    /// Key → field, in declaration order.
    pub fields: IndexMap<String, FieldSpec>,
}

/// Serialized form of one extended field.
///
/// Exactly one of these shapes applies:
///
/// 1. `format` (only `"email"`): a string field holding an email address
/// 2. `pattern`: a string field matching the regex
/// 3. `elements`: an array whose items all pass the element schema
/// 4. `types`, optionally with `schema` for `nested-schema` membership; when
///    `types` is omitted and `schema` is given, the field is nested-only
///
/// Mixing attributes of different shapes is a [`SchemaError::ConflictingSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSpec {
    /// Accepted types.
    pub types: Vec<TypeTag>,
    /// Absent-key handling.
    pub undefined: UndefinedPolicy,
    /// Overrides the generated description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displayed_as: Option<String>,
    /// Regex a string value must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Named string format; only `"email"` is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Nested schema for `nested-schema` membership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<ExtendedSchemaDefinition>>,
    /// Schema every array element must pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Box<ExtendedSchemaDefinition>>,
}

impl FieldSpec {
    /// The first two attributes selecting different shapes, if any.
    ///
    /// `types` and `schema` belong to the same shape and may be combined.
    fn conflict(&self) -> Option<(&'static str, &'static str)> {
        let present: Vec<&'static str> = [
            ("format", self.format.is_some()),
            ("pattern", self.pattern.is_some()),
            ("elements", self.elements.is_some()),
            ("types", !self.types.is_empty()),
            ("schema", self.schema.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();

        match present.as_slice() {
            [first, second, ..] if *first != "types" => Some((*first, *second)),
            _ => None,
        }
    }

    fn options(&self) -> FieldOptions {
        FieldOptions {
            predicate: None,
            undefined: self.undefined,
            displayed_as: self.displayed_as.clone(),
        }
    }
}

impl ExtendedSchema {
    /// Builds a schema, and its nested schemas, from a definition.
    pub fn from_definition(definition: ExtendedSchemaDefinition) -> Result<Self, SchemaError> {
        let mut schema = Self::new(definition.rules);
        for (key, spec) in definition.fields {
            schema.add_spec(key, spec)?;
        }
        Ok(schema)
    }

    /// Parses and builds a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Self::from_definition(serde_json::from_str(json)?)
    }

    fn add_spec(&mut self, key: String, spec: FieldSpec) -> Result<(), SchemaError> {
        if let Some((first, second)) = spec.conflict() {
            return Err(SchemaError::ConflictingSpec { key, first, second });
        }
        let options = spec.options();

        if let Some(format) = spec.format {
            if format != "email" {
                return Err(SchemaError::UnknownFormat { key, format });
            }
            self.add_email_field(key, options);
            return Ok(());
        }

        if let Some(pattern) = spec.pattern {
            let regex = Regex::new(&pattern).map_err(|source| SchemaError::InvalidPattern {
                key: key.clone(),
                source,
            })?;
            self.add_regex_field(key, regex, options);
            return Ok(());
        }

        if let Some(elements) = spec.elements {
            let element = Self::from_definition(*elements)?;
            self.add_array_of_elements_field(key, Arc::new(element), options);
            return Ok(());
        }

        let nested = spec
            .schema
            .map(|definition| Self::from_definition(*definition))
            .transpose()?;

        let field = match (spec.types.is_empty(), nested) {
            (true, Some(nested)) => FieldDefinition::nested(Arc::new(nested)),
            (true, None) => return Err(SchemaError::EmptyTypeSet { key }),
            (false, nested) => {
                let mut field = FieldDefinition::new(spec.types)
                    .map_err(|_| SchemaError::EmptyTypeSet { key: key.clone() })?;
                match nested {
                    Some(nested) => field = field.with_nested(Arc::new(nested)),
                    None if field.accepted_types().contains(&TypeTag::NestedSchema) => {
                        return Err(SchemaError::MissingNestedSchema { key });
                    }
                    None => {}
                }
                field
            }
        };
        self.add_field(key, field.with_options(options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{Check, FailureKind};
    use crate::schema::ExcessPolicy;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn minimal_definition_round_trips_through_describe() {
        let schema = Schema::from_json_str(
            r#"{"rules": {"excess": "keep"}, "fields": {"id": "number", "tags": "array"}}"#,
        )
        .unwrap();
        assert_eq!(schema.rules().excess, ExcessPolicy::Keep);
        assert_eq!(schema.describe(), json!({"id": "number", "tags": "array"}));
    }

    #[test]
    fn minimal_definition_rejects_nested_tag() {
        let err = Schema::from_json_str(r#"{"fields": {"a": "nested-schema"}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::MissingNestedSchema { key } if key == "a"));
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        let err = Schema::from_json_str(r#"{"fields": {"a": "date"}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn extended_definition_builds_every_field_shape() {
        let schema = ExtendedSchema::from_json_str(
            r#"{
                "rules": {"excess": "forbid"},
                "fields": {
                    "name": {"types": ["string"]},
                    "score": {"types": ["number", "null"], "undefined": "allow"},
                    "email": {"format": "email"},
                    "zip": {"pattern": "^[0-9]{5}$", "displayed_as": "zip code"},
                    "address": {"schema": {"fields": {"city": {"types": ["string"]}}}},
                    "friends": {"elements": {"fields": {"id": {"types": ["number"]}}}}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            schema.describe(),
            json!({
                "name": "string",
                "score?": "number | null",
                "email": "email",
                "zip": "zip code",
                "address": {"city": "string"},
                "friends": "array<{\"id\":\"number\"}>"
            })
        );

        let input = json!({
            "name": "Ann",
            "email": "ann@example.com",
            "zip": "12345",
            "address": {"city": "Oslo"},
            "friends": [{"id": 1}]
        });
        assert_eq!(schema.check(&input).unwrap(), input);

        let bad_zip = json!({
            "name": "Ann",
            "email": "ann@example.com",
            "zip": "1234",
            "address": {"city": "Oslo"},
            "friends": []
        });
        assert_eq!(schema.check(&bad_zip).unwrap_err().kind, FailureKind::CallbackFailed);
    }

    #[test]
    fn invalid_pattern_names_the_key() {
        let err = ExtendedSchema::from_json_str(r#"{"fields": {"zip": {"pattern": "("}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { ref key, .. } if key == "zip"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = ExtendedSchema::from_json_str(r#"{"fields": {"site": {"format": "url"}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownFormat { ref format, .. } if format == "url"));
    }

    #[test]
    fn field_without_types_is_rejected() {
        let err = ExtendedSchema::from_json_str(r#"{"fields": {"x": {}}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyTypeSet { ref key } if key == "x"));
    }

    #[test]
    fn nested_tag_without_schema_is_rejected() {
        let err = ExtendedSchema::from_json_str(
            r#"{"fields": {"x": {"types": ["nested-schema", "null"]}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingNestedSchema { ref key } if key == "x"));
    }

    #[test]
    fn nested_errors_surface_from_inner_definitions() {
        let err = ExtendedSchema::from_json_str(
            r#"{"fields": {"a": {"schema": {"fields": {"b": {"pattern": "["}}}}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { ref key, .. } if key == "b"));
    }

    #[rstest]
    #[case(r#"{"types": ["number"], "pattern": "^1$"}"#, "pattern", "types")]
    #[case(r#"{"types": ["string"], "format": "email"}"#, "format", "types")]
    #[case(r#"{"types": ["object"], "elements": {"fields": {}}}"#, "elements", "types")]
    #[case(r#"{"pattern": "^1$", "schema": {"fields": {}}}"#, "pattern", "schema")]
    #[case(r#"{"format": "email", "schema": {"fields": {}}}"#, "format", "schema")]
    #[case(r#"{"elements": {"fields": {}}, "schema": {"fields": {}}}"#, "elements", "schema")]
    #[case(r#"{"format": "email", "pattern": "^1$"}"#, "format", "pattern")]
    #[case(r#"{"format": "email", "elements": {"fields": {}}}"#, "format", "elements")]
    #[case(r#"{"pattern": "^1$", "elements": {"fields": {}}}"#, "pattern", "elements")]
    fn conflicting_shapes_are_rejected(
        #[case] field: &str,
        #[case] expected_first: &str,
        #[case] expected_second: &str,
    ) {
        let json = format!(r#"{{"fields": {{"n": {field}}}}}"#);
        let err = ExtendedSchema::from_json_str(&json).unwrap_err();
        match err {
            SchemaError::ConflictingSpec { key, first, second } => {
                assert_eq!(key, "n");
                assert_eq!(first, expected_first);
                assert_eq!(second, expected_second);
            }
            other => panic!("expected ConflictingSpec, got {other:?}"),
        }
    }

    #[test]
    fn types_and_schema_may_be_combined() {
        let schema = ExtendedSchema::from_json_str(
            r#"{"fields": {"a": {"types": ["nested-schema", "null"], "schema": {"fields": {}}}}}"#,
        )
        .unwrap();
        assert!(schema.check(&json!({"a": null})).is_ok());
    }

    #[test]
    fn unknown_field_attribute_is_a_parse_error() {
        let err = ExtendedSchema::from_json_str(r#"{"fields": {"x": {"type": "string"}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }
}
