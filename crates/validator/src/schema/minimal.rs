//! The minimal validator
//!
//! A fixed mapping of key to a single [`TypeTag`] and one excess-key policy.
//! No predicates, no optional fields, no nesting: the fast path for flat
//! payloads. [`ExtendedSchema`](crate::schema::ExtendedSchema) generalizes it.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::foundation::{Check, Failure, TypeTag, ValidationResult, guarded};
use crate::schema::{ExcessPolicy, SchemaRules, excess_keys, log_outcome, sanitized};

/// Validates flat objects against a fixed key → type mapping.
///
/// An absent key is always a [`MissingKeys`](crate::foundation::FailureKind::MissingKeys)
/// failure; there is no per-field undefined policy here.
///
/// # Examples
///
/// ```
/// use sift_validator::foundation::{Check, TypeTag};
/// use sift_validator::schema::Schema;
/// use serde_json::json;
///
/// let schema = Schema::builder()
///     .field("name", TypeTag::String)
///     .field("age", TypeTag::Number)
///     .build();
///
/// let clean = schema.check(&json!({"name": "John", "age": 30, "extra": "x"})).unwrap();
/// assert_eq!(clean, json!({"name": "John", "age": 30}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, TypeTag>,
    rules: SchemaRules,
}

impl Schema {
    /// Creates an empty schema with the given rules.
    pub fn new(rules: impl Into<SchemaRules>) -> Self {
        Self {
            fields: IndexMap::new(),
            rules: rules.into(),
        }
    }

    /// Creates a schema from `(key, type)` pairs.
    pub fn from_fields<K>(
        fields: impl IntoIterator<Item = (K, TypeTag)>,
        rules: impl Into<SchemaRules>,
    ) -> Self
    where
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            rules: rules.into(),
        }
    }

    /// Starts a [`SchemaBuilder`].
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Registers (or replaces) a field.
    ///
    /// Meant for setup; registering while other threads call `check` needs
    /// external synchronization.
    pub fn add_field(&mut self, key: impl Into<String>, tag: TypeTag) {
        self.fields.insert(key.into(), tag);
    }

    /// The configured rules.
    pub fn rules(&self) -> SchemaRules {
        self.rules
    }

    /// Registered fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, TypeTag)> {
        self.fields.iter().map(|(k, t)| (k.as_str(), *t))
    }

    fn check_object(&self, input: &Map<String, Value>) -> ValidationResult<Value> {
        if input.len() < self.fields.len() {
            return Err(Failure::missing_keys("Missing keys"));
        }
        if input.len() > self.fields.len() && self.rules.excess == ExcessPolicy::Forbid {
            return Err(Failure::excess_keys(format!(
                "Schema does not allow excess keys. Excess keys: {}",
                excess_keys(input, |k| self.fields.contains_key(k)).join(", ")
            )));
        }

        for (key, &tag) in &self.fields {
            let Some(value) = input.get(key) else {
                return Err(Failure::missing_keys(format!("Missing key: {key}")).with_key(key));
            };
            admit(key, tag, value)?;
        }

        Ok(Value::Object(sanitized(input, self.rules.excess, |k| {
            self.fields.contains_key(k)
        })))
    }
}

fn admit(key: &str, tag: TypeTag, value: &Value) -> ValidationResult<()> {
    match tag {
        TypeTag::NestedSchema => Err(Failure::internal(format!(
            "Nested schemas are not supported by the minimal validator. Key: {key}"
        ))
        .with_key(key)),
        tag if tag.matches(value) => Ok(()),
        tag => Err(Failure::wrong_type(format!(
            "Type mismatch. Expected {tag}, got {}",
            TypeTag::of(value)
        ))
        .with_key(key)),
    }
}

impl Check for Schema {
    fn check(&self, input: &Value) -> ValidationResult<Value> {
        let result = guarded("schema", || match input {
            Value::Object(map) => self.check_object(map),
            other => Err(Failure::wrong_type(format!(
                "The value isn't an object, but {}",
                TypeTag::of(other)
            ))),
        });
        log_outcome("schema", &result);
        result
    }

    fn length(&self) -> usize {
        self.fields.len()
    }

    fn describe(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, t)| (k.clone(), Value::from(t.as_str())))
                .collect(),
        )
    }
}

impl serde::Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.describe().serialize(serializer)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Fluent construction of a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: IndexMap<String, TypeTag>,
    rules: SchemaRules,
}

impl SchemaBuilder {
    /// Adds a field.
    #[must_use = "builder methods must be chained or built"]
    pub fn field(mut self, key: impl Into<String>, tag: TypeTag) -> Self {
        self.fields.insert(key.into(), tag);
        self
    }

    /// Sets the excess-key policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn excess(mut self, policy: ExcessPolicy) -> Self {
        self.rules.excess = policy;
        self
    }

    /// Finishes the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
            rules: self.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::FailureKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn person(excess: ExcessPolicy) -> Schema {
        Schema::builder()
            .field("name", TypeTag::String)
            .field("age", TypeTag::Number)
            .excess(excess)
            .build()
    }

    #[test]
    fn cleans_excess_keys_by_default() {
        let clean = person(ExcessPolicy::default())
            .check(&json!({"name": "John", "age": 30, "extra": "x"}))
            .unwrap();
        assert_eq!(clean, json!({"name": "John", "age": 30}));
    }

    #[test]
    fn keep_returns_excess_keys() {
        let input = json!({"name": "John", "age": 30, "extra": "x"});
        let kept = person(ExcessPolicy::Keep).check(&input).unwrap();
        assert_eq!(kept, input);
    }

    #[test]
    fn forbid_rejects_excess_keys_and_lists_them() {
        let failure = person(ExcessPolicy::Forbid)
            .check(&json!({"name": "John", "age": 30, "extra": "x"}))
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExcessKeys);
        assert!(failure.message.ends_with("Excess keys: extra"));
    }

    #[test]
    fn fewer_keys_fail_before_any_type_check() {
        let failure = person(ExcessPolicy::Clean)
            .check(&json!({"name": 1}))
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::MissingKeys);
    }

    #[test]
    fn same_count_with_wrong_key_is_missing_key() {
        let failure = person(ExcessPolicy::Clean)
            .check(&json!({"name": "John", "years": 30}))
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::MissingKeys);
        assert_eq!(failure.key.as_deref(), Some("age"));
    }

    #[rstest]
    #[case(TypeTag::Any, json!(null), true)]
    #[case(TypeTag::Any, json!({"x": 1}), true)]
    #[case(TypeTag::Array, json!([1, 2]), true)]
    #[case(TypeTag::Array, json!({"0": 1}), false)]
    #[case(TypeTag::Object, json!([1, 2]), false)]
    #[case(TypeTag::Boolean, json!(false), true)]
    #[case(TypeTag::Number, json!("30"), false)]
    #[case(TypeTag::Null, json!(null), true)]
    fn membership(#[case] tag: TypeTag, #[case] value: Value, #[case] accepted: bool) {
        let schema = Schema::builder().field("v", tag).build();
        let result = schema.check(&json!({ "v": value }));
        assert_eq!(result.is_ok(), accepted, "{tag} vs {value}");
        if let Err(failure) = result {
            assert_eq!(failure.kind, FailureKind::WrongType);
        }
    }

    #[test]
    fn null_is_present_not_missing() {
        let failure = person(ExcessPolicy::Clean)
            .check(&json!({"name": "John", "age": null}))
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::WrongType);
    }

    #[test]
    fn non_object_input_is_wrong_type() {
        let failure = person(ExcessPolicy::Clean).check(&json!(["John", 30])).unwrap_err();
        assert_eq!(failure.kind, FailureKind::WrongType);
    }

    #[test]
    fn nested_tag_is_internal_error() {
        let schema = Schema::builder().field("a", TypeTag::NestedSchema).build();
        let failure = schema.check(&json!({"a": {}})).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InternalError);
    }

    #[test]
    fn length_and_description() {
        let schema = person(ExcessPolicy::Clean);
        assert_eq!(schema.length(), 2);
        assert_eq!(schema.describe(), json!({"name": "string", "age": "number"}));
        assert_eq!(serde_json::to_value(&schema).unwrap(), schema.describe());
    }

    #[test]
    fn add_field_after_construction() {
        let mut schema = Schema::new(ExcessPolicy::Forbid);
        schema.add_field("id", TypeTag::Number);
        assert_eq!(schema.length(), 1);
        assert!(schema.check(&json!({"id": 7})).is_ok());
        assert_eq!(schema.rules().excess, ExcessPolicy::Forbid);
    }
}
