//! The extended validator
//!
//! Per-key [`FieldDefinition`]s with type unions, nested sub-schemas,
//! predicates and an undefined policy per field. Fields are evaluated in
//! registration order and the first failure wins.
//!
//! # Reconciliation
//!
//! 1. The input must be a keyed record.
//! 2. Under [`ExcessPolicy::Forbid`], more input keys than fields is an
//!    `EXCESS_KEYS` failure naming the excess keys.
//! 3. For each field:
//!    - absent key: forbidden unless the policy is `allow`; when allowed, only
//!      the predicate runs (with `None`), the type set is not consulted;
//!    - present key: type membership, then the predicate.
//! 4. Every field must have been satisfied.
//! 5. The sanitized value is built according to the excess policy.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::foundation::{Check, Failure, SchemaError, TypeTag, ValidationResult, guarded};
use crate::schema::{
    ExcessPolicy, FieldDefinition, FieldOptions, SchemaRules, excess_keys, log_outcome, sanitized,
};

/// Validates keyed records against a registry of [`FieldDefinition`]s.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sift_validator::foundation::{Check, FailureKind};
/// use sift_validator::schema::{ExtendedSchema, FieldOptions};
/// use serde_json::json;
///
/// let mut address = ExtendedSchema::default();
/// address.add_string_field("city", FieldOptions::new());
///
/// let mut user = ExtendedSchema::default();
/// user.add_string_field("name", FieldOptions::new());
/// user.add_nested_schema_field("address", Arc::new(address), FieldOptions::new());
///
/// assert!(user.check(&json!({"name": "Ann", "address": {"city": "Oslo"}})).is_ok());
///
/// let failure = user.check(&json!({"name": "Ann", "address": {"city": 123}})).unwrap_err();
/// assert_eq!(failure.kind, FailureKind::WrongType);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtendedSchema {
    fields: IndexMap<String, FieldDefinition>,
    rules: SchemaRules,
}

impl ExtendedSchema {
    /// Creates an empty schema with the given rules.
    pub fn new(rules: impl Into<SchemaRules>) -> Self {
        Self {
            fields: IndexMap::new(),
            rules: rules.into(),
        }
    }

    /// Registers (or replaces) a field.
    ///
    /// Meant for setup; registering while other threads call `check` needs
    /// external synchronization.
    pub fn add_field(&mut self, key: impl Into<String>, field: FieldDefinition) {
        self.fields.insert(key.into(), field);
    }

    /// Registers a field accepting any of `types`.
    pub fn add_typed_field(
        &mut self,
        key: impl Into<String>,
        types: impl IntoIterator<Item = TypeTag>,
        options: FieldOptions,
    ) -> Result<(), SchemaError> {
        let key = key.into();
        let field = FieldDefinition::new(types)
            .map_err(|_| SchemaError::EmptyTypeSet { key: key.clone() })?
            .with_options(options);
        self.add_field(key, field);
        Ok(())
    }

    /// Registers a field validated recursively by `schema`.
    ///
    /// The same `Arc` may back fields in any number of parent schemas.
    pub fn add_nested_schema_field(
        &mut self,
        key: impl Into<String>,
        schema: Arc<dyn Check>,
        options: FieldOptions,
    ) {
        self.add_field(key, FieldDefinition::nested(schema).with_options(options));
    }

    /// The configured rules.
    pub fn rules(&self) -> SchemaRules {
        self.rules
    }

    /// Looks up a field definition.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    /// Registered fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    fn check_object(&self, input: &Map<String, Value>) -> ValidationResult<Value> {
        if input.len() > self.fields.len() && self.rules.excess == ExcessPolicy::Forbid {
            return Err(Failure::excess_keys(format!(
                "Schema does not allow excess keys. Excess keys: {}",
                excess_keys(input, |k| self.fields.contains_key(k)).join(", ")
            )));
        }

        let mut satisfied = 0_usize;
        let mut replacements: Vec<(&str, Value)> = Vec::new();

        for (key, field) in &self.fields {
            match input.get(key) {
                None => {
                    if !field.undefined().allows() {
                        return Err(Failure::wrong_type(format!(
                            "Schema forbids undefined values. Key: {key}"
                        ))
                        .with_key(key));
                    }
                    if let Some(predicate) = field.predicate() {
                        predicate.evaluate(key, None)?;
                    }
                }
                Some(value) => {
                    if let Some(clean) = field.admit(key, value)? {
                        replacements.push((key.as_str(), clean));
                    }
                    if let Some(predicate) = field.predicate() {
                        predicate.evaluate(key, Some(value))?;
                    }
                }
            }
            satisfied += 1;
        }

        if satisfied < self.fields.len() {
            return Err(Failure::missing_keys(format!(
                "Missing keys: {}",
                self.fields.keys().skip(satisfied).cloned().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut output = sanitized(input, self.rules.excess, |k| self.fields.contains_key(k));
        for (key, clean) in replacements {
            if let Some(slot) = output.get_mut(key) {
                *slot = clean;
            }
        }
        Ok(Value::Object(output))
    }
}

impl Check for ExtendedSchema {
    fn check(&self, input: &Value) -> ValidationResult<Value> {
        let result = guarded("extended_schema", || match input {
            Value::Object(map) => self.check_object(map),
            other => Err(Failure::wrong_type(format!(
                "The value isn't an object, but {}",
                TypeTag::of(other)
            ))),
        });
        log_outcome("extended_schema", &result);
        result
    }

    fn length(&self) -> usize {
        self.fields.len()
    }

    fn describe(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, field)| {
                    let key = if field.undefined().allows() {
                        format!("{key}?")
                    } else {
                        key.clone()
                    };
                    (key, field.describe())
                })
                .collect(),
        )
    }
}

impl serde::Serialize for ExtendedSchema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.describe().serialize(serializer)
    }
}
