//! Field definitions
//!
//! A [`FieldDefinition`] is the declarative rule for one schema key: which
//! [`TypeTag`]s it accepts, an optional [`Predicate`], the [`UndefinedPolicy`]
//! for an absent key, and an optional display label. Nested-schema fields also
//! carry a shared reference to the validator that checks their value.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use smallvec::SmallVec;

use crate::foundation::{Check, Failure, SchemaError, TypeTag, ValidationResult};
use crate::schema::{IntoVerdict, Predicate, UndefinedPolicy};

// ============================================================================
// FIELD OPTIONS
// ============================================================================

/// Optional settings shared by every way of registering a field.
///
/// # Examples
///
/// ```
/// use sift_validator::schema::{FieldOptions, UndefinedPolicy};
/// use serde_json::Value;
///
/// let options = FieldOptions::new()
///     .with_predicate(|v: Option<&Value>| v.is_none_or(Value::is_string))
///     .allow_undefined()
///     .displayed_as("nickname");
/// assert_eq!(options.undefined, UndefinedPolicy::Allow);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// Extra acceptance criterion.
    pub predicate: Option<Predicate>,
    /// Absent-key handling.
    pub undefined: UndefinedPolicy,
    /// Overrides the generated description.
    pub displayed_as: Option<String>,
}

impl FieldOptions {
    /// Default options: no predicate, absent key forbidden, no label.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the predicate.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_predicate<F, R>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        self.predicate = Some(Predicate::new(f));
        self
    }

    /// Sets an already-built predicate.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Sets the absent-key policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_undefined(mut self, policy: UndefinedPolicy) -> Self {
        self.undefined = policy;
        self
    }

    /// Shorthand for `with_undefined(UndefinedPolicy::Allow)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_undefined(self) -> Self {
        self.with_undefined(UndefinedPolicy::Allow)
    }

    /// Sets the display label.
    #[must_use = "builder methods must be chained or built"]
    pub fn displayed_as(mut self, label: impl Into<String>) -> Self {
        self.displayed_as = Some(label.into());
        self
    }

    /// Keeps an existing label, or falls back to `label`.
    pub(crate) fn label_or(mut self, label: impl Into<String>) -> Self {
        if self.displayed_as.is_none() {
            self.displayed_as = Some(label.into());
        }
        self
    }
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

/// The acceptance rule for one schema key.
///
/// The accepted type set is never empty: [`FieldDefinition::new`] rejects an
/// empty set, and every other constructor supplies at least one tag.
#[derive(Clone)]
pub struct FieldDefinition {
    accepted: SmallVec<[TypeTag; 2]>,
    predicate: Option<Predicate>,
    undefined: UndefinedPolicy,
    displayed_as: Option<String>,
    nested: Option<Arc<dyn Check>>,
}

impl FieldDefinition {
    /// Creates a field accepting any of `types`.
    ///
    /// Duplicate tags are dropped; order is kept for membership testing and
    /// for the generated description.
    pub fn new(types: impl IntoIterator<Item = TypeTag>) -> Result<Self, SchemaError> {
        let mut accepted: SmallVec<[TypeTag; 2]> = SmallVec::new();
        for tag in types {
            if !accepted.contains(&tag) {
                accepted.push(tag);
            }
        }
        if accepted.is_empty() {
            return Err(SchemaError::EmptyTypeSet {
                key: "<anonymous>".to_owned(),
            });
        }
        Ok(Self {
            accepted,
            predicate: None,
            undefined: UndefinedPolicy::Forbid,
            displayed_as: None,
            nested: None,
        })
    }

    /// Creates a field accepting a single type.
    #[must_use]
    pub fn of(tag: TypeTag) -> Self {
        Self {
            accepted: smallvec::smallvec![tag],
            predicate: None,
            undefined: UndefinedPolicy::Forbid,
            displayed_as: None,
            nested: None,
        }
    }

    /// Creates a nested-schema field validated by `schema`.
    #[must_use]
    pub fn nested(schema: Arc<dyn Check>) -> Self {
        Self {
            nested: Some(schema),
            ..Self::of(TypeTag::NestedSchema)
        }
    }

    /// Adds another accepted type.
    #[must_use = "builder methods must be chained or built"]
    pub fn or(mut self, tag: TypeTag) -> Self {
        if !self.accepted.contains(&tag) {
            self.accepted.push(tag);
        }
        self
    }

    /// Applies a set of [`FieldOptions`].
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.predicate = options.predicate;
        self.undefined = options.undefined;
        self.displayed_as = options.displayed_as;
        self
    }

    /// Sets the predicate.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_predicate<F, R>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        self.predicate = Some(Predicate::new(f));
        self
    }

    /// Sets the absent-key policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_undefined(mut self, policy: UndefinedPolicy) -> Self {
        self.undefined = policy;
        self
    }

    /// Shorthand for `with_undefined(UndefinedPolicy::Allow)`.
    #[must_use = "builder methods must be chained or built"]
    pub fn allow_undefined(self) -> Self {
        self.with_undefined(UndefinedPolicy::Allow)
    }

    /// Sets the display label.
    #[must_use = "builder methods must be chained or built"]
    pub fn displayed_as(mut self, label: impl Into<String>) -> Self {
        self.displayed_as = Some(label.into());
        self
    }

    /// Attaches the validator used for [`TypeTag::NestedSchema`] membership.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_nested(mut self, schema: Arc<dyn Check>) -> Self {
        self.nested = Some(schema);
        self
    }

    /// Accepted types, in declaration order.
    pub fn accepted_types(&self) -> &[TypeTag] {
        &self.accepted
    }

    /// The predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// The absent-key policy.
    pub fn undefined(&self) -> UndefinedPolicy {
        self.undefined
    }

    /// The display label, if any.
    pub fn label(&self) -> Option<&str> {
        self.displayed_as.as_deref()
    }

    /// The nested validator, if any.
    pub fn nested_schema(&self) -> Option<&Arc<dyn Check>> {
        self.nested.as_ref()
    }

    fn is_nested_only(&self) -> bool {
        self.accepted.as_slice() == [TypeTag::NestedSchema]
    }

    /// Tests type membership for a present value, short-circuiting on the
    /// first accepted tag that matches.
    ///
    /// Returns the value to place in the sanitized output: the nested
    /// validator's sanitized copy for a nested-schema match, otherwise `None`
    /// (keep the input value).
    pub(crate) fn admit(&self, key: &str, value: &Value) -> ValidationResult<Option<Value>> {
        for &tag in &self.accepted {
            match tag {
                TypeTag::NestedSchema if value.is_object() => {
                    let Some(schema) = &self.nested else {
                        return Err(
                            Failure::internal(format!("Schema is not defined for key: {key}"))
                                .with_key(key),
                        );
                    };
                    return match schema.check(value) {
                        Ok(clean) => Ok(Some(clean)),
                        Err(cause) => Err(Failure::wrong_type(format!(
                            "Nested schema failed. Key: {key}"
                        ))
                        .with_key(key)
                        .with_cause(cause)),
                    };
                }
                tag if tag != TypeTag::NestedSchema && tag.matches(value) => return Ok(None),
                _ => {}
            }
        }
        Err(Failure::wrong_type(format!(
            "Type mismatch. Key: {key}, expected {}, got {}",
            self.type_list(),
            TypeTag::of(value)
        ))
        .with_key(key))
    }

    fn type_list(&self) -> String {
        self.accepted
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Human-readable description of the accepted shape.
    pub fn describe(&self) -> Value {
        if let Some(label) = &self.displayed_as {
            return Value::String(label.clone());
        }
        if let (true, Some(schema)) = (self.is_nested_only(), &self.nested) {
            return schema.describe();
        }
        let mut types = self.type_list();
        if self.predicate.is_some() {
            types.push_str(" (callback)");
        }
        Value::String(types)
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("accepted", &self.accepted)
            .field("predicate", &self.predicate)
            .field("undefined", &self.undefined)
            .field("displayed_as", &self.displayed_as)
            .field("nested", &self.nested.as_ref().map(|_| "<schema>"))
            .finish()
    }
}
