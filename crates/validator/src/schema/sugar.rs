//! Field registration shortcuts
//!
//! Thin wrappers over [`ExtendedSchema::add_field`] that pre-fill a type set,
//! and for a few of them a built-in predicate and display label. A built-in
//! predicate runs before the caller's own predicate; both must pass.
//!
//! Built-in checks only look at present values. An absent key (allowed with
//! [`FieldOptions::allow_undefined`]) goes straight to the caller's predicate.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::foundation::{Check, TypeTag};
use crate::schema::{ExtendedSchema, FieldDefinition, FieldOptions, Predicate, Verdict};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .unwrap()
});

/// JavaScript-style truthiness: `null`, `false`, `0`, `""` and absence are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Puts `builtin` in front of the caller's predicate and defaults the label.
fn prepend(builtin: Predicate, options: FieldOptions, label: impl Into<String>) -> FieldOptions {
    let FieldOptions {
        predicate,
        undefined,
        displayed_as,
    } = options;
    FieldOptions {
        predicate: Some(builtin.then(predicate)),
        undefined,
        displayed_as,
    }
    .label_or(label)
}

impl ExtendedSchema {
    fn add_with(&mut self, key: impl Into<String>, field: FieldDefinition, options: FieldOptions) {
        self.add_field(key, field.with_options(options));
    }

    /// Registers a `string` field.
    pub fn add_string_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_with(key, FieldDefinition::of(TypeTag::String), options);
    }

    /// Registers a `number` field.
    pub fn add_number_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_with(key, FieldDefinition::of(TypeTag::Number), options);
    }

    /// Registers a `null` field.
    pub fn add_null_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_with(key, FieldDefinition::of(TypeTag::Null), options);
    }

    /// Registers a `number | null` field.
    pub fn add_number_or_null_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        let field = FieldDefinition::of(TypeTag::Number).or(TypeTag::Null);
        self.add_with(key, field, options);
    }

    /// Registers a `string | null` field.
    pub fn add_string_or_null_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        let field = FieldDefinition::of(TypeTag::String).or(TypeTag::Null);
        self.add_with(key, field, options);
    }

    /// Registers a `boolean` field.
    pub fn add_boolean_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_with(key, FieldDefinition::of(TypeTag::Boolean), options);
    }

    /// Registers an `array` field.
    pub fn add_array_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_with(key, FieldDefinition::of(TypeTag::Array), options);
    }

    /// Registers a string field that must match `regex`.
    ///
    /// Described as `"REGEX string"` unless labelled, so the pattern itself
    /// never shows up in [`describe`](crate::foundation::Check::describe).
    pub fn add_regex_field(&mut self, key: impl Into<String>, regex: Regex, options: FieldOptions) {
        let pattern = Predicate::new(move |value: Option<&Value>| match value {
            None => true,
            Some(Value::String(s)) => regex.is_match(s),
            Some(_) => false,
        });
        let options = prepend(pattern, options, "REGEX string");
        self.add_with(key, FieldDefinition::of(TypeTag::String), options);
    }

    /// Registers a string field holding an email address.
    pub fn add_email_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        self.add_regex_field(key, EMAIL_REGEX.clone(), options.label_or("email"));
    }

    /// Registers a boolean field that must be falsy.
    pub fn add_falsy_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        let falsy = Predicate::new(|value: Option<&Value>| value.is_none() || !is_truthy(value));
        let options = prepend(falsy, options, "false");
        self.add_with(key, FieldDefinition::of(TypeTag::Boolean), options);
    }

    /// Registers a boolean field that must be truthy.
    pub fn add_truthy_field(&mut self, key: impl Into<String>, options: FieldOptions) {
        let truthy = Predicate::new(|value: Option<&Value>| value.is_none() || is_truthy(value));
        let options = prepend(truthy, options, "true");
        self.add_with(key, FieldDefinition::of(TypeTag::Boolean), options);
    }

    /// Registers an array field whose every element must pass `element`.
    ///
    /// The first failing element rejects the field with
    /// [`CallbackFailed`](crate::foundation::FailureKind::CallbackFailed),
    /// naming its index. Described as `array<{element description}>`.
    pub fn add_array_of_elements_field(
        &mut self,
        key: impl Into<String>,
        element: Arc<dyn Check>,
        options: FieldOptions,
    ) {
        let label = format!("array<{}>", element.describe());
        let elements = Predicate::new(move |value: Option<&Value>| match value {
            None => Verdict::pass(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .find_map(|(index, item)| {
                    element.check(item).err().map(|failure| {
                        Verdict::fail_with(format!(
                            "Element {index} validation failed: {}",
                            failure.message
                        ))
                    })
                })
                .unwrap_or_else(Verdict::pass),
            Some(_) => Verdict::fail(),
        });
        let options = prepend(elements, options, label);
        self.add_with(key, FieldDefinition::of(TypeTag::Array), options);
    }
}
