//! Type tags
//!
//! A closed vocabulary for "what shape is this JSON value". Membership tests
//! are pattern matches on [`serde_json::Value`], never string comparisons.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The shape a field accepts.
///
/// `Array`, `Null` and `Object` are distinct: a JSON array is never an
/// object, and `null` is never an object either.
///
/// # Examples
///
/// ```
/// use sift_validator::foundation::TypeTag;
/// use serde_json::json;
///
/// assert_eq!(TypeTag::of(&json!([1, 2])), TypeTag::Array);
/// assert!(TypeTag::Any.matches(&json!(null)));
/// assert!(!TypeTag::Object.matches(&json!(null)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeTag {
    /// A JSON string.
    String,
    /// A JSON number, integer or float.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A keyed record (`{...}`).
    Object,
    /// A list (`[...]`).
    Array,
    /// Exactly `null`.
    Null,
    /// Any present value.
    Any,
    /// A keyed record that must also pass a nested validator.
    NestedSchema,
}

impl TypeTag {
    /// Returns the runtime tag of a value.
    ///
    /// Never returns [`TypeTag::Any`] or [`TypeTag::NestedSchema`]; those are
    /// acceptance criteria, not runtime shapes.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }

    /// Tests shape membership.
    ///
    /// [`TypeTag::NestedSchema`] only checks that the value is a keyed record;
    /// running the nested validator is the caller's job since the tag alone
    /// does not know which validator to run.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::NestedSchema => value.is_object(),
            tag => tag == Self::of(value),
        }
    }

    /// Returns the lowercase name used in descriptions and definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Any => "any",
            Self::NestedSchema => "nested-schema",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
