//! Wire shape for validation outcomes
//!
//! Hosts that return validation outcomes over an API boundary want a stable,
//! tagged JSON shape rather than a Rust `Result`. [`ValidationReport`] is that
//! shape:
//!
//! ```json
//! { "success": true,  "value": { "name": "John" } }
//! { "success": false, "type": "MISSING_KEYS", "message": "Missing keys" }
//! ```

use serde::{Deserialize, Serialize};

use crate::foundation::{Failure, FailureKind, ValidationResult};

/// Serializable form of a [`ValidationResult`].
///
/// # Examples
///
/// ```
/// use sift_validator::foundation::{Failure, ValidationReport, ValidationResult};
/// use serde_json::{Value, json};
///
/// let result: ValidationResult<Value> = Err(Failure::missing_keys("Missing keys"));
/// let report = ValidationReport::from(result);
/// assert_eq!(
///     serde_json::to_value(&report).unwrap(),
///     json!({"success": false, "type": "MISSING_KEYS", "message": "Missing keys"}),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationReport<T> {
    /// The input was accepted.
    Success {
        /// Always `true`.
        success: Accepted,
        /// The sanitized value.
        value: T,
    },
    /// The input was rejected.
    Failure {
        /// Always `false`.
        success: Rejected,
        /// Failure classification.
        #[serde(rename = "type")]
        kind: FailureKind,
        /// Diagnostic message.
        message: String,
        /// Offending key, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },
}

impl<T> ValidationReport<T> {
    /// Returns `true` for an accepted input.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts back into a [`ValidationResult`].
    ///
    /// Chained causes are not part of the wire shape and are not restored.
    pub fn into_result(self) -> ValidationResult<T> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure {
                kind, message, key, ..
            } => {
                let failure = Failure::new(kind, message);
                Err(match key {
                    Some(key) => failure.with_key(key),
                    None => failure,
                })
            }
        }
    }
}

impl<T> From<ValidationResult<T>> for ValidationReport<T> {
    fn from(result: ValidationResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success {
                success: Accepted,
                value,
            },
            Err(failure) => Self::Failure {
                success: Rejected,
                kind: failure.kind,
                message: failure.message.into_owned(),
                key: failure.key,
            },
        }
    }
}

macro_rules! literal_bool {
    ($(#[$meta:meta])* $name:ident = $value:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_bool($value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if bool::deserialize(deserializer)? == $value {
                    Ok($name)
                } else {
                    Err(serde::de::Error::custom(concat!("expected `", stringify!($value), "`")))
                }
            }
        }
    };
}

literal_bool!(
    /// Serializes as the literal `true`.
    Accepted = true
);
literal_bool!(
    /// Serializes as the literal `false`.
    Rejected = false
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[test]
    fn success_shape() {
        let report = ValidationReport::from(Ok::<_, Failure>(json!({"name": "John"})));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"success": true, "value": {"name": "John"}})
        );
    }

    #[test]
    fn failure_shape_carries_key() {
        let result: ValidationResult<Value> =
            Err(Failure::wrong_type("Type mismatch. Key: age").with_key("age"));
        let report = ValidationReport::from(result);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "success": false,
                "type": "WRONG_TYPE",
                "message": "Type mismatch. Key: age",
                "key": "age"
            })
        );
    }

    #[test]
    fn deserializes_by_success_flag() {
        let report: ValidationReport<Value> = serde_json::from_value(json!({
            "success": false,
            "type": "EXCESS_KEYS",
            "message": "Excess keys: extra"
        }))
        .unwrap();
        assert!(!report.is_success());
        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExcessKeys);

        let report: ValidationReport<Value> =
            serde_json::from_value(json!({"success": true, "value": 1})).unwrap();
        assert_eq!(report.into_result().unwrap(), json!(1));
    }
}
