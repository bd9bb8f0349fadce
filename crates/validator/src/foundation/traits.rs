//! Core traits for the validation system
//!
//! This module defines the contract every validator implements, and the
//! unwind boundary that keeps user code from crashing a `check` call.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::foundation::{Failure, ValidationResult};

// ============================================================================
// CORE VALIDATOR TRAIT
// ============================================================================

/// The contract shared by [`Schema`](crate::schema::Schema) and
/// [`ExtendedSchema`](crate::schema::ExtendedSchema).
///
/// Nested-schema fields hold validators as `Arc<dyn Check>`, so any type
/// implementing this trait can be plugged in as a sub-schema or as the element
/// validator of an array field.
///
/// `check` is a pure function of the validator's state and its input: it never
/// mutates either, and on success hands back a fresh sanitized value.
///
/// # Examples
///
/// ```
/// use sift_validator::foundation::{Check, Failure, ValidationResult};
/// use serde_json::{Value, json};
///
/// struct NonEmptyObject;
///
/// impl Check for NonEmptyObject {
///     fn check(&self, input: &Value) -> ValidationResult<Value> {
///         match input.as_object() {
///             Some(map) if !map.is_empty() => Ok(input.clone()),
///             _ => Err(Failure::wrong_type("expected a non-empty object")),
///         }
///     }
///
///     fn length(&self) -> usize {
///         0
///     }
///
///     fn describe(&self) -> Value {
///         json!("non-empty object")
///     }
/// }
///
/// assert!(NonEmptyObject.check(&json!({"a": 1})).is_ok());
/// assert!(NonEmptyObject.check(&json!({})).is_err());
/// ```
pub trait Check: Send + Sync {
    /// Validates `input`, returning a sanitized copy or the first failure.
    ///
    /// Must never panic on any input; every failure mode is a returned value.
    fn check(&self, input: &Value) -> ValidationResult<Value>;

    /// Number of registered top-level fields.
    fn length(&self) -> usize;

    /// Human-readable description of the accepted shape.
    ///
    /// Diagnostic only; never consulted by `check`.
    fn describe(&self) -> Value;

    /// Returns `true` when no fields are registered.
    fn is_empty(&self) -> bool {
        self.length() == 0
    }
}

// ============================================================================
// UNWIND BOUNDARY
// ============================================================================

/// Runs `f`, converting a panic into [`FailureKind::InternalError`](crate::foundation::FailureKind::InternalError).
///
/// Used around predicates and around whole `check` bodies, which may call into
/// user-implemented [`Check`] types. The panic message is logged at `debug`
/// level and deliberately kept out of the returned failure.
pub(crate) fn guarded<T>(
    context: &str,
    f: impl FnOnce() -> ValidationResult<T>,
) -> ValidationResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            tracing::debug!(
                context,
                panic = %panic_message(payload.as_ref()),
                "caught panic during validation"
            );
            Err(Failure::internal("Internal error"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::FailureKind;
    use serde_json::json;

    struct AlwaysValid;

    impl Check for AlwaysValid {
        fn check(&self, input: &Value) -> ValidationResult<Value> {
            Ok(input.clone())
        }

        fn length(&self) -> usize {
            0
        }

        fn describe(&self) -> Value {
            json!({})
        }
    }

    #[test]
    fn test_check_trait() {
        let validator = AlwaysValid;
        assert!(validator.check(&json!({"a": 1})).is_ok());
        assert!(validator.is_empty());
    }

    #[test]
    fn guarded_passes_results_through() {
        let ok: ValidationResult<u8> = guarded("test", || Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: ValidationResult<u8> = guarded("test", || Err(Failure::wrong_type("nope")));
        assert_eq!(err.unwrap_err().kind, FailureKind::WrongType);
    }

    #[test]
    fn guarded_converts_panics() {
        let result: ValidationResult<()> = guarded("test", || panic!("boom"));
        let failure = result.unwrap_err();
        assert_eq!(failure.kind, FailureKind::InternalError);
        assert!(!failure.message.contains("boom"));
    }

    #[test]
    fn panic_message_handles_owned_and_static_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let fixed: Box<dyn Any + Send> = Box::new("fixed");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(fixed.as_ref()), "fixed");
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }
}
