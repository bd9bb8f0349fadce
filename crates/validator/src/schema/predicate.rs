//! Custom field predicates
//!
//! A predicate is an extra acceptance criterion evaluated after a field's type
//! check (or, for an absent value under [`UndefinedPolicy::Allow`], instead of
//! it). Its outcome is a single typed shape, [`Verdict`]: pass, or fail with an
//! optional reason.
//!
//! Closures can return anything implementing [`IntoVerdict`]:
//!
//! | Return type            | Meaning                                          |
//! |------------------------|--------------------------------------------------|
//! | `bool`                 | pass / fail without a reason                     |
//! | `(bool, String)`       | pass / fail with a reason                        |
//! | `Verdict`              | as is                                            |
//! | `Result<R, E>`         | `Err` is a predicate fault (internal error)      |
//! | `serde_json::Value`    | `true`, `false` or `[bool, "reason"]`; anything  |
//! |                        | else is malformed (internal error)               |
//!
//! [`UndefinedPolicy::Allow`]: crate::schema::UndefinedPolicy::Allow

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::{Failure, ValidationResult, guarded};

// ============================================================================
// VERDICT
// ============================================================================

/// The outcome of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the value is accepted.
    pub passed: bool,
    /// Explanation reported as the failure message when `passed` is false.
    pub reason: Option<String>,
}

impl Verdict {
    /// An accepting verdict.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    /// A rejecting verdict without a reason.
    #[must_use]
    pub const fn fail() -> Self {
        Self {
            passed: false,
            reason: None,
        }
    }

    /// A rejecting verdict carrying a reason.
    pub fn fail_with(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        Self {
            passed,
            reason: None,
        }
    }
}

/// A predicate produced a result that cannot be read as a [`Verdict`], or
/// reported an error of its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed predicate result: {0}")]
pub struct MalformedVerdict(pub String);

// ============================================================================
// INTO VERDICT
// ============================================================================

/// Conversion from a predicate's return value into a [`Verdict`].
pub trait IntoVerdict {
    /// Performs the conversion.
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict>;
}

impl IntoVerdict for Verdict {
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        Ok(self)
    }
}

impl IntoVerdict for bool {
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        Ok(Verdict::from(self))
    }
}

impl IntoVerdict for (bool, String) {
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        Ok(Verdict {
            passed: self.0,
            reason: Some(self.1),
        })
    }
}

impl IntoVerdict for (bool, &str) {
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        (self.0, self.1.to_owned()).into_verdict()
    }
}

impl<R, E> IntoVerdict for Result<R, E>
where
    R: IntoVerdict,
    E: fmt::Display,
{
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        match self {
            Ok(inner) => inner.into_verdict(),
            Err(e) => Err(MalformedVerdict(format!("predicate returned an error: {e}"))),
        }
    }
}

impl IntoVerdict for Value {
    fn into_verdict(self) -> Result<Verdict, MalformedVerdict> {
        match self {
            Value::Bool(passed) => Ok(Verdict::from(passed)),
            Value::Array(mut pair) if pair.len() == 2 => match (pair.pop(), pair.pop()) {
                (Some(Value::String(reason)), Some(Value::Bool(passed))) => Ok(Verdict {
                    passed,
                    reason: Some(reason),
                }),
                (reason, passed) => Err(MalformedVerdict(format!(
                    "expected [boolean, string], got [{}, {}]",
                    passed.unwrap_or_default(),
                    reason.unwrap_or_default()
                ))),
            },
            other => Err(MalformedVerdict(format!(
                "expected boolean or [boolean, string], got {other}"
            ))),
        }
    }
}

// ============================================================================
// PREDICATE
// ============================================================================

type PredicateFn = dyn Fn(Option<&Value>) -> Result<Verdict, MalformedVerdict> + Send + Sync;

/// A shareable, type-erased field predicate.
///
/// The argument is `None` when the key is absent from the input.
///
/// # Examples
///
/// ```
/// use sift_validator::schema::Predicate;
/// use serde_json::{Value, json};
///
/// let non_negative = Predicate::new(|v: Option<&Value>| {
///     match v.and_then(Value::as_f64) {
///         Some(n) if n >= 0.0 => (true, String::new()),
///         _ => (false, "age must be non-negative".to_owned()),
///     }
/// });
///
/// assert!(non_negative.evaluate("age", Some(&json!(30))).is_ok());
/// let failure = non_negative.evaluate("age", Some(&json!(-5))).unwrap_err();
/// assert_eq!(failure.message, "age must be non-negative");
/// ```
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wraps a closure.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        Self(Arc::new(move |value: Option<&Value>| f(value).into_verdict()))
    }

    /// Runs the predicate without any unwind protection.
    pub fn call(&self, value: Option<&Value>) -> Result<Verdict, MalformedVerdict> {
        (self.0)(value)
    }

    /// Runs `self`, then `next` if `self` passed.
    ///
    /// A missing `next` leaves `self` unchanged.
    #[must_use]
    pub fn then(self, next: Option<Predicate>) -> Predicate {
        match next {
            None => self,
            Some(next) => Predicate(Arc::new(move |value: Option<&Value>| {
                let first = self.call(value)?;
                if first.passed {
                    next.call(value)
                } else {
                    Ok(first)
                }
            })),
        }
    }

    /// Runs the predicate for field `key` inside an unwind boundary and maps
    /// its verdict to a validation outcome.
    ///
    /// - rejected: [`FailureKind::CallbackFailed`], with the reason as message
    /// - malformed result or panic: [`FailureKind::InternalError`]
    ///
    /// [`FailureKind::CallbackFailed`]: crate::foundation::FailureKind::CallbackFailed
    /// [`FailureKind::InternalError`]: crate::foundation::FailureKind::InternalError
    pub fn evaluate(&self, key: &str, value: Option<&Value>) -> ValidationResult<()> {
        guarded(key, || match self.call(value) {
            Ok(Verdict { passed: true, .. }) => Ok(()),
            Ok(Verdict {
                passed: false,
                reason: Some(reason),
            }) => Err(Failure::callback_failed(reason).with_key(key)),
            Ok(Verdict {
                passed: false,
                reason: None,
            }) => {
                let message = format!("Callback failed. Key: {key}");
                Err(Failure::callback_failed(message).with_key(key))
            }
            Err(malformed) => {
                tracing::debug!(key, error = %malformed, "bad predicate result");
                Err(Failure::internal("Internal error").with_key(key))
            }
        })
        .map_err(|failure| match failure.key {
            Some(_) => failure,
            None => failure.with_key(key),
        })
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(<function>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::FailureKind;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!([true, "fine"]), true)]
    #[case(json!([false, "nope"]), false)]
    fn value_results_are_read(#[case] raw: Value, #[case] passed: bool) {
        assert_eq!(raw.into_verdict().unwrap().passed, passed);
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(1))]
    #[case(json!("yes"))]
    #[case(json!([false]))]
    #[case(json!([false, "a", "b"]))]
    #[case(json!(["nope", false]))]
    #[case(json!([false, 7]))]
    fn malformed_value_results_are_rejected(#[case] raw: Value) {
        assert!(raw.into_verdict().is_err());
    }

    #[test]
    fn failing_without_reason_names_the_key() {
        let p = Predicate::new(|_: Option<&Value>| false);
        let failure = p.evaluate("name", Some(&json!("x"))).unwrap_err();
        assert_eq!(failure.kind, FailureKind::CallbackFailed);
        assert_eq!(failure.message, "Callback failed. Key: name");
        assert_eq!(failure.key.as_deref(), Some("name"));
    }

    #[test]
    fn malformed_result_is_internal_error() {
        let p = Predicate::new(|_: Option<&Value>| json!({"ok": true}));
        let failure = p.evaluate("name", Some(&json!("x"))).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InternalError);
    }

    #[test]
    fn predicate_error_is_internal_error() {
        let p = Predicate::new(|_: Option<&Value>| Err::<bool, _>("lookup failed"));
        let failure = p.evaluate("name", None).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InternalError);
    }

    #[test]
    fn panicking_predicate_is_internal_error() {
        let p = Predicate::new(|_: Option<&Value>| -> bool { panic!("Error") });
        let failure = p.evaluate("name", Some(&json!("John"))).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InternalError);
        assert_eq!(failure.key.as_deref(), Some("name"));
    }

    #[test]
    fn then_short_circuits_on_failure() {
        let first = Predicate::new(|_: Option<&Value>| (false, "first"));
        let second = Predicate::new(|_: Option<&Value>| -> bool { panic!("must not run") });
        let chained = first.then(Some(second));
        assert_eq!(chained.call(None).unwrap(), Verdict::fail_with("first"));
    }

    #[test]
    fn then_runs_next_after_success() {
        let chained = Predicate::new(|_: Option<&Value>| true)
            .then(Some(Predicate::new(|_: Option<&Value>| (false, "second"))));
        assert_eq!(chained.call(None).unwrap().reason.as_deref(), Some("second"));
    }
}
