//! Error types for validation failures
//!
//! Two families live here:
//!
//! - [`Failure`] is what [`check`](crate::foundation::Check::check) returns when
//!   an input is rejected. It is a value, never a panic, and is classified by a
//!   closed [`FailureKind`].
//! - [`SchemaError`] is returned while *building* a schema (empty type sets,
//!   bad regex patterns, unreadable definitions). It never reaches `check`.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// FAILURE KIND
// ============================================================================

/// Classification of a rejected input.
///
/// The set is exhaustive: every failure the validators can produce falls into
/// exactly one of these buckets. Serialized in `SCREAMING_SNAKE_CASE`, which is
/// the wire shape hosts expose at their API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// A value is present but its type or shape does not match, including a
    /// failing nested schema and an absent value under a forbid policy.
    WrongType,
    /// Fewer keys were supplied than the schema requires.
    MissingKeys,
    /// More keys were supplied than allowed under [`ExcessPolicy::Forbid`](crate::schema::ExcessPolicy::Forbid).
    ExcessKeys,
    /// A predicate rejected an otherwise type-valid value.
    CallbackFailed,
    /// Programmer or configuration fault: malformed predicate result, missing
    /// nested validator, or a panic raised by user-supplied code.
    InternalError,
}

impl FailureKind {
    /// Returns the stable string code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::WrongType => "WRONG_TYPE",
            Self::MissingKeys => "MISSING_KEYS",
            Self::ExcessKeys => "EXCESS_KEYS",
            Self::CallbackFailed => "CALLBACK_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` if the failure points at the caller's input rather than
    /// at the schema or its predicates.
    #[must_use]
    pub const fn is_input_error(self) -> bool {
        !matches!(self, Self::InternalError)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// FAILURE
// ============================================================================

/// A rejected input.
///
/// Validation is first-failure-wins, so a `Failure` describes exactly one
/// problem: the first one met in registration order. When the problem sits
/// inside a nested schema, the nested validator's own failure is chained as
/// [`cause`](Failure::cause) and exposed through [`std::error::Error::source`].
///
/// # Examples
///
/// ```
/// use sift_validator::foundation::{Failure, FailureKind};
///
/// let failure = Failure::wrong_type("Type mismatch. Key: age").with_key("age");
/// assert_eq!(failure.kind, FailureKind::WrongType);
/// assert_eq!(failure.key.as_deref(), Some("age"));
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    /// What went wrong.
    pub kind: FailureKind,
    /// Free-text diagnostic. May be terse; never localized.
    pub message: Cow<'static, str>,
    /// Schema key the failure is attached to, if any.
    pub key: Option<String>,
    /// Failure reported by a nested validator.
    #[source]
    pub cause: Option<Box<Failure>>,
}

impl Failure {
    /// Creates a failure of the given kind.
    pub fn new(kind: FailureKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            key: None,
            cause: None,
        }
    }

    /// Shorthand for [`FailureKind::WrongType`].
    pub fn wrong_type(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FailureKind::WrongType, message)
    }

    /// Shorthand for [`FailureKind::MissingKeys`].
    pub fn missing_keys(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FailureKind::MissingKeys, message)
    }

    /// Shorthand for [`FailureKind::ExcessKeys`].
    pub fn excess_keys(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FailureKind::ExcessKeys, message)
    }

    /// Shorthand for [`FailureKind::CallbackFailed`].
    pub fn callback_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FailureKind::CallbackFailed, message)
    }

    /// Shorthand for [`FailureKind::InternalError`].
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(FailureKind::InternalError, message)
    }

    /// Attaches the schema key this failure belongs to.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Chains the failure reported by a nested validator.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns `true` if this failure has the given kind.
    #[must_use]
    pub fn is(&self, kind: FailureKind) -> bool {
        self.kind == kind
    }

    /// Iterates over this failure and every chained cause, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Failure> {
        std::iter::successors(Some(self), |f| f.cause.as_deref())
    }

    /// Returns the innermost failure of the chain.
    #[must_use]
    pub fn root_cause(&self) -> &Failure {
        self.chain().last().unwrap_or(self)
    }
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// Errors raised while building a schema.
///
/// These are configuration mistakes, reported once at setup time. A schema
/// that was built successfully never produces a `SchemaError` from `check`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A field was declared with no accepted types.
    #[error("field '{key}' declares no accepted types")]
    EmptyTypeSet {
        /// The offending key, or `"<anonymous>"` before registration.
        key: String,
    },

    /// A `nested-schema` field was declared without a nested definition.
    #[error("field '{key}' is typed nested-schema but no nested schema was given")]
    MissingNestedSchema {
        /// The offending key.
        key: String,
    },

    /// A regex pattern in a definition failed to compile.
    #[error("field '{key}' has an invalid pattern: {source}")]
    InvalidPattern {
        /// The offending key.
        key: String,
        /// The compile error.
        #[source]
        source: regex::Error,
    },

    /// A definition asked for a string format this crate does not know.
    #[error("field '{key}' uses unknown format '{format}'")]
    UnknownFormat {
        /// The offending key.
        key: String,
        /// The unknown format name.
        format: String,
    },

    /// A field definition combines attributes that select different shapes.
    #[error("field '{key}' combines '{first}' with '{second}'")]
    ConflictingSpec {
        /// The offending key.
        key: String,
        /// The attribute that would have decided the shape.
        first: &'static str,
        /// The attribute it conflicts with.
        second: &'static str,
    },

    /// A definition could not be parsed.
    #[error("invalid schema definition: {0}")]
    Parse(#[from] serde_json::Error),
}
