//! Validator configuration
//!
//! Policies are plain serde enums so a host can load them from the same
//! config file that carries its schema definitions.

use serde::{Deserialize, Serialize};

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcessPolicy {
    /// Return the input with excess keys intact.
    ///
    /// Nested-schema values are still sanitized by their own validator's policy.
    Keep,
    /// Silently drop excess keys from the returned value.
    #[default]
    Clean,
    /// Reject the input with [`FailureKind::ExcessKeys`](crate::foundation::FailureKind::ExcessKeys).
    Forbid,
}

/// Whether an absent key is acceptable for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedPolicy {
    /// The key may be absent; only the predicate runs.
    Allow,
    /// An absent key fails with [`FailureKind::WrongType`](crate::foundation::FailureKind::WrongType).
    #[default]
    Forbid,
}

impl UndefinedPolicy {
    /// Returns `true` for [`UndefinedPolicy::Allow`].
    #[must_use]
    pub const fn allows(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Per-validator rules.
///
/// # Examples
///
/// ```
/// use sift_validator::schema::{ExcessPolicy, SchemaRules};
///
/// let rules: SchemaRules = serde_json::from_str(r#"{"excess": "forbid"}"#).unwrap();
/// assert_eq!(rules.excess, ExcessPolicy::Forbid);
/// assert_eq!(SchemaRules::default().excess, ExcessPolicy::Clean);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaRules {
    /// Excess key handling.
    pub excess: ExcessPolicy,
}

impl SchemaRules {
    /// Rules with the given excess policy.
    #[must_use]
    pub const fn with_excess(excess: ExcessPolicy) -> Self {
        Self { excess }
    }
}

impl From<ExcessPolicy> for SchemaRules {
    fn from(excess: ExcessPolicy) -> Self {
        Self::with_excess(excess)
    }
}
