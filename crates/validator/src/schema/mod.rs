//! Schema validators
//!
//! Two validators implement [`Check`](crate::foundation::Check):
//!
//! - [`Schema`]: flat key → single type mapping with an excess-key policy
//! - [`ExtendedSchema`]: per-field unions, nested schemas, predicates and an
//!   undefined policy
//!
//! Both are built once, then shared read-only; `check` takes `&self` and
//! never mutates its input.

pub mod definition;
pub mod extended;
pub mod field;
pub mod minimal;
pub mod predicate;
pub mod rules;
pub mod sugar;

pub use definition::{ExtendedSchemaDefinition, FieldSpec, SchemaDefinition};
pub use extended::ExtendedSchema;
pub use field::{FieldDefinition, FieldOptions};
pub use minimal::{Schema, SchemaBuilder};
pub use predicate::{IntoVerdict, MalformedVerdict, Predicate, Verdict};
pub use rules::{ExcessPolicy, SchemaRules, UndefinedPolicy};
pub use sugar::is_truthy;

use serde_json::{Map, Value};

use crate::foundation::ValidationResult;

/// Input keys not accepted by `known`, in input order.
pub(crate) fn excess_keys<'a>(
    input: &'a Map<String, Value>,
    known: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    input
        .keys()
        .map(String::as_str)
        .filter(|key| !known(key))
        .collect()
}

/// Copy of `input` under `policy`: everything for [`ExcessPolicy::Keep`],
/// otherwise only the keys accepted by `known`, in input order.
pub(crate) fn sanitized(
    input: &Map<String, Value>,
    policy: ExcessPolicy,
    known: impl Fn(&str) -> bool,
) -> Map<String, Value> {
    match policy {
        ExcessPolicy::Keep => input.clone(),
        ExcessPolicy::Clean | ExcessPolicy::Forbid => input
            .iter()
            .filter(|(k, _)| known(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

pub(crate) fn log_outcome(schema: &'static str, result: &ValidationResult<Value>) {
    match result {
        Ok(_) => tracing::trace!(schema, "input accepted"),
        Err(failure) => tracing::debug!(
            schema,
            kind = %failure.kind,
            key = failure.key.as_deref().unwrap_or_default(),
            message = %failure.message,
            "input rejected"
        ),
    }
}
