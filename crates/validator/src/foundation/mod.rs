//! Core validation types and traits
//!
//! This module contains the fundamental building blocks shared by both
//! validators:
//!
//! - **Outcomes**: [`ValidationResult`], [`Failure`], [`FailureKind`], and the
//!   serializable [`ValidationReport`]
//! - **Shapes**: [`TypeTag`]
//! - **Traits**: [`Check`]
//! - **Setup errors**: [`SchemaError`]
//!
//! # Architecture
//!
//! ## 1. Failures are values
//!
//! `check` never panics and never returns a setup error. Every rejection is a
//! [`Failure`] classified by one of five [`FailureKind`]s, and the first
//! problem found wins:
//!
//! ```rust,ignore
//! match schema.check(&input) {
//!     Ok(clean) => store(clean),
//!     Err(failure) if failure.is(FailureKind::InternalError) => bug(failure),
//!     Err(failure) => reject(failure),
//! }
//! ```
//!
//! ## 2. Closed type vocabulary
//!
//! Field types are [`TypeTag`] variants and membership is a pattern match on
//! [`serde_json::Value`]:
//!
//! ```rust,ignore
//! assert!(TypeTag::Array.matches(&json!([1, 2])));
//! assert!(!TypeTag::Object.matches(&json!([1, 2])));
//! ```
//!
//! ## 3. Shared sub-schemas
//!
//! Validators are composed through `Arc<dyn Check>`, so one address schema can
//! back fields in several parent schemas.

pub mod error;
pub mod kind;
pub mod report;
pub mod traits;

pub use error::{Failure, FailureKind, SchemaError};
pub use kind::TypeTag;
pub use report::{Accepted, Rejected, ValidationReport};
pub use traits::Check;

pub(crate) use traits::guarded;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Outcome of a `check` call: the sanitized value, or the first failure.
pub type ValidationResult<T> = Result<T, Failure>;
