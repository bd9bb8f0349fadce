//! Prelude module for convenient imports.
//!
//! Provides a single `use sift_validator::prelude::*;` import that brings in
//! the validators, field builders and outcome types.
//!
//! # Examples
//!
//! ```rust
//! use sift_validator::prelude::*;
//!
//! let schema = Schema::builder()
//!     .field("id", TypeTag::Number)
//!     .excess(ExcessPolicy::Forbid)
//!     .build();
//! assert_eq!(schema.length(), 1);
//! ```

// ============================================================================
// FOUNDATION: Outcomes, type tags, the Check trait
// ============================================================================

pub use crate::foundation::{
    Check, Failure, FailureKind, SchemaError, TypeTag, ValidationReport, ValidationResult,
};

// ============================================================================
// SCHEMA: Validators, fields, predicates, policies
// ============================================================================

pub use crate::schema::{
    ExcessPolicy, ExtendedSchema, ExtendedSchemaDefinition, FieldDefinition, FieldOptions,
    Predicate, Schema, SchemaDefinition, SchemaRules, UndefinedPolicy, Verdict,
};
