//! # sift-validator
//!
//! Runtime shape validation and sanitizing for JSON-like input.
//!
//! ## Quick Start
//!
//! ```rust
//! use sift_validator::prelude::*;
//! use serde_json::json;
//!
//! let mut user = ExtendedSchema::default();
//! user.add_string_field("name", FieldOptions::new());
//! user.add_email_field("email", FieldOptions::new().allow_undefined());
//!
//! let clean = user.check(&json!({"name": "Ann", "session": "x"})).unwrap();
//! assert_eq!(clean, json!({"name": "Ann"}));
//! ```
//!
//! ## Validators
//!
//! - [`Schema`](schema::Schema): flat key → type mapping
//! - [`ExtendedSchema`](schema::ExtendedSchema): unions, nested schemas,
//!   predicates, optional fields
//!
//! Both can also be loaded from JSON, see [`schema::definition`].

// Failure carries a message, key and optional cause; boxing it would add an
// allocation to every rejected check.
#![allow(clippy::result_large_err)]

pub mod foundation;
pub mod prelude;
pub mod schema;
