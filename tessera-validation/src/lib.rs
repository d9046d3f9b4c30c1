//! Rule-based validation for form-like input
//!
//! Declare rules per field (`required`, length and numeric bounds, format
//! checks, custom predicates), optionally restrict a run to a named scene,
//! and read back one human-readable message per failed field.
//!
//! # Examples
//!
//! ## Map input
//!
//! ```
//! use serde_json::json;
//! use tessera_validation::Validator;
//!
//! let mut v = Validator::new([("name", json!("inhere")), ("age", json!(100))]);
//! v.add_rules("name", "required|minLen:3").unwrap();
//! v.add_rule_with("age", "max", [99]).unwrap();
//!
//! assert!(!v.validate());
//! assert_eq!(v.errors().get("age"), Some("age max value is 99"));
//! assert!(v.errors().get("name").is_none());
//! ```
//!
//! ## Structured input
//!
//! ```
//! use serde::Serialize;
//! use serde_json::Value;
//! use tessera_validation::{Params, Result, Schema, Validatable};
//!
//! #[derive(Serialize)]
//! struct Signup {
//!     name: String,
//!     code: String,
//! }
//!
//! impl Validatable for Signup {
//!     fn schema() -> Result<Schema> {
//!         Schema::builder()
//!             .field("name", "required|minLen:3")
//!             .field("code", "fourChars")
//!             .validator("fourChars", Params::None, |v: &Value, _: &[Value]| {
//!                 v.as_str().is_some_and(|s| s.chars().count() == 4)
//!             })
//!             .messages([("code.fourChars", "{field} must be 4 characters")])
//!             .translates([("code", "Invite code")])
//!             .build()
//!     }
//! }
//!
//! let form = Signup { name: "Ann".into(), code: "12345".into() };
//! let mut v = form.validator().unwrap();
//! assert!(!v.validate());
//! assert_eq!(v.errors().get("code"), Some("Invite code must be 4 characters"));
//! ```
//!
//! ## Configuration errors
//!
//! Unknown validators and malformed rule lists are rejected when they are
//! declared, not when data is validated.
//!
//! ```
//! use tessera_validation::{ConfigError, Validator};
//!
//! let mut v = Validator::new([("name", "x")]);
//! assert!(matches!(v.add_rule("name", "requird"), Err(ConfigError::UnknownValidator(_))));
//! assert!(matches!(v.add_rules("name", "required|"), Err(ConfigError::MalformedRule { .. })));
//! ```

mod config;
mod errors;
pub mod messages;
pub mod registry;
mod rules;
mod scene;
mod schema;
mod traits;
mod validator;
pub mod validators;
pub mod value;

pub use config::{FileFormat, ValidatorOptions};
pub use errors::{ConfigError, Errors, Result, ValidationError};
pub use messages::{FALLBACK_MESSAGE, MessageResolver, MessageTable, TranslationTable};
pub use registry::{Entry, ParamKind, Params, Registry};
pub use rules::{Rule, RuleList, parse_rules};
pub use scene::Scenes;
pub use schema::{Schema, SchemaBuilder};
pub use traits::{Predicate, Validatable};
pub use validator::Validator;

pub use serde_json::Value;
