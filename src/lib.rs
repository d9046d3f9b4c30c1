// Tessera - declarative field validation
//
// Re-exports the validation engine and the logging macros it uses.

pub use tessera_validation::*;

pub use tessera_log as log;

/// Commonly used items.
pub mod prelude {
    pub use tessera_validation::{
        ConfigError, Errors, Params, Rule, Scenes, Schema, Validatable, Validator,
        ValidatorOptions, scenes,
    };
}
