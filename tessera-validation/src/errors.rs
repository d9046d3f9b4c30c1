// Configuration errors and per-field validation failures

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while declaring rules, building schemas or loading options.
///
/// These never come out of a validation run; failed fields are reported
/// through [`Errors`] instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    #[error("Malformed rule `{rule}` on field `{field}`: {reason}")]
    MalformedRule {
        field: String,
        rule: String,
        reason: String,
    },

    #[error("Validator `{name}` expects {expected} parameter(s), got {got}")]
    ParamCount {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("Invalid parameter for validator `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("Unknown scene: {0}")]
    UnknownScene(String),

    #[error("Failed to bind input data: {0}")]
    Bind(String),

    #[error("Failed to load options: {0}")]
    Load(String),

    #[error("Failed to parse options: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Validation failure for a single field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field key that failed validation
    pub field: String,

    /// Resolved, human-readable message
    pub message: String,

    /// Name of the rule that failed
    pub rule: String,

    /// Rendered value that failed validation, when one was present
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: "custom".to_string(),
            value: None,
        }
    }

    /// Set the rule name
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    /// Set the offending value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Failed fields from one validation run, at most one entry per field.
///
/// Entries keep the order in which fields were evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors {
    errors: Vec<ValidationError>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Record an error unless the field already has one.
    ///
    /// Returns `false` when the error was dropped.
    pub fn add(&mut self, error: ValidationError) -> bool {
        if self.has(&error.field) {
            return false;
        }
        self.errors.push(error);
        true
    }

    /// Message recorded for `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.get_error(field).map(|e| e.message.as_str())
    }

    pub fn get_error(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// First failed field in evaluation order
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Field to message mapping
    pub fn to_map(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }

    /// `{"errors": {"<field>": "<message>", ...}}`
    pub fn to_json(&self) -> Value {
        let fields: serde_json::Map<String, Value> = self
            .errors
            .iter()
            .map(|e| (e.field.clone(), Value::String(e.message.clone())))
            .collect();

        serde_json::json!({ "errors": fields })
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
