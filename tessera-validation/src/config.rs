// Validator options loaded from files or the environment

use crate::{ConfigError, MessageTable, Result, TranslationTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supported option file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Settings shared by many validators: behaviour flags plus default
/// messages and field translations.
///
/// ```toml
/// skip_empty = true
///
/// [messages]
/// required = "{field} must be filled in"
///
/// [translates]
/// email = "E-mail address"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Skip every rule except `required` when the value is empty
    pub skip_empty: bool,

    /// Message templates keyed by `rule` or `field.rule`
    pub messages: HashMap<String, String>,

    /// Display names keyed by field
    pub translates: HashMap<String, String>,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Load from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::Load(format!("No file extension: {}", path.display())))?;
        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::Load(format!("Unsupported format: {}", ext)))?;

        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: FileFormat) -> Result<Self> {
        match format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e))),
        }
    }

    /// Read `TESSERA_VALIDATION_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Read options from `(name, value)` pairs.
    ///
    /// Recognised: `TESSERA_VALIDATION_SKIP_EMPTY` (`true`/`false`/`1`/`0`).
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in vars {
            if key.as_ref() == "TESSERA_VALIDATION_SKIP_EMPTY" {
                options.skip_empty = parse_bool(key.as_ref(), value.as_ref())?;
            }
        }
        Ok(options)
    }

    pub fn message_table(&self) -> MessageTable {
        self.messages.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    pub fn translation_table(&self) -> TranslationTable {
        self.translates.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Parse(format!("{}: expected a boolean, got `{}`", key, other))),
    }
}
