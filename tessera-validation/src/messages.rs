//! Error messages and field translations
//!
//! Templates may use these placeholders:
//!
//! - `{field}`: the field's display name (its translation, else its key)
//! - `{value}`: the value that failed
//! - `{0}`, `{1}`, ...: the rule's parameters
//! - `{args}`: all parameters joined with `", "`

use crate::Result;
use crate::Rule;
use crate::value::display;
use serde_json::Value;
use std::collections::HashMap;

/// Template used when nothing more specific exists.
pub const FALLBACK_MESSAGE: &str = "{field} is invalid";

fn not_a_template(key: &str, value: &Value) -> crate::ConfigError {
    crate::ConfigError::Parse(format!("message `{}` must be a string, got `{}`", key, value))
}

/// Custom message templates.
///
/// Keys are either a bare rule name (`required`) or `field.rule`
/// (`Name.required`) for a single field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageTable {
    messages: HashMap<String, String>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a flat JSON object of `key: template` pairs.
    ///
    /// Nested objects are flattened with a `.` separator, so
    /// `{"Name": {"required": "..."}}` yields the key `Name.required`.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: HashMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| crate::ConfigError::Parse(format!("JSON parse error: {}", e)))?;

        let mut table = Self::new();
        for (key, value) in data {
            match value {
                Value::String(s) => table.add(key, s),
                Value::Object(nested) => {
                    for (rule, msg) in nested {
                        let full = format!("{}.{}", key, rule);
                        match msg {
                            Value::String(s) => table.add(full, s),
                            other => return Err(not_a_template(&full, &other)),
                        }
                    }
                }
                other => return Err(not_a_template(&key, &other)),
            }
        }
        Ok(table)
    }

    pub fn add(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Most specific custom template for `rule` on `field`.
    pub fn lookup(&self, field: &str, rule: &str) -> Option<&str> {
        self.get(&format!("{}.{}", field, rule))
            .or_else(|| self.get(rule))
    }

    /// Add every entry of `other`, overriding existing keys.
    pub fn merge(&mut self, other: &MessageTable) {
        for (key, template) in &other.messages {
            self.messages.insert(key.clone(), template.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

impl<K, V> FromIterator<(K, V)> for MessageTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, template) in iter {
            table.add(key, template);
        }
        table
    }
}

/// Display names for field keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationTable {
    names: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let names: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| crate::ConfigError::Parse(format!("JSON parse error: {}", e)))?;
        Ok(Self { names })
    }

    pub fn add(&mut self, field: impl Into<String>, name: impl Into<String>) {
        self.names.insert(field.into(), name.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.names.get(field).map(String::as_str)
    }

    /// Display name for `field`, falling back to the key itself
    pub fn display_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.get(field).unwrap_or(field)
    }

    pub fn merge(&mut self, other: &TranslationTable) {
        for (field, name) in &other.names {
            self.names.insert(field.clone(), name.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TranslationTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (field, name) in iter {
            table.add(field, name);
        }
        table
    }
}

/// Produces the message for a failed rule.
pub struct MessageResolver<'a> {
    messages: &'a MessageTable,
    translations: &'a TranslationTable,
}

impl<'a> MessageResolver<'a> {
    pub fn new(messages: &'a MessageTable, translations: &'a TranslationTable) -> Self {
        Self {
            messages,
            translations,
        }
    }

    /// Message for `rule` failing on `value`.
    ///
    /// Lookup order: the rule's own message, `field.rule` in the table,
    /// `rule` in the table, `default` (the validator's template), then
    /// [`FALLBACK_MESSAGE`]. `rule_name` is the canonical validator name so
    /// aliases share table entries with their target; at each level the
    /// name as written is tried before the canonical one.
    pub fn resolve(&self, rule: &Rule, rule_name: &str, value: &Value, default: Option<&str>) -> String {
        let aliased = rule_name != rule.name;
        let template = rule
            .message
            .as_deref()
            .or_else(|| self.messages.get(&format!("{}.{}", rule.field, rule.name)))
            .or_else(|| {
                aliased
                    .then(|| self.messages.get(&format!("{}.{}", rule.field, rule_name)))
                    .flatten()
            })
            .or_else(|| self.messages.get(&rule.name))
            .or_else(|| aliased.then(|| self.messages.get(rule_name)).flatten())
            .or(default)
            .unwrap_or(FALLBACK_MESSAGE);

        self.render(template, &rule.field, value, &rule.params)
    }

    /// Fill placeholders in `template`.
    ///
    /// Only the template is scanned; substituted text is copied as is, so a
    /// value containing `{0}` stays `{0}`. Unknown placeholders are kept.
    pub fn render(&self, template: &str, field: &str, value: &Value, params: &[Value]) -> String {
        let mut message = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            message.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                message.push_str(&rest[start..]);
                return message;
            };

            let token = &after[..end];
            if token.contains('{') {
                message.push('{');
                rest = after;
                continue;
            }

            match self.placeholder(token, field, value, params) {
                Some(text) => message.push_str(&text),
                None => message.push_str(&rest[start..start + end + 2]),
            }
            rest = &after[end + 1..];
        }

        message.push_str(rest);
        message
    }

    fn placeholder(&self, token: &str, field: &str, value: &Value, params: &[Value]) -> Option<String> {
        match token {
            "field" => Some(self.translations.display_name(field).to_string()),
            "value" => Some(display(value)),
            "args" => Some(params.iter().map(display).collect::<Vec<_>>().join(", ")),
            index if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
                index.parse::<usize>().ok().and_then(|i| params.get(i)).map(display)
            }
            _ => None,
        }
    }
}
