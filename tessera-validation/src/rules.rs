// Rules and rule-list parsing

use crate::value::parse_param;
use crate::{ConfigError, Result};
use serde_json::Value;

/// A named, parameterized check applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub field: String,
    pub name: String,
    pub params: Vec<Value>,
    /// Message used instead of any table or default template
    pub message: Option<String>,
}

impl Rule {
    pub fn new(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            name: name.into(),
            params: Vec::new(),
            message: None,
        }
    }

    pub fn with_params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Rules declared for a field by a rule list such as `required|minLen:7`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleList {
    /// The list was the sentinel `-`: never validate the field
    Excluded,
    Rules(Vec<Rule>),
}

/// Parse a pipe-delimited rule list for `field`.
///
/// Each rule is `name` or `name:p1,p2,...`. Parameters are read as
/// integers, floats or booleans where possible and strings otherwise.
///
/// ```
/// use tessera_validation::{RuleList, parse_rules};
///
/// let RuleList::Rules(rules) = parse_rules("name", "required|minLen:7").unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(rules[1].name, "minLen");
/// assert_eq!(rules[1].params, vec![serde_json::json!(7)]);
///
/// assert_eq!(parse_rules("safe", "-").unwrap(), RuleList::Excluded);
/// assert!(parse_rules("name", "required||email").is_err());
/// ```
pub fn parse_rules(field: &str, list: &str) -> Result<RuleList> {
    let list = list.trim();
    if list == "-" {
        return Ok(RuleList::Excluded);
    }
    if list.is_empty() {
        return Err(malformed(field, list, "empty rule list"));
    }

    list.split('|')
        .map(|segment| parse_rule(field, segment))
        .collect::<Result<Vec<_>>>()
        .map(RuleList::Rules)
}

fn parse_rule(field: &str, segment: &str) -> Result<Rule> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(malformed(field, segment, "empty rule"));
    }

    let (name, raw_params) = match segment.split_once(':') {
        Some((name, params)) => (name.trim(), Some(params)),
        None => (segment, None),
    };

    if name.is_empty() {
        return Err(malformed(field, segment, "missing rule name"));
    }
    if name != "-" && !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed(field, segment, "rule names may only contain letters, digits and '_'"));
    }

    let mut rule = Rule::new(field, name);
    if let Some(raw) = raw_params {
        // `regex` takes its argument verbatim so patterns may contain ','.
        // Patterns containing '|' must be added programmatically.
        let pieces: Vec<&str> = if name == "regex" {
            vec![raw]
        } else {
            raw.split(',').collect()
        };

        for piece in pieces {
            if piece.trim().is_empty() {
                return Err(malformed(field, segment, "empty parameter"));
            }
            rule.params.push(if name == "regex" {
                Value::String(piece.to_string())
            } else {
                parse_param(piece)
            });
        }
    }

    Ok(rule)
}

fn malformed(field: &str, rule: &str, reason: &str) -> ConfigError {
    ConfigError::MalformedRule {
        field: field.to_string(),
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}
