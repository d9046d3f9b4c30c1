//! Declared rule sets for a data shape
//!
//! A [`Schema`] is built once per data shape and can be applied to any
//! number of values. It carries the rules, the custom validators the rules
//! refer to, messages, translations and scenes.

use crate::registry::{Params, Registry, check_rule};
use crate::rules::{RuleList, parse_rules};
use crate::{ConfigError, MessageTable, Predicate, Result, Rule, Scenes, TranslationTable};
use std::collections::HashSet;
use tessera_log::warn;

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) rules: Vec<Rule>,
    pub(crate) excluded: HashSet<String>,
    pub(crate) validators: Registry,
    pub(crate) messages: MessageTable,
    pub(crate) translations: TranslationTable,
    pub(crate) scenes: Scenes,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Distinct fields that carry rules, in declaration order
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.field.as_str())
            .filter(|f| seen.insert(*f))
            .collect()
    }

    /// Whether the field was declared with the `-` rule list
    pub fn is_excluded(&self, field: &str) -> bool {
        self.excluded.contains(field)
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    pub fn scenes(&self) -> &Scenes {
        &self.scenes
    }

    pub fn validators(&self) -> &Registry {
        &self.validators
    }
}

/// Builder for [`Schema`].
///
/// Declaration errors are held until [`SchemaBuilder::build`], which reports
/// the first one.
///
/// ```
/// use serde_json::Value;
/// use tessera_validation::{Params, Schema};
///
/// let schema = Schema::builder()
///     .field("Name", "required|minLen:7")
///     .field("Safe", "-")
///     .field("Code", "customValidator")
///     .validator("customValidator", Params::None, |v: &Value, _: &[Value]| {
///         v.as_str().is_some_and(|s| s.len() == 4)
///     })
///     .messages([("Name.required", "message for special field")])
///     .translates([("Name", "User Name")])
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.fields(), vec!["Name", "Code"]);
/// assert!(schema.is_excluded("Safe"));
/// ```
#[derive(Default)]
pub struct SchemaBuilder {
    schema: Schema,
    error: Option<ConfigError>,
}

impl SchemaBuilder {
    /// Declare rules for `field` from a rule list such as `required|minLen:7`.
    pub fn field(mut self, field: &str, rules: &str) -> Self {
        match parse_rules(field, rules) {
            Ok(RuleList::Excluded) => {
                self.schema.excluded.insert(field.to_string());
            }
            Ok(RuleList::Rules(rules)) => self.schema.rules.extend(rules),
            Err(e) => self.fail(e),
        }
        self
    }

    /// Declare a single rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.schema.rules.push(rule);
        self
    }

    /// Register a validator that rules in this schema may refer to.
    pub fn validator<P>(mut self, name: &str, params: Params, predicate: P) -> Self
    where
        P: Predicate + 'static,
    {
        self.schema.validators.register(name, params, predicate);
        self
    }

    /// Register a validator with its default message template.
    pub fn validator_with_message<P>(
        mut self,
        name: &str,
        params: Params,
        predicate: P,
        message: &str,
    ) -> Self
    where
        P: Predicate + 'static,
    {
        self.schema
            .validators
            .register_with_message(name, params, predicate, message);
        self
    }

    pub fn messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, template) in messages {
            self.schema.messages.add(key, template);
        }
        self
    }

    pub fn translates<I, K, V>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, name) in names {
            self.schema.translations.add(field, name);
        }
        self
    }

    pub fn scenes(mut self, scenes: Scenes) -> Self {
        self.schema.scenes.merge(&scenes);
        self
    }

    /// Check every rule against the known validators and finish.
    pub fn build(self) -> Result<Schema> {
        if let Some(e) = self.error {
            warn!("schema declaration failed: {}", e);
            return Err(e);
        }

        for rule in &self.schema.rules {
            if let Err(e) = check_rule(&self.schema.validators, rule) {
                warn!("schema rule `{}` on `{}` rejected: {}", rule.name, rule.field, e);
                return Err(e);
            }
        }

        Ok(self.schema)
    }

    fn fail(&mut self, error: ConfigError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamKind;
    use serde_json::Value;

    #[test]
    fn test_build_collects_rules_in_order() {
        let schema = Schema::builder()
            .field("name", "required|minLen:7")
            .field("age", "max:99")
            .rule(Rule::new("name", "maxLen").with_params([20]))
            .build()
            .unwrap();

        let names: Vec<_> = schema.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["required", "minLen", "max", "maxLen"]);
        assert_eq!(schema.fields(), vec!["name", "age"]);
    }

    #[test]
    fn test_unknown_validator_is_a_build_error() {
        let result = Schema::builder().field("code", "customValidator").build();
        assert!(matches!(result, Err(ConfigError::UnknownValidator(name)) if name == "customValidator"));
    }

    #[test]
    fn test_validator_declared_after_field() {
        let schema = Schema::builder()
            .field("code", "customValidator")
            .validator("customValidator", Params::None, |v: &Value, _: &[Value]| {
                v.as_str().is_some_and(|s| s.len() == 4)
            })
            .build();
        assert!(schema.is_ok());
    }

    #[test]
    fn test_first_malformed_declaration_is_reported() {
        let result = Schema::builder()
            .field("a", "required||email")
            .field("b", "nope")
            .build();
        assert!(matches!(result, Err(ConfigError::MalformedRule { field, .. }) if field == "a"));
    }

    #[test]
    fn test_bad_params_are_build_errors() {
        let result = Schema::builder().field("name", "minLen:seven").build();
        assert!(matches!(result, Err(ConfigError::InvalidParam { .. })));

        let result = Schema::builder().field("age", "between:1").build();
        assert!(matches!(result, Err(ConfigError::ParamCount { .. })));
    }

    #[test]
    fn test_redefined_validator_checked_against_earlier_rules() {
        let result = Schema::builder()
            .field("age", "max:99")
            .validator("max", Params::Exact(2, ParamKind::Number), |_: &Value, _: &[Value]| true)
            .build();
        assert!(matches!(result, Err(ConfigError::ParamCount { got: 1, .. })));
    }

    #[test]
    fn test_excluded_field() {
        let schema = Schema::builder().field("safe", "-").build().unwrap();
        assert!(schema.is_excluded("safe"));
        assert!(schema.rules().is_empty());
    }
}
