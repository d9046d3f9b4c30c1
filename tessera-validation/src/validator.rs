// The validation engine

use crate::messages::MessageResolver;
use crate::registry::{Params, Registry, check_rule, resolve};
use crate::rules::{RuleList, parse_rules};
use crate::value::{display, is_empty};
use crate::{
    ConfigError, Errors, MessageTable, Predicate, Result, Rule, Scenes, Schema, TranslationTable,
    Validatable, ValidationError, ValidatorOptions,
};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tessera_log::{debug, trace, warn};

static NULL: Value = Value::Null;

/// Validates one set of input data.
///
/// A validator is built per call: bind data, declare rules (directly or
/// from a [`Schema`]), optionally pick a scene, then [`validate`](Self::validate).
///
/// Fields are independent. For each active field the rules run in
/// declaration order and the first failing rule produces that field's only
/// error.
///
/// ```
/// use serde_json::json;
/// use tessera_validation::{Validator, scenes};
///
/// let mut v = Validator::new([("name", json!("inhere")), ("age", json!(100))]);
/// v.add_rule("name", "required").unwrap();
/// v.add_rule_with("name", "minLen", [7]).unwrap();
/// v.add_rule_with("age", "max", [99]).unwrap();
/// v.with_scenes(scenes! { "update" => ["name"] });
///
/// assert!(!v.validate());
/// assert_eq!(v.errors().get("name"), Some("name value min length is 7"));
/// assert_eq!(v.errors().get("age"), Some("age max value is 99"));
///
/// v.at_scene("update").unwrap();
/// assert!(!v.validate());
/// assert!(!v.errors().has("age"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    data: Map<String, Value>,
    rules: Vec<Rule>,
    excluded: HashSet<String>,
    validators: Registry,
    messages: MessageTable,
    translations: TranslationTable,
    scenes: Scenes,
    scene: Option<String>,
    skip_empty: bool,
    errors: Errors,
    safe_data: Map<String, Value>,
    validated: bool,
}

impl Validator {
    /// Bind flat key/value input.
    pub fn new<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Bind a JSON object.
    pub fn from_json(data: Value) -> Result<Self> {
        match data {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(ConfigError::Bind(format!(
                "expected a JSON object, got `{}`",
                other
            ))),
        }
    }

    /// Bind a value of a type with a declared schema.
    pub fn from_struct<T: Validatable>(value: &T) -> Result<Self> {
        let schema = T::schema()?;
        let data = serde_json::to_value(value).map_err(|e| ConfigError::Bind(e.to_string()))?;
        Ok(Self::from_json(data)?.with_schema(&schema))
    }

    /// Bind data and apply `schema`.
    pub fn from_schema<I, K, V>(data: I, schema: &Schema) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(data).with_schema(schema)
    }

    /// Add everything `schema` declares. Its rules run after rules already present.
    pub fn with_schema(mut self, schema: &Schema) -> Self {
        self.validators.extend(&schema.validators);
        self.rules.extend(schema.rules.iter().cloned());
        self.excluded.extend(schema.excluded.iter().cloned());
        self.messages.merge(&schema.messages);
        self.translations.merge(&schema.translations);
        self.scenes.merge(&schema.scenes);
        self
    }

    /// Apply shared options. Later messages and translations override earlier ones.
    pub fn with_options(&mut self, options: &ValidatorOptions) -> &mut Self {
        self.skip_empty = options.skip_empty;
        self.messages.merge(&options.message_table());
        self.translations.merge(&options.translation_table());
        self
    }

    pub fn skip_empty(&mut self, skip: bool) -> &mut Self {
        self.skip_empty = skip;
        self
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Append a parameterless rule.
    pub fn add_rule(&mut self, field: &str, name: &str) -> Result<&mut Self> {
        self.push_rule(Rule::new(field, name))
    }

    /// Append a rule with parameters.
    pub fn add_rule_with<I, V>(&mut self, field: &str, name: &str, params: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_rule(Rule::new(field, name).with_params(params))
    }

    /// Append every rule of a rule list such as `required|minLen:7`.
    ///
    /// The list `-` excludes the field from validation. Nothing is added if
    /// any rule in the list is rejected.
    pub fn add_rules(&mut self, field: &str, list: &str) -> Result<&mut Self> {
        match parse_rules(field, list)? {
            RuleList::Excluded => {
                self.excluded.insert(field.to_string());
            }
            RuleList::Rules(rules) => {
                for rule in &rules {
                    self.check(rule)?;
                }
                self.rules.extend(rules);
            }
        }
        Ok(self)
    }

    /// Append a rule after checking it names a known validator with fitting parameters.
    pub fn push_rule(&mut self, rule: Rule) -> Result<&mut Self> {
        self.check(&rule)?;
        self.rules.push(rule);
        Ok(self)
    }

    fn check(&self, rule: &Rule) -> Result<()> {
        check_rule(&self.validators, rule).inspect_err(|e| {
            warn!("rule `{}` on `{}` rejected: {}", rule.name, rule.field, e);
        })
    }

    /// Register a custom validator for this validator's rules.
    ///
    /// Rules already declared are checked against the new registration; if
    /// any no longer fits, nothing is registered.
    pub fn add_validator<P>(&mut self, name: &str, params: Params, predicate: P) -> Result<&mut Self>
    where
        P: Predicate + 'static,
    {
        let mut validators = self.validators.clone();
        validators.register(name, params, predicate);
        self.install(validators)
    }

    /// Register a custom validator with its default message template.
    pub fn add_validator_with_message<P>(
        &mut self,
        name: &str,
        params: Params,
        predicate: P,
        message: &str,
    ) -> Result<&mut Self>
    where
        P: Predicate + 'static,
    {
        let mut validators = self.validators.clone();
        validators.register_with_message(name, params, predicate, message);
        self.install(validators)
    }

    fn install(&mut self, validators: Registry) -> Result<&mut Self> {
        for rule in &self.rules {
            check_rule(&validators, rule).inspect_err(|e| {
                warn!(
                    "validator `{}` no longer fits rule on `{}`: {}",
                    rule.name, rule.field, e
                );
            })?;
        }
        self.validators = validators;
        Ok(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    // ------------------------------------------------------------------
    // Scenes, messages, translations
    // ------------------------------------------------------------------

    /// Install scene definitions.
    pub fn with_scenes(&mut self, scenes: Scenes) -> &mut Self {
        self.scenes.merge(&scenes);
        self
    }

    /// Restrict the next runs to the fields of scene `name`.
    pub fn at_scene(&mut self, name: &str) -> Result<&mut Self> {
        if !self.scenes.contains(name) {
            warn!("unknown scene: {}", name);
            return Err(ConfigError::UnknownScene(name.to_string()));
        }
        self.scene = Some(name.to_string());
        Ok(self)
    }

    /// Go back to validating every field.
    pub fn clear_scene(&mut self) -> &mut Self {
        self.scene = None;
        self
    }

    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    pub fn with_messages<I, K, V>(&mut self, messages: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, template) in messages {
            self.messages.add(key, template);
        }
        self
    }

    pub fn with_translates<I, K, V>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, name) in names {
            self.translations.add(field, name);
        }
        self
    }

    // ------------------------------------------------------------------
    // Running
    // ------------------------------------------------------------------

    /// Fields that the next run evaluates, in rule declaration order.
    pub fn active_fields(&self) -> Vec<&str> {
        let scene = self.scene.as_deref();
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|r| r.field.as_str())
            .filter(|f| !self.excluded.contains(*f))
            .filter(|f| self.scenes.includes(scene, f))
            .filter(|f| seen.insert(*f))
            .collect()
    }

    /// Run every active field's rules. Returns `true` when no field failed.
    ///
    /// Errors from a previous run are discarded first.
    pub fn validate(&mut self) -> bool {
        let resolver = MessageResolver::new(&self.messages, &self.translations);
        let mut errors = Errors::new();
        let mut safe_data = Map::new();

        let fields = self.active_fields();
        debug!(
            "validating {} field(s), scene: {}",
            fields.len(),
            self.scene.as_deref().unwrap_or("<all>")
        );

        for field in fields {
            let value = self.data.get(field).unwrap_or(&NULL);

            match self.first_failure(field, value, &resolver) {
                Some(error) => {
                    debug!("field `{}` failed rule `{}`", field, error.rule);
                    errors.add(error);
                }
                None => {
                    if let Some(value) = self.data.get(field) {
                        safe_data.insert(field.to_string(), value.clone());
                    }
                }
            }
        }

        debug!("validation finished with {} failed field(s)", errors.len());
        self.errors = errors;
        self.safe_data = safe_data;
        self.validated = true;
        self.errors.is_empty()
    }

    fn first_failure(
        &self,
        field: &str,
        value: &Value,
        resolver: &MessageResolver<'_>,
    ) -> Option<ValidationError> {
        for rule in self.rules.iter().filter(|r| r.field == field) {
            let entry = match resolve(&self.validators, &rule.name) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping rule `{}` on `{}`: {}", rule.name, field, e);
                    continue;
                }
            };

            if self.skip_empty && entry.name() != "required" && is_empty(value) {
                trace!("`{}`: empty, skipping `{}`", field, rule.name);
                continue;
            }

            if entry.check(value, &rule.params) {
                trace!("`{}`: `{}` passed", field, rule.name);
                continue;
            }

            let message = resolver.resolve(rule, entry.name(), value, entry.message());
            let mut error = ValidationError::new(field, message).with_rule(rule.name.as_str());
            if !value.is_null() {
                error = error.with_value(display(value));
            }
            return Some(error);
        }
        None
    }

    /// Whether the last run passed. `false` before the first run.
    pub fn passed(&self) -> bool {
        self.validated && self.errors.is_empty()
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn into_errors(self) -> Errors {
        self.errors
    }

    /// Values of the fields that passed the last run
    pub fn safe_data(&self) -> &Map<String, Value> {
        &self.safe_data
    }

    pub fn safe_value(&self, field: &str) -> Option<&Value> {
        self.safe_data.get(field)
    }

    /// Raw input value for `field`
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamKind;
    use serde_json::json;

    fn sample() -> Validator {
        Validator::new([
            ("name", json!("inhere")),
            ("age", json!(100)),
            ("oldSt", json!(1)),
            ("newSt", json!(2)),
            ("email", json!("some@e.com")),
        ])
    }

    #[test]
    fn test_map_validation() {
        let mut v = sample();
        v.add_rule("name", "required").unwrap();
        v.add_rule_with("name", "minLen", [7]).unwrap();
        v.add_rule_with("age", "max", [99]).unwrap();
        v.add_rule_with("age", "min", [1]).unwrap();
        v.with_scenes(
            Scenes::new()
                .with("create", ["name", "email"])
                .with("update", ["name"]),
        );

        assert!(!v.validate());
        assert!(!v.passed());
        assert_eq!(v.errors().get("name"), Some("name value min length is 7"));
        assert_eq!(v.errors().get("age"), Some("age max value is 99"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let mut v = Validator::new([("name", json!(""))]);
        v.add_rules("name", "required|minLen:3|email").unwrap();

        assert!(!v.validate());
        let error = v.errors().get_error("name").unwrap();
        assert_eq!(error.rule, "required");
        assert_eq!(error.message, "name is required");
        assert_eq!(v.errors().len(), 1);
    }

    #[test]
    fn test_scene_restricts_fields() {
        let mut v = sample();
        v.add_rule_with("name", "minLen", [3]).unwrap();
        v.add_rule_with("age", "max", [99]).unwrap();
        v.with_scenes(Scenes::new().with("update", ["name"]));
        v.at_scene("update").unwrap();

        assert_eq!(v.active_fields(), vec!["name"]);
        assert!(v.validate());
        assert!(v.errors().get("age").is_none());

        v.clear_scene();
        assert!(!v.validate());
        assert!(v.errors().has("age"));
    }

    #[test]
    fn test_unknown_scene() {
        let mut v = sample();
        assert!(matches!(v.at_scene("delete"), Err(ConfigError::UnknownScene(_))));
        assert_eq!(v.scene(), None);
    }

    #[test]
    fn test_scene_with_unknown_field_is_ignored() {
        let mut v = sample();
        v.add_rule("name", "required").unwrap();
        v.with_scenes(Scenes::new().with("create", ["name", "nickname"]));
        v.at_scene("create").unwrap();
        assert!(v.validate());
    }

    #[test]
    fn test_registration_errors() {
        let mut v = sample();
        assert!(matches!(
            v.add_rule("name", "minLenght"),
            Err(ConfigError::UnknownValidator(_))
        ));
        assert!(matches!(
            v.add_rule("name", "minLen"),
            Err(ConfigError::ParamCount { .. })
        ));
        assert!(matches!(
            v.add_rules("name", "required|bogus"),
            Err(ConfigError::UnknownValidator(_))
        ));
        assert!(v.rules().is_empty());
    }

    #[test]
    fn test_custom_validator() {
        let mut v = Validator::new([("code", json!("abc"))]);
        v.add_validator("customValidator", Params::None, |v: &Value, _: &[Value]| {
            v.as_str().is_some_and(|s| s.len() == 4)
        })
        .unwrap();
        v.add_rule("code", "customValidator").unwrap();

        assert!(!v.validate());
        assert_eq!(v.errors().get("code"), Some("code is invalid"));
    }

    #[test]
    fn test_redefining_validator_rechecks_existing_rules() {
        let mut v = Validator::new([("age", json!(100))]);
        v.add_rule_with("age", "max", [99]).unwrap();

        let result = v.add_validator("max", Params::Exact(2, ParamKind::Number), |_: &Value, _: &[Value]| {
            true
        });
        assert!(matches!(result, Err(ConfigError::ParamCount { got: 1, .. })));

        assert!(!v.validate());
        assert_eq!(v.errors().get("age"), Some("age max value is 99"));

        v.add_validator("max", Params::Exact(1, ParamKind::Number), |_: &Value, _: &[Value]| true)
            .unwrap();
        assert!(v.validate());
    }

    #[test]
    fn test_custom_validator_shadows_aliased_rule() {
        let mut v = Validator::new([("name", json!("ab"))]);
        v.add_validator("minLen", Params::Exact(1, ParamKind::Length), |_: &Value, _: &[Value]| true)
            .unwrap();
        v.add_rules("name", "minLen:3|minLength:3").unwrap();

        assert!(v.validate());
    }

    #[test]
    fn test_non_finite_number_param_rejected() {
        let mut v = Validator::new([("age", json!(5))]);
        assert!(matches!(
            v.add_rules("age", "min:NaN"),
            Err(ConfigError::InvalidParam { .. })
        ));
        assert!(matches!(
            v.add_rules("age", "max:inf"),
            Err(ConfigError::InvalidParam { .. })
        ));
        assert!(v.rules().is_empty());
    }

    #[test]
    fn test_missing_field_is_null() {
        let mut v = Validator::new(Vec::<(String, Value)>::new());
        v.add_rule("email", "required").unwrap();

        assert!(!v.validate());
        let error = v.errors().get_error("email").unwrap();
        assert_eq!(error.value, None);
    }

    #[test]
    fn test_skip_empty() {
        let mut v = Validator::new([("email", json!("")), ("name", json!(""))]);
        v.add_rule("email", "email").unwrap();
        v.add_rule("name", "required").unwrap();

        assert!(!v.validate());
        assert!(v.errors().has("email"));

        v.skip_empty(true);
        assert!(!v.validate());
        assert!(!v.errors().has("email"));
        assert!(v.errors().has("name"));
    }

    #[test]
    fn test_excluded_field_never_runs() {
        let mut v = Validator::new([("safe", json!(0))]);
        v.add_rule("safe", "required").unwrap();
        v.add_rules("safe", "-").unwrap();
        assert!(v.active_fields().is_empty());
        assert!(v.validate());
    }

    #[test]
    fn test_safe_data_and_rerun() {
        let mut v = Validator::new([("name", json!("inhere")), ("age", json!(100))]);
        v.add_rule("name", "required").unwrap();
        v.add_rule_with("age", "max", [99]).unwrap();

        assert!(!v.passed());
        assert!(!v.validate());
        assert_eq!(v.safe_value("name"), Some(&json!("inhere")));
        assert_eq!(v.safe_value("age"), None);

        v.with_scenes(Scenes::new().with("name_only", ["name"]));
        v.at_scene("name_only").unwrap();
        assert!(v.validate());
        assert!(v.passed());
        assert!(v.errors().is_empty());
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(Validator::from_json(json!({"a": 1})).is_ok());
        assert!(matches!(
            Validator::from_json(json!([1, 2])),
            Err(ConfigError::Bind(_))
        ));
    }

    #[test]
    fn test_options_messages_and_translations() {
        let options = ValidatorOptions {
            skip_empty: false,
            messages: [("required".to_string(), "{field} must be filled in".to_string())]
                .into_iter()
                .collect(),
            translates: [("email".to_string(), "E-mail".to_string())]
                .into_iter()
                .collect(),
        };

        let mut v = Validator::new([("email", json!(""))]);
        v.with_options(&options);
        v.add_rule("email", "required").unwrap();

        assert!(!v.validate());
        assert_eq!(v.errors().get("email"), Some("E-mail must be filled in"));
    }
}
