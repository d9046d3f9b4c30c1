//! Validator registry
//!
//! Maps rule names to predicates, their parameter signature and default
//! message template. The built-in table is shared process-wide; custom
//! validators live in a per-validator [`Registry`] that is consulted first.

use crate::value::{as_length, as_number};
use crate::{ConfigError, Predicate, Result, Rule, validators};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shape a single rule parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any value
    Any,
    /// Non-negative integer
    Length,
    /// Any number (or numeric string)
    Number,
    /// A string that compiles as a regular expression
    Pattern,
}

impl ParamKind {
    fn check(self, name: &str, param: &Value) -> Result<()> {
        let ok = match self {
            ParamKind::Any => true,
            ParamKind::Length => as_length(param).is_some(),
            ParamKind::Number => as_number(param).is_some(),
            ParamKind::Pattern => match param.as_str() {
                Some(source) => {
                    return validators::compiled_pattern(source).map(|_| ()).map_err(|e| ConfigError::InvalidParam {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
                None => false,
            },
        };

        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidParam {
                name: name.to_string(),
                reason: format!("expected {:?} parameter, got `{}`", self, param),
            })
        }
    }
}

/// Parameter arity of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Params {
    /// No parameters accepted
    None,
    /// Exactly `n` parameters of the given kind
    Exact(usize, ParamKind),
    /// `n` or more parameters of the given kind
    AtLeast(usize, ParamKind),
}

impl Params {
    /// Check a rule's parameters against this signature.
    pub fn check(&self, name: &str, params: &[Value]) -> Result<()> {
        let (fits, expected, kind) = match *self {
            Params::None => (params.is_empty(), "0".to_string(), ParamKind::Any),
            Params::Exact(n, kind) => (params.len() == n, n.to_string(), kind),
            Params::AtLeast(n, kind) => (params.len() >= n, format!("at least {}", n), kind),
        };

        if !fits {
            return Err(ConfigError::ParamCount {
                name: name.to_string(),
                expected,
                got: params.len(),
            });
        }

        params.iter().try_for_each(|p| kind.check(name, p))
    }
}

/// One registered validator.
#[derive(Clone)]
pub struct Entry {
    name: String,
    params: Params,
    predicate: Arc<dyn Predicate>,
    message: Option<String>,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Default message template, if the validator declares one
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn check(&self, value: &Value, params: &[Value]) -> bool {
        self.predicate.check(value, params)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Name to validator mapping.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
    aliases: HashMap<String, String>,
}

static BUILTINS: Lazy<Registry> = Lazy::new(|| {
    use ParamKind::{Any, Length, Number, Pattern};

    let mut r = Registry::new();
    r.insert("-", Params::None, validators::skip, None);
    r.insert(
        "required",
        Params::None,
        validators::required,
        Some("{field} is required"),
    );
    r.insert(
        "minLen",
        Params::Exact(1, Length),
        validators::min_len,
        Some("{field} value min length is {0}"),
    );
    r.insert(
        "maxLen",
        Params::Exact(1, Length),
        validators::max_len,
        Some("{field} value max length is {0}"),
    );
    r.insert(
        "len",
        Params::Exact(1, Length),
        validators::exact_len,
        Some("{field} value length must be {0}"),
    );
    r.insert(
        "min",
        Params::Exact(1, Number),
        validators::min,
        Some("{field} min value is {0}"),
    );
    r.insert(
        "max",
        Params::Exact(1, Number),
        validators::max,
        Some("{field} max value is {0}"),
    );
    r.insert(
        "between",
        Params::Exact(2, Number),
        validators::between,
        Some("{field} value must be in the range {0} - {1}"),
    );
    r.insert(
        "in",
        Params::AtLeast(1, Any),
        validators::one_of,
        Some("{field} value must be one of: {args}"),
    );
    r.insert(
        "notIn",
        Params::AtLeast(1, Any),
        validators::none_of,
        Some("{field} value must not be one of: {args}"),
    );
    r.insert(
        "email",
        Params::None,
        validators::email,
        Some("{field} value is an invalid email address"),
    );
    r.insert(
        "url",
        Params::None,
        validators::url,
        Some("{field} must be a valid URL"),
    );
    r.insert(
        "uuid",
        Params::None,
        validators::uuid,
        Some("{field} must be a valid UUID"),
    );
    r.insert(
        "alpha",
        Params::None,
        validators::alpha,
        Some("{field} must contain only letters"),
    );
    r.insert(
        "alphaNum",
        Params::None,
        validators::alpha_num,
        Some("{field} must contain only letters and numbers"),
    );
    r.insert(
        "number",
        Params::None,
        validators::number,
        Some("{field} must contain only numbers"),
    );
    r.insert(
        "regex",
        Params::Exact(1, Pattern),
        validators::pattern,
        Some("{field} does not match required pattern"),
    );

    for (alias, target) in [
        ("minLength", "minLen"),
        ("maxLength", "maxLen"),
        ("isEmail", "email"),
        ("isUrl", "url"),
        ("isUuid", "uuid"),
        ("range", "between"),
        ("enum", "in"),
    ] {
        r.alias(alias, target);
    }
    r
});

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared table of built-in validators.
    pub fn builtin() -> &'static Registry {
        &BUILTINS
    }

    /// Register a validator, replacing any existing one with the same name.
    pub fn register<P>(&mut self, name: impl Into<String>, params: Params, predicate: P)
    where
        P: Predicate + 'static,
    {
        self.register_entry(name.into(), params, Arc::new(predicate), None);
    }

    /// Register a validator together with its default message template.
    pub fn register_with_message<P>(
        &mut self,
        name: impl Into<String>,
        params: Params,
        predicate: P,
        message: impl Into<String>,
    ) where
        P: Predicate + 'static,
    {
        self.register_entry(name.into(), params, Arc::new(predicate), Some(message.into()));
    }

    fn register_entry(
        &mut self,
        name: String,
        params: Params,
        predicate: Arc<dyn Predicate>,
        message: Option<String>,
    ) {
        self.aliases.remove(&name);
        self.entries.insert(
            name.clone(),
            Entry {
                name,
                params,
                predicate,
                message,
            },
        );
    }

    fn insert(
        &mut self,
        name: &str,
        params: Params,
        predicate: fn(&Value, &[Value]) -> bool,
        message: Option<&str>,
    ) {
        self.register_entry(
            name.to_string(),
            params,
            Arc::new(predicate),
            message.map(str::to_string),
        );
    }

    /// Make `alias` resolve to the validator registered as `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Canonical name for `name`, following one level of aliasing.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(self.canonical(name))
    }

    pub fn lookup(&self, name: &str) -> Result<&Entry> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownValidator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copy every entry and alias of `other` into `self`.
    pub fn extend(&mut self, other: &Registry) {
        for (name, entry) in &other.entries {
            self.aliases.remove(name);
            self.entries.insert(name.clone(), entry.clone());
        }
        for (alias, target) in &other.aliases {
            self.aliases.insert(alias.clone(), target.clone());
        }
    }
}

/// Resolve `name` in `custom` first, then in the built-in table.
///
/// Built-in aliases also reach a custom validator registered under the
/// canonical name, so `minLength` finds a custom `minLen`.
pub fn resolve<'a>(custom: &'a Registry, name: &str) -> Result<&'a Entry> {
    let builtins = Registry::builtin();
    custom
        .get(name)
        .or_else(|| custom.get(builtins.canonical(name)))
        .or_else(|| builtins.get(name))
        .ok_or_else(|| ConfigError::UnknownValidator(name.to_string()))
}

/// Check that `rule` names a known validator and that its parameters fit.
pub fn check_rule(custom: &Registry, rule: &Rule) -> Result<()> {
    let entry = resolve(custom, &rule.name)?;
    entry.params().check(entry.name(), &rule.params)
}
