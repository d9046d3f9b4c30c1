// Built-in validators

use crate::value::{as_length, as_number, is_empty, length, loosely_equal};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

// Patterns from `regex:` rules, compiled once per distinct source
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Compile `source`, reusing an earlier compilation of the same pattern.
pub(crate) fn compiled_pattern(source: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERNS.read().get(source) {
        return Ok(re.clone());
    }
    let re = Regex::new(source)?;
    PATTERNS.write().insert(source.to_string(), re.clone());
    Ok(re)
}

fn text(value: &Value) -> Option<&str> {
    value.as_str()
}

fn matches(re: &Regex, value: &Value) -> bool {
    text(value).is_some_and(|s| re.is_match(s))
}

fn param_length(params: &[Value], index: usize) -> Option<usize> {
    params.get(index).and_then(as_length)
}

fn param_number(params: &[Value], index: usize) -> Option<f64> {
    params.get(index).and_then(as_number)
}

/// `-`: never fails
pub fn skip(_value: &Value, _params: &[Value]) -> bool {
    true
}

/// `required`: the value is present and non-zero
pub fn required(value: &Value, _params: &[Value]) -> bool {
    !is_empty(value)
}

/// `minLen:N`
pub fn min_len(value: &Value, params: &[Value]) -> bool {
    match (length(value), param_length(params, 0)) {
        (Some(len), Some(min)) => len >= min,
        _ => false,
    }
}

/// `maxLen:N`
pub fn max_len(value: &Value, params: &[Value]) -> bool {
    match (length(value), param_length(params, 0)) {
        (Some(len), Some(max)) => len <= max,
        _ => false,
    }
}

/// `len:N`: exact length
pub fn exact_len(value: &Value, params: &[Value]) -> bool {
    match (length(value), param_length(params, 0)) {
        (Some(len), Some(want)) => len == want,
        _ => false,
    }
}

/// `min:N`
pub fn min(value: &Value, params: &[Value]) -> bool {
    match (as_number(value), param_number(params, 0)) {
        (Some(n), Some(min)) => n >= min,
        _ => false,
    }
}

/// `max:N`
pub fn max(value: &Value, params: &[Value]) -> bool {
    match (as_number(value), param_number(params, 0)) {
        (Some(n), Some(max)) => n <= max,
        _ => false,
    }
}

/// `between:MIN,MAX`: inclusive on both ends
pub fn between(value: &Value, params: &[Value]) -> bool {
    match (
        as_number(value),
        param_number(params, 0),
        param_number(params, 1),
    ) {
        (Some(n), Some(lo), Some(hi)) => n >= lo && n <= hi,
        _ => false,
    }
}

/// `in:A,B,...`
pub fn one_of(value: &Value, params: &[Value]) -> bool {
    params.iter().any(|p| loosely_equal(value, p))
}

/// `notIn:A,B,...`
pub fn none_of(value: &Value, params: &[Value]) -> bool {
    !one_of(value, params)
}

pub fn email(value: &Value, _params: &[Value]) -> bool {
    matches(&EMAIL_REGEX, value)
}

pub fn url(value: &Value, _params: &[Value]) -> bool {
    matches(&URL_REGEX, value)
}

pub fn uuid(value: &Value, _params: &[Value]) -> bool {
    matches(&UUID_REGEX, value)
}

pub fn alpha(value: &Value, _params: &[Value]) -> bool {
    matches(&ALPHA_REGEX, value)
}

pub fn alpha_num(value: &Value, _params: &[Value]) -> bool {
    matches(&ALPHANUMERIC_REGEX, value)
}

/// `number`: unsigned integer, or a string of ASCII digits
pub fn number(value: &Value, _params: &[Value]) -> bool {
    match value {
        Value::Number(n) => n.is_u64(),
        _ => matches(&NUMERIC_REGEX, value),
    }
}

/// `regex:PATTERN`
pub fn pattern(value: &Value, params: &[Value]) -> bool {
    let Some(source) = params.first().and_then(Value::as_str) else {
        return false;
    };
    match compiled_pattern(source) {
        Ok(re) => matches(&re, value),
        Err(_) => false,
    }
}
