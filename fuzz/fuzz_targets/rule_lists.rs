//! Fuzz target for rule-list parsing and evaluation.
//!
//! Any rule list must either be rejected at declaration time or run to
//! completion without panicking, whatever the field value.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use tessera_validation::Validator;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl From<FuzzValue> for Value {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(b),
            FuzzValue::Int(i) => Value::from(i),
            FuzzValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FuzzValue::Text(s) => Value::String(s),
            FuzzValue::List(items) => Value::from(items),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    rules: String,
    value: FuzzValue,
    skip_empty: bool,
}

fuzz_target!(|input: FuzzInput| {
    let mut v = Validator::new([("field", Value::from(input.value))]);
    v.skip_empty(input.skip_empty);

    if v.add_rules("field", &input.rules).is_err() {
        assert!(v.rules().is_empty());
        return;
    }

    let passed = v.validate();
    assert_eq!(passed, v.errors().is_empty());
    assert!(v.errors().len() <= 1);
});
