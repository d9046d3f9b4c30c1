//! Integration tests for common Tessera workflows.
//!
//! These go through the root crate's re-exports the way an application would.

use serde::Serialize;
use serde_json::{Value, json};
use tessera::prelude::*;

// =============================================================================
// Create / update forms sharing one schema
// =============================================================================

#[derive(Serialize)]
struct ArticleForm {
    id: Option<u64>,
    title: String,
    body: String,
    tags: Vec<String>,
}

impl Validatable for ArticleForm {
    fn schema() -> tessera::Result<Schema> {
        Schema::builder()
            .field("id", "required|min:1")
            .field("title", "required|minLen:3|maxLen:80")
            .field("body", "required")
            .field("tags", "maxLen:3")
            .scenes(scenes! {
                "create" => ["title", "body", "tags"],
                "update" => ["id", "title", "body", "tags"],
            })
            .messages([("title.minLen", "{field} needs at least {0} characters")])
            .translates([("title", "Title")])
            .build()
    }
}

#[test]
fn test_create_scene_skips_id() {
    let form = ArticleForm {
        id: None,
        title: "Hi".to_string(),
        body: "text".to_string(),
        tags: vec![],
    };

    let mut v = form.validator().unwrap();
    v.at_scene("create").unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().len(), 1);
    assert_eq!(
        v.errors().get("title"),
        Some("Title needs at least 3 characters")
    );
}

#[test]
fn test_update_scene_requires_id() {
    let form = ArticleForm {
        id: None,
        title: "Hello".to_string(),
        body: "text".to_string(),
        tags: vec!["a".into(), "b".into(), "c".into(), "d".into()],
    };

    let mut v = form.validator().unwrap();
    v.at_scene("update").unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().get("id"), Some("id is required"));
    assert_eq!(v.errors().get("tags"), Some("tags value max length is 3"));
}

// =============================================================================
// Request bodies
// =============================================================================

#[test]
fn test_json_request_body() {
    let body: Value =
        serde_json::from_str(r#"{"email": "someone@example.com", "age": "17"}"#).unwrap();

    let mut v = Validator::from_json(body).unwrap();
    v.add_rules("email", "required|email").unwrap();
    v.add_rules("age", "required|number|min:18").unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().get("age"), Some("age min value is 18"));
    assert_eq!(
        v.errors().to_json(),
        json!({"errors": {"age": "age min value is 18"}})
    );
    assert_eq!(
        v.safe_data().get("email"),
        Some(&json!("someone@example.com"))
    );
}

// =============================================================================
// Shared options
// =============================================================================

#[test]
fn test_options_from_vars() {
    let options = ValidatorOptions::from_vars([("TESSERA_VALIDATION_SKIP_EMPTY", "1")]).unwrap();

    let mut v = Validator::new([("website", "")]);
    v.with_options(&options);
    v.add_rule("website", "url").unwrap();

    assert!(v.validate());
}

#[test]
fn test_config_errors_surface_at_declaration() {
    let result = Schema::builder().field("age", "between:1").build();
    assert!(matches!(result, Err(ConfigError::ParamCount { .. })));

    let mut v = Validator::new([("age", 1)]);
    assert!(matches!(
        v.add_rule_with("age", "regex", ["("]),
        Err(ConfigError::InvalidParam { .. })
    ));
}

#[test]
fn test_log_macros_are_reexported() {
    tessera::log::debug!("validating {} fields", 2);
    assert!(!tessera::log::is_level_enabled(tessera::log::Level::Off));
}
