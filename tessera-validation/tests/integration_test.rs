//! Integration tests for tessera-validation

use serde::Serialize;
use serde_json::{Value, json};
use tessera_validation::*;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserForm {
    name: String,
    email: String,
    create_at: i64,
    safe: i64,
    update_at: Option<String>,
    code: String,
}

impl Validatable for UserForm {
    fn schema() -> Result<Schema> {
        Schema::builder()
            .field("Name", "required|minLen:7")
            .field("Email", "email")
            .field("CreateAt", "email")
            .field("Safe", "-")
            .field("UpdateAt", "required")
            .field("Code", "customValidator")
            .validator("customValidator", Params::None, |v: &Value, _: &[Value]| {
                v.as_str().is_some_and(|s| s.len() == 4)
            })
            .messages([
                ("required", "oh! the {field} is required"),
                ("Name.required", "message for special field"),
            ])
            .translates([("Name", "User Name"), ("Email", "User Email")])
            .build()
    }
}

fn sample_map() -> Validator {
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
    let mut v = sample_map();
    v.add_rule("name", "required").unwrap();
    v.add_rule_with("name", "minLen", [7]).unwrap();
    v.add_rule_with("age", "max", [99]).unwrap();
    v.add_rule_with("age", "min", [1]).unwrap();
    v.with_scenes(scenes! {
        "create" => ["name", "email"],
        "update" => ["name"],
    });

    assert!(!v.validate());
    assert_eq!(v.errors().get("name"), Some("name value min length is 7"));
    assert_eq!(v.errors().get("age"), Some("age max value is 99"));
}

#[test]
fn test_struct_validation() {
    let form = UserForm {
        name: "inhere".to_string(),
        ..Default::default()
    };

    let mut v = Validator::from_struct(&form).unwrap();
    assert!(!v.validate());

    let errors = v.errors();
    assert_eq!(errors.get("Name"), Some("User Name value min length is 7"));
    assert_eq!(
        errors.get("Email"),
        Some("User Email value is an invalid email address")
    );
    assert_eq!(
        errors.get("CreateAt"),
        Some("CreateAt value is an invalid email address")
    );
    assert_eq!(errors.get("UpdateAt"), Some("oh! the UpdateAt is required"));
    assert_eq!(errors.get("Code"), Some("Code is invalid"));
    assert!(!errors.has("Safe"));
    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        vec!["Name", "Email", "CreateAt", "UpdateAt", "Code"]
    );
}

#[test]
fn test_struct_field_specific_message() {
    let form = UserForm::default();
    let mut v = form.validator().unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().get("Name"), Some("message for special field"));
}

#[test]
fn test_struct_passes() {
    let form = UserForm {
        name: "inhere!".to_string(),
        email: "some@e.com".to_string(),
        create_at: 0,
        safe: 0,
        update_at: Some("2024-01-01T00:00:00Z".to_string()),
        code: "abcd".to_string(),
    };

    let mut v = form.validator().unwrap();
    v.with_scenes(Scenes::new().with("profile", ["Name", "Email", "UpdateAt", "Code"]));
    v.at_scene("profile").unwrap();

    assert!(v.validate());
    assert!(v.passed());
    assert_eq!(v.safe_value("Code"), Some(&json!("abcd")));
}

#[test]
fn test_required_uses_default_template() {
    let mut v = Validator::new([("title", json!(""))]);
    v.add_rule("title", "required").unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().get("title"), Some("title is required"));
}

#[test]
fn test_min_len_boundary_is_independent_of_other_rules() {
    for (value, ok) in [("abcdef", false), ("abcdefg", true), ("abcdefgh", true)] {
        let mut v = Validator::new([("name", value)]);
        v.add_rule_with("name", "minLen", [7]).unwrap();
        v.add_rule("other", "required").unwrap();

        v.validate();
        assert_eq!(!v.errors().has("name"), ok, "value {:?}", value);
        assert!(v.errors().has("other"));
    }
}

#[test]
fn test_scene_never_evaluates_outside_fields() {
    let mut v = sample_map();
    v.add_rule("age", "required").unwrap();
    v.add_rule_with("age", "max", [1]).unwrap();
    v.add_rule("missing", "required").unwrap();
    v.add_rule("email", "email").unwrap();
    v.with_scenes(scenes! { "create" => ["email"] });
    v.at_scene("create").unwrap();

    assert!(v.validate());
    assert!(v.errors().is_empty());
}

#[test]
fn test_only_first_error_kept_per_field() {
    let mut v = Validator::new([("age", json!("abc"))]);
    v.add_rule_with("age", "min", [1]).unwrap();
    v.add_rule_with("age", "max", [99]).unwrap();
    v.add_rule("age", "number").unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().len(), 1);
    assert_eq!(v.errors().get_error("age").unwrap().rule, "min");
}

#[test]
fn test_unknown_rule_in_schema() {
    #[derive(Serialize)]
    struct Bad {
        code: String,
    }

    impl Validatable for Bad {
        fn schema() -> Result<Schema> {
            Schema::builder().field("code", "customValidator").build()
        }
    }

    let bad = Bad {
        code: "x".to_string(),
    };
    assert!(matches!(
        Validator::from_struct(&bad),
        Err(ConfigError::UnknownValidator(_))
    ));
}

#[test]
fn test_struct_must_serialize_to_object() {
    #[derive(Serialize)]
    struct Wrapper(u32);

    impl Validatable for Wrapper {
        fn schema() -> Result<Schema> {
            Schema::builder().build()
        }
    }

    assert!(matches!(
        Validator::from_struct(&Wrapper(1)),
        Err(ConfigError::Bind(_))
    ));
}

#[test]
fn test_schema_reused_across_values() {
    let schema = Schema::builder()
        .field("email", "required|email")
        .build()
        .unwrap();

    let mut ok = Validator::from_schema([("email", "a@b.io")], &schema);
    let mut bad = Validator::from_schema([("email", "nope")], &schema);

    assert!(ok.validate());
    assert!(!bad.validate());
    assert_eq!(
        bad.errors().get("email"),
        Some("email value is an invalid email address")
    );
}

#[test]
fn test_options_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
skip_empty = true

[messages]
max = "{{field}} is too large (max {{0}})"

[translates]
age = "Age"
"#
    )
    .unwrap();

    let options = ValidatorOptions::from_file(file.path()).unwrap();
    let mut v = Validator::new([("age", json!(120)), ("nickname", json!(""))]);
    v.with_options(&options);
    v.add_rule_with("age", "max", [99]).unwrap();
    v.add_rule_with("nickname", "minLen", [3]).unwrap();

    assert!(!v.validate());
    assert_eq!(v.errors().get("age"), Some("Age is too large (max 99)"));
    assert!(!v.errors().has("nickname"));
}

#[test]
fn test_errors_to_json() {
    let mut v = sample_map();
    v.add_rule_with("age", "between", [1, 99]).unwrap();

    assert!(!v.validate());
    assert_eq!(
        v.into_errors().to_json(),
        json!({"errors": {"age": "age value must be in the range 1 - 99"}})
    );
}

#[test]
fn test_in_rule_message_lists_choices() {
    let mut v = Validator::new([("role", "root")]);
    v.add_rules("role", "in:admin,user").unwrap();

    assert!(!v.validate());
    assert_eq!(
        v.errors().get("role"),
        Some("role value must be one of: admin, user")
    );
}
