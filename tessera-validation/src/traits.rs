// Validation traits

use crate::{Result, Schema, Validator};
use serde::Serialize;
use serde_json::Value;

/// A named check applied to one field value.
///
/// `params` are the rule parameters in declaration order, already checked
/// against the validator's parameter signature when the rule was registered.
pub trait Predicate: Send + Sync {
    fn check(&self, value: &Value, params: &[Value]) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Value, &[Value]) -> bool + Send + Sync,
{
    fn check(&self, value: &Value, params: &[Value]) -> bool {
        self(value, params)
    }
}

/// A data shape with a declared rule schema.
///
/// The schema is declared explicitly instead of being derived from field
/// annotations; field keys are the serialized names of the type's fields.
///
/// ```
/// use serde::Serialize;
/// use tessera_validation::{Result, Schema, Validatable};
///
/// #[derive(Serialize)]
/// struct Login {
///     email: String,
///     password: String,
/// }
///
/// impl Validatable for Login {
///     fn schema() -> Result<Schema> {
///         Schema::builder()
///             .field("email", "required|email")
///             .field("password", "required|minLen:8")
///             .build()
///     }
/// }
///
/// let login = Login { email: "a@b.io".into(), password: "short".into() };
/// let mut v = login.validator().unwrap();
/// assert!(!v.validate());
/// assert_eq!(v.errors().get("password"), Some("password value min length is 8"));
/// ```
pub trait Validatable: Serialize {
    fn schema() -> Result<Schema>;

    /// A fresh validator bound to this value.
    fn validator(&self) -> Result<Validator>
    where
        Self: Sized,
    {
        Validator::from_struct(self)
    }
}
