// Scenes: named subsets of fields

use std::collections::{HashMap, HashSet};

/// Named field subsets, e.g. `create` and `update`.
///
/// Field names that no rule refers to are allowed and simply never match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenes {
    scenes: HashMap<String, HashSet<String>>,
}

impl Scenes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) a scene.
    pub fn add<I, S>(&mut self, name: impl Into<String>, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenes
            .insert(name.into(), fields.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`Scenes::add`].
    pub fn with<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(name, fields);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Fields included in `name`
    pub fn fields(&self, name: &str) -> Option<&HashSet<String>> {
        self.scenes.get(name)
    }

    /// Whether `field` is validated under `scene`. `None` means no restriction.
    pub fn includes(&self, scene: Option<&str>, field: &str) -> bool {
        match scene {
            None => true,
            Some(name) => self
                .scenes
                .get(name)
                .is_some_and(|fields| fields.contains(field)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Add every scene of `other`, replacing scenes with the same name.
    pub fn merge(&mut self, other: &Scenes) {
        for (name, fields) in &other.scenes {
            self.scenes.insert(name.clone(), fields.clone());
        }
    }
}

impl<K, I, S> FromIterator<(K, I)> for Scenes
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut scenes = Self::new();
        for (name, fields) in iter {
            scenes.add(name, fields);
        }
        scenes
    }
}

/// Build [`Scenes`] from `name => [fields]` pairs.
///
/// ```
/// use tessera_validation::scenes;
///
/// let scenes = scenes! {
///     "create" => ["name", "email"],
///     "update" => ["name"],
/// };
/// assert!(scenes.includes(Some("update"), "name"));
/// assert!(!scenes.includes(Some("update"), "email"));
/// ```
#[macro_export]
macro_rules! scenes {
    ($($name:expr => [$($field:expr),* $(,)?]),* $(,)?) => {{
        let mut scenes = $crate::Scenes::new();
        $(
            let fields: ::std::vec::Vec<::std::string::String> =
                ::std::vec![$(::std::string::String::from($field)),*];
            scenes.add($name, fields);
        )*
        scenes
    }};
}
