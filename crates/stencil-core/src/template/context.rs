//! Render context: the global variables a template sees

use serde::Serialize;
use std::collections::BTreeMap;

use super::value::Value;

/// Global variables for a render
///
/// A context is only read during rendering; loop bindings live in a
/// per-render namespace layered on top of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    vars: BTreeMap<String, Value>,
}

impl TemplateContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from a TOML table
    pub fn from_toml(table: toml::Table) -> Self {
        Self {
            vars: table
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
        }
    }

    /// Create a context from a JSON object
    ///
    /// Returns `None` when `value` is not an object.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match Value::from(value) {
            Value::Map(vars) => Some(Self { vars }),
            _ => None,
        }
    }

    /// Create a context from any type serializing to a map
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value is not a map.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match Value::from_serialize(value)? {
            Value::Map(vars) => Ok(Self { vars }),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "template context must be a map, found {}",
                other.kind()
            ))),
        }
    }

    /// Bind a variable, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Merge `other` into this context
    ///
    /// Maps present on both sides are merged recursively; any other value
    /// from `other` replaces the existing one.
    pub fn merge(&mut self, other: TemplateContext) {
        for (key, value) in other.vars {
            match self.vars.get_mut(&key) {
                Some(existing) => merge_value(existing, value),
                None => {
                    self.vars.insert(key, value);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(key, value)| (key.as_str(), value))
    }
}

fn merge_value(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Map(existing), Value::Map(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::toml;

    #[test]
    fn test_from_toml() {
        let context = TemplateContext::from_toml(toml! {
            title = "Paper"
            [meta]
            year = 2026
        });
        assert_eq!(context.get("title"), Some(&Value::from("Paper")));
        assert!(context.get("meta").unwrap().as_map().unwrap().contains_key("year"));
    }

    #[test]
    fn test_from_json_requires_object() {
        assert!(TemplateContext::from_json(serde_json::json!([1, 2])).is_none());
        let context = TemplateContext::from_json(serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(context.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_from_serialize_rejects_scalars() {
        assert!(TemplateContext::from_serialize(&42).is_err());
    }

    #[test]
    fn test_merge_is_deep_for_maps() {
        let mut base = TemplateContext::from_toml(toml! {
            [site]
            name = "Base"
            lang = "en"
        });
        let overlay = TemplateContext::from_toml(toml! {
            title = "Home"
            [site]
            name = "Overlay"
        });
        base.merge(overlay);

        let site = base.get("site").unwrap().as_map().unwrap();
        assert_eq!(site["name"], Value::from("Overlay"));
        assert_eq!(site["lang"], Value::from("en"));
        assert_eq!(base.get("title"), Some(&Value::from("Home")));
    }

    #[test]
    fn test_from_iter() {
        let context: TemplateContext = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(context.len(), 2);
    }
}
