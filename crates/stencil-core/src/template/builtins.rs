//! Built-in modifiers
//!
//! Registered by [`ModifierRegistry::with_builtins`]. Host applications can
//! replace any of them by registering the same name again.

use anyhow::{anyhow, bail};

use super::registry::ModifierRegistry;
use super::value::Value;

/// Names of the built-in modifiers
pub const BUILTIN_MODIFIERS: &[&str] = &[
    "upper",
    "lower",
    "trim",
    "capitalize",
    "length",
    "escape",
    "json",
];

pub(crate) fn register_modifiers(registry: &mut ModifierRegistry) {
    registry
        .register("upper", |value| map_text(value, |s| s.to_uppercase()))
        .register("lower", |value| map_text(value, |s| s.to_lowercase()))
        .register("trim", |value| map_text(value, |s| s.trim().to_string()))
        .register("capitalize", |value| map_text(value, capitalize))
        .register("length", length)
        .register("escape", |value| {
            map_text(value, |s| html_escape::encode_safe(s).into_owned())
        })
        .register("json", |value| {
            let json = serde_json::Value::from(value);
            Ok(Value::String(serde_json::to_string(&json)?))
        });
}

/// Apply `f` to the text form of a scalar
fn map_text(value: Value, f: impl Fn(&str) -> String) -> anyhow::Result<Value> {
    let text = value
        .to_text()
        .ok_or_else(|| anyhow!("expected text, found {}", value.kind()))?;
    Ok(Value::String(f(&text)))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn length(value: Value) -> anyhow::Result<Value> {
    let len = match &value {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => bail!("length of {} is undefined", other.kind()),
    };
    Ok(Value::from(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, value: Value) -> anyhow::Result<Value> {
        let registry = ModifierRegistry::with_builtins();
        registry.get(name).unwrap().apply(value)
    }

    #[test]
    fn test_all_builtins_registered() {
        let registry = ModifierRegistry::with_builtins();
        for name in BUILTIN_MODIFIERS {
            assert!(registry.contains(name), "missing builtin '{}'", name);
        }
    }

    #[test]
    fn test_case_modifiers() {
        assert_eq!(apply("upper", Value::from("Bob")).unwrap(), Value::from("BOB"));
        assert_eq!(apply("lower", Value::from("Bob")).unwrap(), Value::from("bob"));
        assert_eq!(apply("capitalize", Value::from("émile")).unwrap(), Value::from("Émile"));
        assert_eq!(apply("trim", Value::from("  x \n")).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_text_modifiers_accept_numbers() {
        assert_eq!(apply("upper", Value::Int(7)).unwrap(), Value::from("7"));
    }

    #[test]
    fn test_text_modifiers_reject_lists() {
        let err = apply("upper", Value::from(vec![1])).unwrap_err();
        assert!(err.to_string().contains("list"));
    }

    #[test]
    fn test_length() {
        assert_eq!(apply("length", Value::from("héllo")).unwrap(), Value::Int(5));
        assert_eq!(apply("length", Value::from(vec![1, 2, 3])).unwrap(), Value::Int(3));
        assert!(apply("length", Value::Bool(true)).is_err());
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            apply("escape", Value::from("<b> & \"q\"")).unwrap(),
            Value::from("&lt;b&gt; &amp; &quot;q&quot;")
        );
    }

    #[test]
    fn test_json() {
        assert_eq!(
            apply("json", Value::from(vec!["a", "b"])).unwrap(),
            Value::from("[\"a\",\"b\"]")
        );
    }
}
