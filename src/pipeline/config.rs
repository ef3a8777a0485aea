//! Module configuration: a string-keyed mapping of JSON values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-module configuration. Recognized keys are module-specific
/// (`start`, `count`, `factor`, `expr`, `mode`, `field`, `body`);
/// unknown keys are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleConfig(Map<String, Value>);

impl ModuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style insert, for assembling configs inline.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer lookup. Accepts float values by truncation, mirroring the
    /// loose typing of hand-edited JSON configs.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.0.get(key) {
            Some(v) => v
                .as_i64()
                .or_else(|| v.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            None => default,
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ModuleConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_getters_with_defaults() {
        let cfg = ModuleConfig::new().with("start", 3).with("factor", 2.5);
        assert_eq!(cfg.get_i64("start", 1), 3);
        assert_eq!(cfg.get_i64("count", 5), 5);
        assert_eq!(cfg.get_f64("factor", 1.0), 2.5);
    }

    #[test]
    fn test_float_truncates_to_int() {
        let cfg = ModuleConfig::new().with("count", 4.9);
        assert_eq!(cfg.get_i64("count", 0), 4);
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(ModuleConfig::from_value(json!({"a": 1})).is_some());
        assert!(ModuleConfig::from_value(json!([1])).is_none());
    }

    #[test]
    fn test_serde_transparent() {
        let cfg: ModuleConfig = serde_json::from_value(json!({"expr": "x > 2"})).unwrap();
        assert_eq!(cfg.get_str("expr"), Some("x > 2"));
        assert_eq!(serde_json::to_value(&cfg).unwrap(), json!({"expr": "x > 2"}));
    }
}
