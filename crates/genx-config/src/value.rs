//! Configuration values
//!
//! `ConfigValue` is the typed union every notation resolves into and
//! `ConfigMap` the string-keyed object holding them. All writes go through
//! [`ConfigMap::insert`], which refuses keys that would be dangerous once a
//! map is handed to script-side consumers.

use std::collections::BTreeMap;

use serde::Serialize;

/// Keys never accepted from any notation
pub const DANGEROUS_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

#[inline]
pub fn is_dangerous_key(key: &str) -> bool {
    DANGEROUS_KEYS.contains(&key)
}

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ConfigValue>),
    Object(ConfigMap),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ConfigMap> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(ConfigMap::from_json_object(map)),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        Self::Object(map)
    }
}

/// String-keyed configuration object
///
/// Keys are unique. Ordering is not significant; a sorted map keeps debug
/// output and serialisation stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigMap(BTreeMap<String, ConfigValue>);

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, overwriting any previous value.
    /// Returns `false` and drops the value if the key is dangerous.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> bool {
        let key = key.into();
        if is_dangerous_key(&key) {
            tracing::debug!("Rejected dangerous configuration key {:?}", key);
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow merge: every key of `layer` overwrites the same key here
    pub fn merge(&mut self, layer: &ConfigMap) {
        for (key, value) in &layer.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// `self` with `layer` merged on top, leaving both inputs untouched
    pub fn merged(&self, layer: &ConfigMap) -> ConfigMap {
        let mut out = self.clone();
        out.merge(layer);
        out
    }

    /// Convert a JSON object, dropping dangerous keys at every depth
    pub fn from_json_object(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut out = Self::new();
        for (key, value) in map {
            out.insert(key, ConfigValue::from(value));
        }
        out
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_rejects_dangerous_keys() {
        let mut map = ConfigMap::new();
        for key in DANGEROUS_KEYS {
            assert!(!map.insert(key, "x"));
        }
        assert!(map.is_empty());
        assert!(map.insert("format", "currency"));
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let base: ConfigMap = [("format", "number"), ("locale", "en-US")].into_iter().collect();
        let layer: ConfigMap = [("format", "currency")].into_iter().collect();

        let out = base.merged(&layer);
        assert_eq!(out.get("format"), Some(&ConfigValue::from("currency")));
        assert_eq!(out.get("locale"), Some(&ConfigValue::from("en-US")));
        // inputs untouched
        assert_eq!(base.get("format"), Some(&ConfigValue::from("number")));
    }

    #[test]
    fn test_from_json_filters_nested_keys() {
        let value = ConfigValue::from(json!({
            "format": "currency",
            "decimals": 2,
            "nested": {"__proto__": {"polluted": true}, "ok": [1, "two", null]},
            "constructor": "bad"
        }));

        let map = value.as_object().unwrap();
        assert!(!map.contains_key("constructor"));
        assert_eq!(map.get("decimals"), Some(&ConfigValue::Number(2.0)));
        let nested = map.get("nested").and_then(ConfigValue::as_object).unwrap();
        assert_eq!(nested.keys().collect::<Vec<_>>(), vec!["ok"]);
        assert_eq!(
            nested.get("ok"),
            Some(&ConfigValue::Array(vec![
                ConfigValue::Number(1.0),
                ConfigValue::from("two"),
                ConfigValue::Null,
            ]))
        );
    }

    #[test]
    fn test_serialize_as_plain_json() {
        let map: ConfigMap = [("format", ConfigValue::from("currency")), ("decimals", ConfigValue::Number(2.0))]
            .into_iter()
            .collect();
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"decimals":2.0,"format":"currency"}"#);
    }
}
