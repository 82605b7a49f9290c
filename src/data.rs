//! Data context: the JSON object placeholders and table data sources
//! resolve against.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DeepPrintError;

/// Mapping from key to scalar, array or nested object.
///
/// Read-only input to the engine. Lookups are flat: `{{order.id}}` looks up
/// the key `"order.id"`, not a nested path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext(Map<String, Value>);

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a data context from JSON text. Anything but a JSON object is
    /// rejected.
    pub fn from_json(json: &str) -> Result<Self, DeepPrintError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| DeepPrintError::Data(e.to_string()))?;
        Self::from_value(value)
    }

    /// Wrap a decoded JSON value. Anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, DeepPrintError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DeepPrintError::Data(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only if `key` has no value yet. Returns whether it inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: impl FnOnce() -> Value) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), value());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for DataContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataContext {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let ctx = DataContext::from_json(r#"{"store_name": "Cafe", "items": []}"#).unwrap();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("store_name"), Some(&json!("Cafe")));
    }

    #[test]
    fn test_rejects_non_object() {
        let err = DataContext::from_json("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("array"));
        assert!(DataContext::from_json("not json").is_err());
    }

    #[test]
    fn test_insert_if_absent_first_wins() {
        let mut ctx = DataContext::new();
        assert!(ctx.insert_if_absent("k", || json!(1)));
        assert!(!ctx.insert_if_absent("k", || json!(2)));
        assert_eq!(ctx.get("k"), Some(&json!(1)));
    }

    #[test]
    fn test_from_iter() {
        let ctx: DataContext = [("a", json!(1)), ("b", json!("x"))].into_iter().collect();
        assert!(ctx.contains_key("a"));
        assert_eq!(ctx.into_value(), json!({"a": 1, "b": "x"}));
    }
}
