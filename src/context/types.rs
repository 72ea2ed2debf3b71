//! Context values

use crate::types::{JsonObject, JsonValue};

/// Values handed from a parent record to its child stream invocations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: JsonObject,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to the context
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Check if the context holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The context as a JSON object
    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.values.clone())
    }

    /// Short `key=value` description for logs
    pub fn describe(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| match v {
                JsonValue::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<JsonObject> for Context {
    fn from(values: JsonObject) -> Self {
        Self { values }
    }
}
