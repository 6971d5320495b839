//! Typed access to tool call arguments.

use crate::error::CourierError;

/// Tool call arguments as sent by the model.
///
/// Models occasionally send the argument object JSON-encoded as a string; every
/// accessor sees through that.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        let value = match value {
            serde_json::Value::String(raw) if raw.trim().is_empty() => serde_json::json!({}),
            serde_json::Value::String(raw) => {
                serde_json::from_str(raw.trim()).unwrap_or(serde_json::Value::String(raw))
            }
            other => other,
        };
        Self { value }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn get_str(&self, key: &str) -> Result<&str, CourierError> {
        self.get_str_opt(key)
            .ok_or_else(|| CourierError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Integer argument; numeric strings are accepted too.
    pub fn get_u64_opt(&self, key: &str) -> Option<u64> {
        let v = self.value.get(key)?;
        v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    }

    /// Deserialize the whole argument object into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, CourierError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            CourierError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
