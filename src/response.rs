use crate::convert;
use crate::error::{Bitrix24Error, Result};
use crate::time::ResponseTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Param is a convenience type for parameters passed to REST methods.
pub type Param = serde_json::Map<String, Value>;

/// Success envelope returned by every REST method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Method payload
    #[serde(default)]
    pub result: Value,

    /// Total number of items for list methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Offset of the next page for list methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u64>,

    /// Server timing information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<ResponseTime>,
}

/// Failure envelope: `{"error": "...", "error_description": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl Response {
    /// Get the raw result value
    pub fn raw(&self) -> &Value {
        &self.result
    }

    /// Unmarshal the result into the provided type
    pub fn apply<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.result.clone()).map_err(Bitrix24Error::from)
    }

    /// Consume the response and unmarshal the result
    pub fn into_result<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.result).map_err(Bitrix24Error::from)
    }

    /// Unmarshal a list result together with its paging information
    pub fn into_items<T>(self) -> Result<ItemsResult<T>>
    where
        T: DeserializeOwned,
    {
        let total = self.total;
        let next = self.next;
        Ok(ItemsResult {
            items: serde_json::from_value(unwrap_items(self.result))?,
            total,
            next,
        })
    }

    /// Get a value from the result by a slash-separated path.
    /// For example, "CALL_ID" or "items/0/ID".
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.result;

        for part in path.split('/').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the result by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

/// List methods answer either a bare array or `{"items": [...]}`
pub(crate) fn unwrap_items(result: Value) -> Value {
    match result {
        Value::Object(mut map) if map.get("items").map_or(false, Value::is_array) => {
            map.remove("items").unwrap_or(Value::Null)
        }
        Value::Null => Value::Array(Vec::new()),
        other => other,
    }
}

/// Identifier of a created item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedItemResult {
    pub id: i64,
}

impl<'de> Deserialize<'de> for AddedItemResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        convert::int(deserializer).map(|id| AddedItemResult { id })
    }
}

/// Outcome of an update call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatedItemResult {
    pub updated: bool,
}

impl<'de> Deserialize<'de> for UpdatedItemResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        flag(deserializer).map(|updated| UpdatedItemResult { updated })
    }
}

/// Outcome of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedItemResult {
    pub deleted: bool,
}

impl<'de> Deserialize<'de> for DeletedItemResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        flag(deserializer).map(|deleted| DeletedItemResult { deleted })
    }
}

// Methods answer `true`, `"Y"`, `1` or an empty array on success
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().map_or(true, |n| n != 0),
        Value::String(s) => matches!(s.as_str(), "Y" | "1" | "true"),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Page of a list method
#[derive(Debug, Clone)]
pub struct ItemsResult<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub next: Option<u64>,
}

impl<T> ItemsResult<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Field description as returned by the `*.fields` methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_immutable: bool,
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default)]
    pub is_dynamic: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// Field map keyed by field code
pub type FieldsResult = HashMap<String, FieldDescription>;
