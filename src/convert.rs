//! Serde adapters for the loosely typed values the REST API returns.
//!
//! The portal serializes most scalars as strings: identifiers arrive as
//! `"42"`, flags as `"Y"`/`"N"`, empty values as `""` and empty maps as `[]`.
//! These functions are used through `#[serde(deserialize_with = "...")]`,
//! the two flag serializers through `#[serde(serialize_with = "...")]`.

use crate::time::Time;
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::hash::Hash;

fn value_to_int<E: Error>(value: &Value) -> Result<Option<i64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| E::custom(format!("expected integer, got {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected integer string, got {:?}", s))),
        Value::Bool(b) => Ok(Some(i64::from(*b))),
        other => Err(E::custom(format!("expected integer, got {}", other))),
    }
}

fn value_to_float<E: Error>(value: &Value) -> Result<Option<f64>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| E::custom(format!("expected number, got {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("expected numeric string, got {:?}", s))),
        other => Err(E::custom(format!("expected number, got {}", other))),
    }
}

fn value_to_bool<E: Error>(value: &Value) -> Result<Option<bool>, E> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(n.as_i64() != Some(0))),
        Value::String(s) => match s.trim() {
            "" => Ok(None),
            "Y" | "y" | "1" | "true" => Ok(Some(true)),
            "N" | "n" | "0" | "false" => Ok(Some(false)),
            other => Err(E::custom(format!("expected Y/N flag, got {:?}", other))),
        },
        other => Err(E::custom(format!("expected Y/N flag, got {}", other))),
    }
}

/// Integer that may arrive as a number or a numeric string
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_int::<D::Error>(&value)?.ok_or_else(|| D::Error::custom("expected integer, got empty value"))
}

pub fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_int(&value)
}

pub fn opt_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_float(&value)
}

/// `"Y"`/`"N"` flag, also accepting JSON booleans
pub fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_bool::<D::Error>(&value)?.ok_or_else(|| D::Error::custom("expected Y/N flag, got empty value"))
}

pub fn opt_yes_no<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_bool(&value)
}

/// Timestamp where an empty string means "not set"
pub fn opt_time<'de, D>(deserializer: D) -> Result<Option<Time>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Time::parse(&s).map(Some).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected timestamp, got {}", other))),
    }
}

/// String where an empty value means "not set"
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!("expected string, got {}", other))),
    }
}

/// Associative array that the portal encodes as `[]` when empty
pub fn php_map<'de, D, K, V>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(HashMap::new()),
        Value::Array(items) if items.is_empty() => Ok(HashMap::new()),
        // Sequential arrays come back as lists; key them by position
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let key = serde_json::from_value(Value::String(index.to_string()))
                    .map_err(D::Error::custom)?;
                let value = serde_json::from_value(item).map_err(D::Error::custom)?;
                Ok((key, value))
            })
            .collect(),
        object @ Value::Object(_) => serde_json::from_value(object).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected map, got {}", other))),
    }
}

/// List of identifiers given as numbers or numeric strings
pub fn int_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| value_to_int::<D::Error>(item).transpose())
            .collect(),
        single => Ok(value_to_int::<D::Error>(&single)?.into_iter().collect()),
    }
}

/// Serialize a flag as `1`/`0`
pub fn int_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Serialize a flag as `"Y"`/`"N"`
pub fn yn_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "Y" } else { "N" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "int")]
        id: i64,
        #[serde(default, deserialize_with = "opt_int")]
        owner: Option<i64>,
        #[serde(default, deserialize_with = "opt_float")]
        amount: Option<f64>,
        #[serde(deserialize_with = "yes_no")]
        opened: bool,
        #[serde(default, deserialize_with = "opt_yes_no")]
        closed: Option<bool>,
        #[serde(default, deserialize_with = "opt_time")]
        created: Option<Time>,
        #[serde(default, deserialize_with = "php_map")]
        totals: HashMap<String, i64>,
        #[serde(default, deserialize_with = "int_list")]
        departments: Vec<i64>,
    }

    #[test]
    fn test_loosely_typed_values() {
        let sample: Sample = serde_json::from_str(
            r#"{
                "id": "42",
                "owner": "",
                "amount": "1500.50",
                "opened": "Y",
                "closed": false,
                "created": "2024-03-01T10:00:00+03:00",
                "totals": [],
                "departments": ["1", 5]
            }"#,
        )
        .unwrap();

        assert_eq!(sample.id, 42);
        assert_eq!(sample.owner, None);
        assert_eq!(sample.amount, Some(1500.5));
        assert!(sample.opened);
        assert_eq!(sample.closed, Some(false));
        assert_eq!(sample.created.map(|t| t.unix()), Some(1709276400));
        assert!(sample.totals.is_empty());
        assert_eq!(sample.departments, vec![1, 5]);
    }

    #[test]
    fn test_empty_time_is_none() {
        let sample: Sample =
            serde_json::from_str(r#"{"id": 1, "opened": "N", "created": "", "totals": {"a": 3}}"#)
                .unwrap();
        assert!(!sample.opened);
        assert!(sample.created.is_none());
        assert_eq!(sample.totals.get("a"), Some(&3));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": "abc", "opened": "Y"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "opened": "maybe"}"#).is_err());
    }
}
