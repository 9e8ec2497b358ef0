use crate::convert;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

pub(crate) const ON_USER_ADD: &str = "ONUSERADD";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserAdded {
    #[serde(rename = "ID", deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}
