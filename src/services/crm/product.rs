use super::entity::CrmEntity;
use crate::convert;
use crate::time::Time;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProductItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub currency_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub section_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub catalog_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub sort: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub vat_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub vat_included: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub measure: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub xml_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub created_by: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_create: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub timestamp_x: Option<Time>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for ProductItem {
    const PREFIX: &'static str = "crm.product";
}
