use super::entity::CrmEntity;
use super::MultiField;
use crate::convert;
use crate::time::Time;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LeadItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub status_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub status_semantic_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub currency_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub opportunity: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub company_title: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub post: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub opened: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_return_customer: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub contact_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub assigned_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_create: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_modify: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_closed: Option<Time>,
    #[serde(default)]
    pub phone: Vec<MultiField>,
    #[serde(default)]
    pub email: Vec<MultiField>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for LeadItem {
    const PREFIX: &'static str = "crm.lead";
}

impl LeadItem {
    /// Lead reached a final status: converted (S) or junk (F)
    pub fn is_closed(&self) -> bool {
        matches!(self.status_semantic_id.as_deref(), Some("S") | Some("F"))
    }
}
