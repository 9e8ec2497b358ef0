use super::entity::CrmEntity;
use super::MultiField;
use crate::convert;
use crate::time::Time;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CompanyItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub company_type: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub employees: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub currency_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub opened: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_my_company: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub lead_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub assigned_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub created_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub modify_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_create: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_modify: Option<Time>,
    #[serde(default)]
    pub phone: Vec<MultiField>,
    #[serde(default)]
    pub email: Vec<MultiField>,
    #[serde(default)]
    pub web: Vec<MultiField>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for CompanyItem {
    const PREFIX: &'static str = "crm.company";
}
