use super::entity::CrmEntity;
use super::MultiField;
use crate::convert;
use crate::time::Time;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ContactItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub honorific: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub second_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub birthdate: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub type_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub source_description: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub post: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub opened: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub export: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub has_phone: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub has_email: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub company_id: Option<i64>,
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
    #[serde(default)]
    pub im: Vec<MultiField>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for ContactItem {
    const PREFIX: &'static str = "crm.contact";
}

impl ContactItem {
    /// Name parts joined with single spaces
    pub fn full_name(&self) -> String {
        [&self.name, &self.second_name, &self.last_name]
            .iter()
            .filter_map(|part| part.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
