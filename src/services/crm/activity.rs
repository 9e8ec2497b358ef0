use super::entity::CrmEntity;
use crate::convert;
use crate::time::Time;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Call, meeting, e-mail or task attached to a CRM item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ActivityItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub owner_id: Option<i64>,
    /// 1 lead, 2 deal, 3 contact, 4 company
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub owner_type_id: Option<i64>,
    /// 1 meeting, 2 call, 3 task, 4 e-mail, 6 provider-defined
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub type_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub provider_type_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub start_time: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub end_time: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub deadline: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub responsible_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub priority: Option<i64>,
    /// 1 incoming, 2 outgoing
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub direction: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub author_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub editor_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub created: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub last_updated: Option<Time>,
    #[serde(default)]
    pub communications: Vec<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for ActivityItem {
    const PREFIX: &'static str = "crm.activity";
}
