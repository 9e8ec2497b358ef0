use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::response::{FieldsResult, Param};
use serde::Deserialize;
use serde_json::{json, Value};

/// Dictionary value: deal stage, lead status, source, industry ...
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    /// Dictionary code, e.g. `DEAL_STAGE`, `STATUS`, `SOURCE`
    pub entity_id: String,
    pub status_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name_init: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub sort: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub system: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub semantics: Option<String>,
    #[serde(default)]
    pub extra: Option<Value>,
}

pub struct Status<'a> {
    core: &'a Core,
}

impl<'a> Status<'a> {
    pub fn new(core: &'a Core) -> Self {
        Status { core }
    }

    /// Dictionary values matching a filter, e.g. `{"ENTITY_ID": "DEAL_STAGE"}`
    pub fn list(&self, order: Param, filter: Param) -> Result<Vec<StatusItem>> {
        self.core
            .call_typed("crm.status.list", json!({ "order": order, "filter": filter }))
    }

    pub fn get(&self, id: i64) -> Result<StatusItem> {
        self.core.call_typed("crm.status.get", json!({ "id": id }))
    }

    pub fn fields(&self) -> Result<FieldsResult> {
        self.core.call_typed("crm.status.fields", ())
    }
}
