use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::response::ItemsResult;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Custom user field type rendered by the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserFieldTypeItem {
    pub user_type_id: String,
    pub handler: String,
    pub title: String,
    #[serde(default, deserialize_with = "convert::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct UserFieldType<'a> {
    core: &'a Core,
}

impl<'a> UserFieldType<'a> {
    pub fn new(core: &'a Core) -> Self {
        UserFieldType { core }
    }

    pub fn add(&self, item: &UserFieldTypeItem) -> Result<bool> {
        self.core.call_typed("userfieldtype.add", item)
    }

    pub fn list(&self) -> Result<ItemsResult<UserFieldTypeItem>> {
        self.core.call("userfieldtype.list", ())?.into_items()
    }

    pub fn update(&self, item: &UserFieldTypeItem) -> Result<bool> {
        self.core.call_typed("userfieldtype.update", item)
    }

    pub fn delete(&self, user_type_id: &str) -> Result<bool> {
        self.core
            .call_typed("userfieldtype.delete", json!({ "USER_TYPE_ID": user_type_id }))
    }
}
