use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::response::{ItemsResult, Param};
use crate::time::Time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Portal user as returned by `user.get` and `user.current`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub xml_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub second_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub last_login: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_register: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_online: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub time_zone_offset: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub personal_gender: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub personal_mobile: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub personal_photo: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub work_phone: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub work_position: Option<String>,
    #[serde(default, deserialize_with = "convert::int_list")]
    pub uf_department: Vec<i64>,
    /// `employee`, `extranet` or `email`
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub user_type: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Parameters of `user.get`
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(rename = "FILTER", skip_serializing_if = "Param::is_empty")]
    pub filter: Param,
    /// Include extranet and bot accounts
    #[serde(rename = "ADMIN_MODE", skip_serializing_if = "std::ops::Not::not")]
    pub admin_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: &str, order: &str) -> Self {
        self.sort = Some(field.to_string());
        self.order = Some(order.to_string());
        self
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter.insert(field.to_string(), value.into());
        self
    }

    pub fn admin_mode(mut self, admin_mode: bool) -> Self {
        self.admin_mode = admin_mode;
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }
}

pub struct User<'a> {
    core: &'a Core,
}

impl<'a> User<'a> {
    pub fn new(core: &'a Core) -> Self {
        User { core }
    }

    /// Invite a user; `fields` must hold at least `EMAIL`.
    /// Returns the new user id.
    pub fn add(&self, fields: Param, message_text: Option<&str>) -> Result<i64> {
        let mut params = fields;
        if let Some(text) = message_text {
            params.insert("MESSAGE_TEXT".to_string(), json!(text));
        }
        self.core.call_typed("user.add", params)
    }

    pub fn get(&self, query: &UserQuery) -> Result<ItemsResult<UserItem>> {
        self.core.call("user.get", query)?.into_items()
    }

    pub fn current(&self) -> Result<UserItem> {
        self.core.call_typed("user.current", ())
    }

    pub fn update(&self, id: i64, fields: Param) -> Result<bool> {
        let mut params = fields;
        params.insert("ID".to_string(), json!(id));
        self.core.call_typed("user.update", params)
    }

    /// Field codes mapped to their titles
    pub fn fields(&self) -> Result<HashMap<String, String>> {
        self.core.call_typed("user.fields", ())
    }

    /// Search by name, position or department; `FIND` does a quick full-text match
    pub fn search(&self, filter: Param) -> Result<ItemsResult<UserItem>> {
        self.core.call("user.search", json!({ "FILTER": filter }))?.into_items()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_item() {
        let user: UserItem = serde_json::from_value(json!({
            "ID": "1",
            "ACTIVE": true,
            "NAME": "Ivan",
            "LAST_NAME": "",
            "IS_ONLINE": "N",
            "LAST_LOGIN": "2024-03-01T10:00:00+03:00",
            "UF_DEPARTMENT": [1, "5"],
            "UF_SKYPE": "ivan.work"
        }))
        .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.active, Some(true));
        assert_eq!(user.last_name, None);
        assert_eq!(user.is_online, Some(false));
        assert_eq!(user.uf_department, vec![1, 5]);
        assert_eq!(user.extra["UF_SKYPE"], json!("ivan.work"));
    }

    #[test]
    fn test_user_query_params() {
        let query = UserQuery::new()
            .sort("ID", "ASC")
            .filter("ACTIVE", true)
            .start(50);

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"sort": "ID", "order": "ASC", "FILTER": {"ACTIVE": true}, "start": 50})
        );
    }
}
