use crate::convert;
use crate::core::Core;
use crate::error::Result;
use serde::Serialize;
use serde_json::json;

/// Notification addressed to a single user
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Notification {
    pub user_id: i64,
    pub message: String,
    /// Text for e-mail and push delivery when it differs from `message`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_out: Option<String>,
    /// Notifications sharing a tag replace each other
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(user_id: i64, message: impl Into<String>) -> Self {
        Notification {
            user_id,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ReadParams<'p> {
    id: i64,
    #[serde(serialize_with = "convert::yn_flag")]
    only_current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'p str>,
}

pub struct Notify<'a> {
    core: &'a Core,
}

impl<'a> Notify<'a> {
    pub fn new(core: &'a Core) -> Self {
        Notify { core }
    }

    /// Notification sent on behalf of the application; returns its id
    pub fn system(&self, notification: &Notification) -> Result<i64> {
        self.core.call_typed("im.notify.system.add", notification)
    }

    /// Notification sent on behalf of the current user; returns its id
    pub fn personal(&self, notification: &Notification) -> Result<i64> {
        self.core.call_typed("im.notify.personal.add", notification)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        self.core.call_typed("im.notify.delete", json!({ "ID": id }))
    }

    pub fn delete_by_tag(&self, tag: &str) -> Result<bool> {
        self.core.call_typed("im.notify.delete", json!({ "TAG": tag }))
    }

    /// Mark a notification read; unless `only_current` is set,
    /// every earlier notification is marked as well
    pub fn mark_as_read(&self, id: i64, only_current: bool) -> Result<bool> {
        self.core.call_typed(
            "im.notify.read",
            ReadParams {
                id,
                only_current,
                action: None,
            },
        )
    }

    pub fn mark_as_unread(&self, id: i64) -> Result<bool> {
        self.core.call_typed(
            "im.notify.read",
            ReadParams {
                id,
                only_current: true,
                action: Some("N"),
            },
        )
    }

    pub fn mark_messages_as_read(&self, ids: &[i64]) -> Result<bool> {
        self.core.call_typed(
            "im.notify.read.list",
            json!({ "IDS": ids, "ACTION": "Y" }),
        )
    }
}
