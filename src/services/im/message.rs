use crate::core::Core;
use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// Message to a chat (`chat<id>`) or a private dialog (user id)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewMessage {
    pub dialog_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Value>,
    #[serde(rename = "URL_PREVIEW", skip_serializing_if = "Option::is_none")]
    pub url_preview: Option<&'static str>,
}

impl NewMessage {
    pub fn to_user(user_id: i64, message: impl Into<String>) -> Self {
        Self::to_dialog(user_id.to_string(), message)
    }

    pub fn to_chat(chat_id: i64, message: impl Into<String>) -> Self {
        Self::to_dialog(format!("chat{}", chat_id), message)
    }

    pub fn to_dialog(dialog_id: impl Into<String>, message: impl Into<String>) -> Self {
        NewMessage {
            dialog_id: dialog_id.into(),
            message: message.into(),
            system: None,
            attach: None,
            keyboard: None,
            url_preview: None,
        }
    }

    /// Show as a system message without an author
    pub fn as_system(mut self) -> Self {
        self.system = Some("Y");
        self
    }

    pub fn without_url_preview(mut self) -> Self {
        self.url_preview = Some("N");
        self
    }
}

pub struct Messages<'a> {
    core: &'a Core,
}

impl<'a> Messages<'a> {
    pub fn new(core: &'a Core) -> Self {
        Messages { core }
    }

    /// Send a message and return its id
    pub fn add(&self, message: &NewMessage) -> Result<i64> {
        self.core.call_typed("im.message.add", message)
    }

    pub fn update(&self, message_id: i64, text: &str) -> Result<bool> {
        self.core.call_typed(
            "im.message.update",
            json!({ "MESSAGE_ID": message_id, "MESSAGE": text }),
        )
    }

    pub fn delete(&self, message_id: i64) -> Result<bool> {
        self.core
            .call_typed("im.message.delete", json!({ "MESSAGE_ID": message_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_dialog_id() {
        let message = NewMessage::to_chat(17, "hello").as_system();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["DIALOG_ID"], json!("chat17"));
        assert_eq!(value["SYSTEM"], json!("Y"));
        assert!(value.get("ATTACH").is_none());
    }
}
