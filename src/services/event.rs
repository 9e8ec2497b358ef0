use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::response::Param;
use serde::Deserialize;
use serde_json::{json, Value};

/// Handler registered for a portal event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventHandler {
    pub event: String,
    #[serde(default)]
    pub handler: String,
    /// User the handler is authorized as, 0 for the installing user
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub auth_type: Option<i64>,
    /// Set for offline handlers
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub offline: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UnbindResult {
    #[serde(default, deserialize_with = "convert::opt_int")]
    count: Option<i64>,
}

/// Subscription management for outbound event notifications
pub struct Events<'a> {
    core: &'a Core,
}

impl<'a> Events<'a> {
    pub fn new(core: &'a Core) -> Self {
        Events { core }
    }

    /// Subscribe `handler` to `event`, e.g. `ONCRMDEALDELETE`.
    /// `auth_type` selects the user the handler acts as.
    pub fn bind(&self, event: &str, handler: &str, auth_type: Option<i64>, options: Option<Value>) -> Result<bool> {
        let mut params = Param::new();
        params.insert("event".to_string(), json!(event));
        params.insert("handler".to_string(), json!(handler));
        if let Some(user_id) = auth_type {
            params.insert("auth_type".to_string(), json!(user_id));
        }
        if let Some(options) = options {
            params.insert("options".to_string(), options);
        }
        self.core.call_typed("event.bind", params)
    }

    /// Subscribe an offline handler; events are then fetched with `event.offline.get`
    pub fn bind_offline(&self, event: &str) -> Result<bool> {
        self.core
            .call_typed("event.bind", json!({ "event": event, "event_type": "offline" }))
    }

    /// Remove a subscription and return how many handlers were removed
    pub fn unbind(&self, event: &str, handler: &str) -> Result<i64> {
        let result: UnbindResult = self
            .core
            .call_typed("event.unbind", json!({ "event": event, "handler": handler }))?;
        Ok(result.count.unwrap_or_default())
    }

    pub fn get(&self) -> Result<Vec<EventHandler>> {
        self.core.call_typed("event.get", ())
    }

    /// Ask the portal to send the `ONAPPTEST` event to the bound handler
    pub fn test(&self, payload: Value) -> Result<bool> {
        self.core.call_typed("event.test", payload)
    }
}
