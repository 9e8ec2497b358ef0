//! Embedding application handlers into portal interface slots
//! and registering custom user field types.

pub mod user_field_type;

pub use user_field_type::{UserFieldType, UserFieldTypeItem};

use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::response::Param;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Parameters of `placement.bind`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PlacementBinding {
    /// Slot code, e.g. `CRM_DEAL_DETAIL_TAB`
    pub placement: String,
    pub handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Titles per language code
    #[serde(rename = "LANG_ALL", skip_serializing_if = "HashMap::is_empty")]
    pub lang_all: HashMap<String, Value>,
}

impl PlacementBinding {
    pub fn new(placement: impl Into<String>, handler: impl Into<String>) -> Self {
        PlacementBinding {
            placement: placement.into(),
            handler: handler.into(),
            title: None,
            description: None,
            options: None,
            lang_all: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// Handler bound by the current application
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementLocation {
    pub placement: String,
    pub handler: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(rename = "langAll", default, deserialize_with = "convert::php_map")]
    pub lang_all: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct UnbindResult {
    #[serde(default, deserialize_with = "convert::opt_int")]
    count: Option<i64>,
}

pub struct Placement<'a> {
    core: &'a Core,
}

impl<'a> Placement<'a> {
    pub fn new(core: &'a Core) -> Self {
        Placement { core }
    }

    pub fn user_field_type(&self) -> UserFieldType<'a> {
        UserFieldType::new(self.core)
    }

    pub fn bind(&self, binding: &PlacementBinding) -> Result<bool> {
        self.core.call_typed("placement.bind", binding)
    }

    /// Remove handlers from a slot, all of them when `handler` is `None`.
    /// Returns how many were removed.
    pub fn unbind(&self, placement: &str, handler: Option<&str>) -> Result<i64> {
        let mut params = Param::new();
        params.insert("PLACEMENT".to_string(), json!(placement));
        if let Some(handler) = handler {
            params.insert("HANDLER".to_string(), json!(handler));
        }
        let result: UnbindResult = self.core.call_typed("placement.unbind", params)?;
        Ok(result.count.unwrap_or_default())
    }

    /// Slot codes available to the application, optionally for one scope
    pub fn list(&self, scope: Option<&str>) -> Result<Vec<String>> {
        match scope {
            Some(scope) => self.core.call_typed("placement.list", json!({ "SCOPE": scope })),
            None => self.core.call_typed("placement.list", ()),
        }
    }

    pub fn get(&self) -> Result<Vec<PlacementLocation>> {
        self.core.call_typed("placement.get", ())
    }
}
