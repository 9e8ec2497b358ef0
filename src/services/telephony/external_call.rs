use super::{CallFailedCode, CallType, CrmEntityType};
use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::time::Time;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;

/// Parameters of `telephony.externalcall.register`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RegisterCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone_inner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub phone_number: String,
    pub call_start_date: Time,
    #[serde(rename = "TYPE")]
    pub call_type: CallType,
    /// Create a lead when the number is unknown to the CRM
    #[serde(serialize_with = "convert::int_flag")]
    pub crm_create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_entity_type: Option<CrmEntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm_entity_id: Option<i64>,
    /// Pop up the call card for the user
    #[serde(serialize_with = "convert::int_flag")]
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_list_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<String>,
}

impl RegisterCall {
    pub fn new(user_id: i64, phone_number: impl Into<String>, call_start_date: Time, call_type: CallType) -> Self {
        RegisterCall {
            user_phone_inner: None,
            user_id: Some(user_id),
            phone_number: phone_number.into(),
            call_start_date,
            call_type,
            crm_create: true,
            crm_source: None,
            crm_entity_type: None,
            crm_entity_id: None,
            show: true,
            call_list_id: None,
            line_number: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CallRegistered {
    pub call_id: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub crm_created_lead: Option<i64>,
    #[serde(default)]
    pub crm_created_entities: Vec<Value>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub crm_entity_type: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub crm_entity_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub lead_creation_error: Option<String>,
}

/// Parameters of `telephony.externalcall.finish`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FinishCall {
    pub call_id: String,
    pub user_id: i64,
    /// Seconds
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<CallFailedCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_url: Option<String>,
    /// Caller rating, 1 to 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<u8>,
    #[serde(serialize_with = "convert::int_flag")]
    pub add_to_chat: bool,
}

impl FinishCall {
    pub fn new(call_id: impl Into<String>, user_id: i64, duration: u64) -> Self {
        FinishCall {
            call_id: call_id.into(),
            user_id,
            duration,
            cost: None,
            cost_currency: None,
            status_code: None,
            failed_reason: None,
            record_url: None,
            vote: None,
            add_to_chat: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CallFinished {
    pub call_id: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "super::opt_call_type")]
    pub call_type: Option<CallType>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub call_duration: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub call_start_date: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub call_failed_code: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub call_failed_reason: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub cost_currency: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub crm_activity_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub portal_user_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub portal_number: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub call_vote: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RecordAttached {
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub file_id: Option<i64>,
}

/// CRM item matched by phone number
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CrmEntityMatch {
    pub crm_entity_type: CrmEntityType,
    #[serde(deserialize_with = "convert::int")]
    pub crm_entity_id: i64,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub assigned_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub assigned_by: Option<Value>,
}

pub struct ExternalCall<'a> {
    core: &'a Core,
}

impl<'a> ExternalCall<'a> {
    pub fn new(core: &'a Core) -> Self {
        ExternalCall { core }
    }

    pub fn register(&self, call: &RegisterCall) -> Result<CallRegistered> {
        self.core.call_typed("telephony.externalcall.register", call)
    }

    pub fn finish(&self, call: &FinishCall) -> Result<CallFinished> {
        self.core.call_typed("telephony.externalcall.finish", call)
    }

    /// Show the call card to the given users
    pub fn show(&self, call_id: &str, user_ids: &[i64]) -> Result<bool> {
        self.core.call_typed(
            "telephony.externalcall.show",
            json!({ "CALL_ID": call_id, "USER_ID": user_ids }),
        )
    }

    pub fn hide(&self, call_id: &str, user_ids: &[i64]) -> Result<bool> {
        self.core.call_typed(
            "telephony.externalcall.hide",
            json!({ "CALL_ID": call_id, "USER_ID": user_ids }),
        )
    }

    /// Attach a recording the portal downloads from `record_url`
    pub fn attach_record_by_url(&self, call_id: &str, filename: &str, record_url: &str) -> Result<RecordAttached> {
        self.core.call_typed(
            "telephony.externalcall.attachRecord",
            json!({ "CALL_ID": call_id, "FILENAME": filename, "RECORD_URL": record_url }),
        )
    }

    /// Upload a recording inline
    pub fn attach_record(&self, call_id: &str, filename: &str, content: &[u8]) -> Result<RecordAttached> {
        self.core.call_typed(
            "telephony.externalcall.attachRecord",
            json!({
                "CALL_ID": call_id,
                "FILENAME": filename,
                "FILE_CONTENT": STANDARD.encode(content),
            }),
        )
    }

    pub fn attach_record_from_path(&self, call_id: &str, path: &Path) -> Result<RecordAttached> {
        let content = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "record.mp3".to_string());
        self.attach_record(call_id, &filename, &content)
    }

    pub fn search_crm_entities(&self, phone_number: &str) -> Result<Vec<CrmEntityMatch>> {
        self.core.call_typed(
            "telephony.externalCall.searchCrmEntities",
            json!({ "PHONE_NUMBER": phone_number }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_call_params() {
        let start = Time::parse("2024-03-01T10:00:00+03:00").unwrap();
        let mut call = RegisterCall::new(7, "+15550001", start, CallType::Inbound);
        call.crm_create = false;
        call.crm_entity_type = Some(CrmEntityType::Contact);
        call.crm_entity_id = Some(12);

        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({
                "USER_ID": 7,
                "PHONE_NUMBER": "+15550001",
                "CALL_START_DATE": "2024-03-01T10:00:00+03:00",
                "TYPE": 2,
                "CRM_CREATE": 0,
                "CRM_ENTITY_TYPE": "CONTACT",
                "CRM_ENTITY_ID": 12,
                "SHOW": 1
            })
        );
    }

    #[test]
    fn test_call_finished() {
        let finished: CallFinished = serde_json::from_value(json!({
            "CALL_ID": "externalCall.abc",
            "ID": "31",
            "CALL_TYPE": "2",
            "CALL_DURATION": "65",
            "CALL_FAILED_CODE": "200",
            "COST": "",
            "CRM_ACTIVITY_ID": 88,
            "PHONE_NUMBER": "+15550001"
        }))
        .unwrap();

        assert_eq!(finished.id, Some(31));
        assert_eq!(finished.call_type, Some(CallType::Inbound));
        assert_eq!(finished.call_duration, Some(65));
        assert_eq!(finished.cost, None);
        assert_eq!(finished.crm_activity_id, Some(88));
    }

    #[test]
    fn test_call_finished_with_empty_type() {
        let finished: CallFinished = serde_json::from_value(json!({
            "CALL_ID": "externalCall.abc",
            "CALL_TYPE": "",
            "CALL_FAILED_CODE": "304"
        }))
        .unwrap();

        assert_eq!(finished.call_type, None);
        assert_eq!(finished.call_failed_code.as_deref(), Some("304"));
    }

    #[test]
    fn test_finish_call_params() {
        let mut finish = FinishCall::new("externalCall.abc", 7, 65);
        finish.status_code = Some(CallFailedCode::Busy);

        let value = serde_json::to_value(&finish).unwrap();
        assert_eq!(value["STATUS_CODE"], json!("486"));
        assert_eq!(value["ADD_TO_CHAT"], json!(1));
        assert!(value.get("COST").is_none());
    }
}
