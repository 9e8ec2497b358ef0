//! Telephony integration: registering external PBX calls in the portal
//! and managing the external line numbers they come in on.

pub mod external_call;
pub mod external_line;

pub use external_call::{
    CallFinished, CallRegistered, CrmEntityMatch, ExternalCall, FinishCall, RecordAttached,
    RegisterCall,
};
pub use external_line::{ExternalLine, ExternalLineItem};

use crate::convert;
use crate::core::Core;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, IntoStaticStr};

/// Direction of a registered call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallType {
    #[default]
    Outbound,
    Inbound,
    InboundWithRedirect,
    Callback,
}

impl CallType {
    pub fn code(self) -> u8 {
        match self {
            CallType::Outbound => 1,
            CallType::Inbound => 2,
            CallType::InboundWithRedirect => 3,
            CallType::Callback => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CallType::Outbound),
            2 => Some(CallType::Inbound),
            3 => Some(CallType::InboundWithRedirect),
            4 => Some(CallType::Callback),
            _ => None,
        }
    }
}

impl Serialize for CallType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for CallType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = convert::int(deserializer)?;
        CallType::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown call type {}", code)))
    }
}

/// Call type that may be missing or sent as an empty string
pub(crate) fn opt_call_type<'de, D>(deserializer: D) -> Result<Option<CallType>, D::Error>
where
    D: Deserializer<'de>,
{
    match convert::opt_int(deserializer)? {
        None => Ok(None),
        Some(code) => CallType::from_code(code)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown call type {}", code))),
    }
}

/// CRM item a call is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CrmEntityType {
    Contact,
    Company,
    Lead,
}

/// SIP-style outcome of a finished call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
pub enum CallFailedCode {
    #[serde(rename = "200")]
    #[strum(serialize = "200")]
    Success,
    #[serde(rename = "304")]
    #[strum(serialize = "304")]
    Missed,
    #[serde(rename = "403")]
    #[strum(serialize = "403")]
    Forbidden,
    #[serde(rename = "404")]
    #[strum(serialize = "404")]
    InvalidNumber,
    #[serde(rename = "486")]
    #[strum(serialize = "486")]
    Busy,
    #[serde(rename = "484")]
    #[strum(serialize = "484")]
    Unavailable,
    #[serde(rename = "503")]
    #[strum(serialize = "503")]
    ServiceUnavailable,
    #[serde(rename = "480")]
    #[strum(serialize = "480")]
    TemporarilyUnavailable,
    #[serde(rename = "402")]
    #[strum(serialize = "402")]
    InsufficientFunds,
    #[serde(rename = "423")]
    #[strum(serialize = "423")]
    Blocked,
}

impl CallFailedCode {
    pub fn code(self) -> &'static str {
        self.into()
    }
}

pub struct Telephony<'a> {
    core: &'a Core,
}

impl<'a> Telephony<'a> {
    pub fn new(core: &'a Core) -> Self {
        Telephony { core }
    }

    pub fn external_call(&self) -> ExternalCall<'a> {
        ExternalCall::new(self.core)
    }

    pub fn external_line(&self) -> ExternalLine<'a> {
        ExternalLine::new(self.core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_type_codes() {
        assert_eq!(serde_json::to_value(CallType::Inbound).unwrap(), json!(2));
        assert_eq!(serde_json::from_value::<CallType>(json!("4")).unwrap(), CallType::Callback);
        assert!(serde_json::from_value::<CallType>(json!(9)).is_err());
        assert_eq!(CallType::default(), CallType::Outbound);
    }

    #[test]
    fn test_failed_code_strings() {
        assert_eq!(serde_json::to_value(CallFailedCode::Busy).unwrap(), json!("486"));
        assert_eq!(
            serde_json::from_value::<CallFailedCode>(json!("304")).unwrap(),
            CallFailedCode::Missed
        );
        assert_eq!(CrmEntityType::Lead.to_string(), "LEAD");
        assert_eq!(CrmEntityType::Company.as_ref(), "COMPANY");
        assert_eq!(CallFailedCode::Unavailable.code(), "484");
        assert_eq!(CallFailedCode::InsufficientFunds.to_string(), "402");
    }

    #[test]
    fn test_optional_call_type() {
        #[derive(Deserialize)]
        struct Reply {
            #[serde(default, deserialize_with = "opt_call_type")]
            call_type: Option<CallType>,
        }

        let parse = |v| serde_json::from_value::<Reply>(v).map(|r| r.call_type);
        assert_eq!(parse(json!({"call_type": ""})).unwrap(), None);
        assert_eq!(parse(json!({})).unwrap(), None);
        assert_eq!(parse(json!({"call_type": "3"})).unwrap(), Some(CallType::InboundWithRedirect));
        assert!(parse(json!({"call_type": 7})).is_err());
    }
}
