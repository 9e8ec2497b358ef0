use crate::convert;
use crate::core::Core;
use crate::error::Result;
use crate::time::Time;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// Application status on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "F")]
    Free,
    #[serde(rename = "D")]
    Demo,
    #[serde(rename = "T")]
    Trial,
    #[serde(rename = "P")]
    Paid,
    #[serde(rename = "L")]
    Local,
    #[serde(rename = "S")]
    Subscription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApplicationInfo {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    pub code: String,
    #[serde(deserialize_with = "convert::int")]
    pub version: i64,
    pub status: ApplicationStatus,
    #[serde(deserialize_with = "convert::yes_no")]
    pub installed: bool,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub payment_expired: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub days: Option<i64>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub license_family: Option<String>,
}

/// Profile of the user the call is made on behalf of
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserProfile {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(deserialize_with = "convert::yes_no")]
    pub admin: bool,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub personal_gender: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub personal_photo: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub time_zone_offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodAffordability {
    pub is_existing: bool,
    pub is_available: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AccessName {
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
}

/// Portal-level methods: application info, scopes, server time, access checks
pub struct Main<'a> {
    core: &'a Core,
}

impl<'a> Main<'a> {
    pub fn new(core: &'a Core) -> Self {
        Main { core }
    }

    pub fn app_info(&self) -> Result<ApplicationInfo> {
        self.core.call_typed("app.info", ())
    }

    pub fn current_user_profile(&self) -> Result<UserProfile> {
        self.core.call_typed("profile", ())
    }

    /// Scopes granted to the application, or every scope the portal knows when `full` is set
    pub fn scope(&self, full: bool) -> Result<Vec<String>> {
        if full {
            self.core.call_typed("scope", json!({ "full": true }))
        } else {
            self.core.call_typed("scope", ())
        }
    }

    pub fn available_methods(&self, scope: Option<&str>) -> Result<Vec<String>> {
        match scope {
            Some(scope) => self.core.call_typed("methods", json!({ "scope": scope })),
            None => self.core.call_typed("methods", ()),
        }
    }

    /// Whether a method exists and can be called with the current credentials
    pub fn method_affordability(&self, name: &str) -> Result<MethodAffordability> {
        self.core.call_typed("method.get", json!({ "name": name }))
    }

    pub fn server_time(&self) -> Result<Time> {
        self.core.call_typed("server.time", ())
    }

    pub fn is_current_user_admin(&self) -> Result<bool> {
        let admin: serde_json::Value = self.core.call_typed("user.admin", ())?;
        Ok(matches!(admin, serde_json::Value::Bool(true)))
    }

    /// Check whether the current user holds any of the given access codes, e.g. `G2`, `AU`
    pub fn is_user_has_access(&self, access_codes: &[&str]) -> Result<bool> {
        self.core.call_typed("user.access", json!({ "ACCESS": access_codes }))
    }

    pub fn access_name(&self, access_codes: &[&str]) -> Result<HashMap<String, AccessName>> {
        let response = self
            .core
            .call("access.name", json!({ "ACCESS": access_codes }))?;
        Ok(convert::php_map(response.result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_info() {
        let info: ApplicationInfo = serde_json::from_value(json!({
            "ID": "5",
            "CODE": "local.5f1b2c",
            "VERSION": 1,
            "STATUS": "L",
            "INSTALLED": true,
            "PAYMENT_EXPIRED": "N",
            "DAYS": null,
            "LICENSE": "en_project",
            "LICENSE_TYPE": "project",
            "LICENSE_FAMILY": "project"
        }))
        .unwrap();

        assert_eq!(info.id, 5);
        assert_eq!(info.status, ApplicationStatus::Local);
        assert!(info.installed);
        assert_eq!(info.payment_expired, Some(false));
        assert_eq!(info.days, None);
    }

    #[test]
    fn test_user_profile() {
        let profile: UserProfile = serde_json::from_value(json!({
            "ID": "1",
            "ADMIN": true,
            "NAME": "Anna",
            "LAST_NAME": "Smith",
            "PERSONAL_GENDER": "",
            "TIME_ZONE": "",
            "TIME_ZONE_OFFSET": 10800
        }))
        .unwrap();

        assert_eq!(profile.id, 1);
        assert!(profile.admin);
        assert_eq!(profile.personal_gender, None);
        assert_eq!(profile.time_zone_offset, Some(10800));
    }
}
