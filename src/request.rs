//! Frames the portal opens application and placement handlers with.
//!
//! The handler URL receives `DOMAIN`, `PROTOCOL`, `LANG` and `APP_SID` in
//! the query string and the authorization in a form-encoded POST body.

use crate::client::Config;
use crate::convert;
use crate::credentials::{ApplicationProfile, Credentials};
use crate::error::{Bitrix24Error, Result};
use crate::query;
use crate::token::AccessToken;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacementRequest {
    #[serde(rename = "AUTH_ID")]
    pub access_token: String,
    #[serde(rename = "REFRESH_ID", default, deserialize_with = "convert::opt_string")]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds
    #[serde(rename = "AUTH_EXPIRES", default, deserialize_with = "convert::opt_int")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub status: Option<String>,
    #[serde(rename = "DOMAIN")]
    pub domain: String,
    /// 1 for https, 0 for http
    #[serde(rename = "PROTOCOL", default, deserialize_with = "convert::opt_int")]
    pub protocol: Option<i64>,
    #[serde(rename = "LANG", default, deserialize_with = "convert::opt_string")]
    pub language: Option<String>,
    #[serde(rename = "APP_SID", default, deserialize_with = "convert::opt_string")]
    pub application_sid: Option<String>,
    /// Slot code; `DEFAULT` when the application is opened from its menu item
    #[serde(rename = "PLACEMENT", default = "default_placement")]
    pub placement: String,
    #[serde(rename = "PLACEMENT_OPTIONS", default, deserialize_with = "placement_options")]
    pub placement_options: Map<String, Value>,
}

fn default_placement() -> String {
    "DEFAULT".to_string()
}

// Options arrive JSON-encoded inside the form field
fn placement_options<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Map::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Map::new()),
        Value::String(s) => match serde_json::from_str::<Value>(&s).map_err(D::Error::custom)? {
            Value::Object(map) => Ok(map),
            Value::Array(items) if items.is_empty() => Ok(Map::new()),
            other => Err(D::Error::custom(format!("expected options object, got {}", other))),
        },
        Value::Object(map) => Ok(map),
        other => Err(D::Error::custom(format!("expected options object, got {}", other))),
    }
}

impl PlacementRequest {
    /// Decode the form body of a handler request
    pub fn from_form(body: &str) -> Result<Self> {
        Self::from_request("", body)
    }

    /// Decode a handler request from its query string and form body
    pub fn from_request(query_string: &str, body: &str) -> Result<Self> {
        let mut fields = match query::parse_query(query_string) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(form) = query::parse_query(body) {
            fields.extend(form);
        }

        if !fields.contains_key("AUTH_ID") {
            return Err(Bitrix24Error::InvalidArgument(
                "request carries no AUTH_ID".to_string(),
            ));
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    pub fn is_https(&self) -> bool {
        self.protocol != Some(0)
    }

    /// URL scheme the portal was opened with
    pub fn scheme(&self) -> &'static str {
        if self.is_https() {
            "https"
        } else {
            "http"
        }
    }

    /// `config` with its scheme switched to the one the portal uses
    pub fn apply_scheme(&self, config: Config) -> Config {
        config.with_scheme(self.scheme())
    }

    pub fn access_token(&self) -> AccessToken {
        AccessToken {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone().unwrap_or_default(),
            expires: self.expires_in.map(|seconds| Utc::now().timestamp() + seconds),
            expires_in: self.expires_in,
        }
    }

    /// OAuth credentials acting as the user who opened the frame.
    ///
    /// Credentials carry no scheme; pass the client config through
    /// [`PlacementRequest::apply_scheme`] for portals served over http.
    pub fn into_credentials(self, profile: ApplicationProfile) -> Credentials {
        let token = self.access_token();
        Credentials::oauth(self.domain, token, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Scope;

    const BODY: &str = "AUTH_ID=acc123&AUTH_EXPIRES=3600&REFRESH_ID=ref456&member_id=m1&status=L\
        &PLACEMENT=CRM_DEAL_DETAIL_TAB&PLACEMENT_OPTIONS=%7B%22ID%22%3A%2242%22%7D";

    #[test]
    fn test_from_request() {
        let request =
            PlacementRequest::from_request("DOMAIN=example.bitrix24.com&PROTOCOL=1&LANG=en&APP_SID=x1", BODY)
                .unwrap();

        assert_eq!(request.access_token, "acc123");
        assert_eq!(request.expires_in, Some(3600));
        assert_eq!(request.domain, "example.bitrix24.com");
        assert!(request.is_https());
        assert_eq!(request.placement, "CRM_DEAL_DETAIL_TAB");
        assert_eq!(request.placement_options["ID"], Value::from("42"));

        let token = request.access_token();
        assert!(!token.is_expired());
        assert!(token.has_refresh_token());
    }

    #[test]
    fn test_into_credentials() {
        let request = PlacementRequest::from_form(&format!("{}&DOMAIN=example.bitrix24.com", BODY)).unwrap();
        let profile = ApplicationProfile::new("app.1", "secret", Scope::default());

        let credentials = request.into_credentials(profile);
        assert_eq!(credentials.domain(), "example.bitrix24.com");
        assert_eq!(credentials.auth_param(), Some("acc123"));
    }

    #[test]
    fn test_plain_http_portal() {
        let request = PlacementRequest::from_request(
            "DOMAIN=portal.local&PROTOCOL=0",
            "AUTH_ID=acc123",
        )
        .unwrap();

        assert!(!request.is_https());
        let config = request.apply_scheme(Config::default());
        assert_eq!(config.scheme, "http");

        let credentials = request.into_credentials(ApplicationProfile::new("app.1", "secret", Scope::default()));
        assert_eq!(
            credentials.endpoint(&config, "profile").unwrap().as_str(),
            "http://portal.local/rest/profile.json"
        );
    }

    #[test]
    fn test_default_placement() {
        let request = PlacementRequest::from_form("AUTH_ID=a&DOMAIN=example.bitrix24.com").unwrap();
        assert_eq!(request.placement, "DEFAULT");
        assert!(request.placement_options.is_empty());
        assert!(PlacementRequest::from_form("DOMAIN=example.bitrix24.com").is_err());
    }
}
