use crate::convert;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// OAuth2 access token with refresh capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Access token for API requests
    pub access_token: String,

    /// Refresh token for renewing expired access tokens
    #[serde(default)]
    pub refresh_token: String,

    /// Expiration moment as a unix timestamp
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires: Option<i64>,

    /// Lifetime in seconds as reported when the token was issued
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires_in: Option<i64>,
}

impl AccessToken {
    /// Create a new AccessToken
    pub fn new(access_token: String, refresh_token: String, expires: Option<i64>) -> Self {
        AccessToken {
            access_token,
            refresh_token,
            expires,
            expires_in: None,
        }
    }

    /// Check if we have a refresh token available
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Check whether the token is past its expiration moment.
    /// Tokens without a known expiration are treated as valid.
    pub fn is_expired(&self) -> bool {
        match self.expires {
            Some(expires) => now_unix() >= expires,
            None => false,
        }
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Reply of the OAuth server to a refresh_token grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewedAccessToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub server_endpoint: String,
    /// REST endpoint of the portal, e.g. `https://example.bitrix24.com/rest/`
    #[serde(default)]
    pub client_endpoint: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub user_id: Option<i64>,
    /// Application status on the portal (F, D, T, P, L, S)
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub application_token: Option<String>,
}

impl RenewedAccessToken {
    /// The access token part of the reply
    pub fn access_token(&self) -> AccessToken {
        AccessToken {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires: self.expires,
            expires_in: self.expires_in,
        }
    }

    /// Portal host (with port, if any) taken from `client_endpoint`
    pub fn portal_domain(&self) -> Option<String> {
        let url = url::Url::parse(&self.client_endpoint).ok()?;
        let host = url.host_str()?;
        Some(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}
