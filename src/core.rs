use crate::client::{create_rest_client, Config};
use crate::credentials::Credentials;
use crate::error::{Bitrix24Error, Result};
use crate::response::{ErrorEnvelope, ItemsResult, Param, Response};
use crate::token::RenewedAccessToken;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Callback invoked after the access token has been renewed
pub type TokenRenewedFn = Arc<dyn Fn(&RenewedAccessToken) + Send + Sync>;

/// Transport core shared by all services.
///
/// Owns the HTTP client and the credentials. Calls made with OAuth
/// credentials renew an expired access token once and retry.
pub struct Core {
    client: Client,
    config: Config,
    credentials: RwLock<Credentials>,
    /// Serializes token renewal between threads
    renewal: Mutex<()>,
    listeners: RwLock<Vec<TokenRenewedFn>>,
}

/// Endpoint and auth value captured for a single attempt
struct Target {
    url: Url,
    auth: Option<String>,
}

impl Core {
    /// Create a new core with the given credentials and configuration
    pub fn new(credentials: Credentials, config: Config) -> Result<Self> {
        Ok(Core {
            client: create_rest_client(&config)?,
            config,
            credentials: RwLock::new(credentials),
            renewal: Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current credentials
    pub fn credentials(&self) -> Credentials {
        self.read_credentials().clone()
    }

    /// Portal host the calls go to
    pub fn domain(&self) -> String {
        self.read_credentials().domain().to_string()
    }

    /// Register a callback for renewed tokens, e.g. to persist them.
    ///
    /// Listeners run on the thread that renewed the token, after the new
    /// token is stored. They may register further listeners.
    pub fn on_token_renewed<F>(&self, listener: F)
    where
        F: Fn(&RenewedAccessToken) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Call a REST method and unmarshal its result into the target type
    pub fn call_typed<T, P>(&self, method: &str, params: P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.call(method, params)?.into_result()
    }

    /// Call a REST method and return the raw Response.
    ///
    /// # Arguments
    /// * `method` - REST method name, e.g. `crm.deal.get`
    /// * `params` - a serializable map of parameters, or `()` for none
    pub fn call<P>(&self, method: &str, params: P) -> Result<Response>
    where
        P: Serialize,
    {
        let params = to_param(params)?;
        let target = self.target(method)?;

        match self.execute(method, &params, &target) {
            Err(Bitrix24Error::ExpiredToken) if target.auth.is_some() => {
                info!(method, "access token expired, renewing");
                self.renew_if_stale(target.auth.as_deref().unwrap_or_default())?;

                let retry = self.target(method)?;
                self.execute(method, &params, &retry).map_err(|e| {
                    if matches!(e, Bitrix24Error::ExpiredToken) {
                        warn!(method, "access token still expired after renewal");
                    }
                    e
                })
            }
            other => other,
        }
    }

    /// Fetch every page of a list method by following `next` offsets.
    ///
    /// Starts at the `start` offset in `params`, or 0 when absent.
    pub fn list_all<T, P>(&self, method: &str, params: P) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let mut params = to_param(params)?;
        let mut items = Vec::new();
        let mut start = params.get("start").and_then(Value::as_u64).unwrap_or(0);

        loop {
            params.insert("start".to_string(), Value::from(start));
            let page: ItemsResult<T> = self.call(method, &params)?.into_items()?;
            items.extend(page.items);

            match page.next {
                Some(next) if next > start => start = next,
                _ => break,
            }
        }

        debug!(method, count = items.len(), "list fetched");
        Ok(items)
    }

    /// Renew the access token unconditionally
    pub fn renew_access_token(&self) -> Result<RenewedAccessToken> {
        let _guard = self.renewal.lock().unwrap_or_else(PoisonError::into_inner);
        self.renew_locked()
    }

    fn target(&self, method: &str) -> Result<Target> {
        let credentials = self.read_credentials();
        Ok(Target {
            url: credentials.endpoint(&self.config, method)?,
            auth: credentials.auth_param().map(str::to_string),
        })
    }

    fn execute(&self, method: &str, params: &Param, target: &Target) -> Result<Response> {
        let mut body = params.clone();
        if let Some(ref auth) = target.auth {
            body.insert("auth".to_string(), Value::String(auth.clone()));
        }

        trace!(method, host = target.url.host_str().unwrap_or_default(), "calling");

        let start = Instant::now();
        let http_response = self
            .client
            .post(target.url.clone())
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()?;
        let status = http_response.status().as_u16();
        let bytes = http_response.bytes()?;

        debug!(
            method,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "call finished"
        );

        parse_reply(method, status, &bytes)
    }

    /// Renew unless another caller already replaced the stale token
    fn renew_if_stale(&self, stale: &str) -> Result<()> {
        let _guard = self.renewal.lock().unwrap_or_else(PoisonError::into_inner);

        match self.read_credentials().access_token() {
            Some(token) if token.access_token != stale => {
                debug!("access token already renewed by another caller");
                return Ok(());
            }
            Some(_) => {}
            None => return Err(Bitrix24Error::ExpiredToken),
        }

        self.renew_locked().map(|_| ())
    }

    fn renew_locked(&self) -> Result<RenewedAccessToken> {
        let (token, profile) = match &*self.read_credentials() {
            Credentials::OAuth { token, profile, .. } => (token.clone(), profile.clone()),
            Credentials::Webhook(_) => {
                return Err(Bitrix24Error::InvalidArgument(
                    "webhook credentials have no renewable token".to_string(),
                ))
            }
        };

        if !token.has_refresh_token() {
            return Err(Bitrix24Error::NoRefreshToken);
        }
        if !profile.has_client_secret() {
            return Err(Bitrix24Error::NoClientSecret);
        }

        let mut url = Url::parse(&self.config.token_url())?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &profile.client_id)
            .append_pair("client_secret", profile.client_secret.expose_secret())
            .append_pair("refresh_token", &token.refresh_token);

        let http_response = self.client.get(url).header(ACCEPT, "application/json").send()?;
        let status = http_response.status().as_u16();
        let bytes = http_response.bytes()?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|_| Bitrix24Error::Http {
            status,
            body: String::from_utf8_lossy(&bytes).to_string(),
        })?;

        if let Some(code) = value.get("error").and_then(Value::as_str) {
            return Err(Bitrix24Error::TokenRenewal {
                code: code.to_string(),
                description: value
                    .get("error_description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        if status >= 400 {
            return Err(Bitrix24Error::Http {
                status,
                body: String::from_utf8_lossy(&bytes).to_string(),
            });
        }

        let renewed: RenewedAccessToken = serde_json::from_value(value)?;
        self.write_credentials().apply_renewed(&renewed);

        info!(
            member_id = %renewed.member_id,
            expires = renewed.expires.unwrap_or_default(),
            "access token renewed"
        );

        let listeners: Vec<TokenRenewedFn> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&renewed);
        }

        Ok(renewed)
    }

    fn read_credentials(&self) -> RwLockReadGuard<'_, Credentials> {
        self.credentials.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_credentials(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.credentials.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialize call parameters, which must form a JSON object
pub(crate) fn to_param<P: Serialize>(params: P) -> Result<Param> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Param::new()),
        other => Err(Bitrix24Error::InvalidArgument(format!(
            "parameters must be a JSON object, got {}",
            other
        ))),
    }
}

/// Turn an HTTP reply into a Response or the matching error
pub(crate) fn parse_reply(method: &str, status: u16, body: &[u8]) -> Result<Response> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if status >= 400 => {
            return Err(Bitrix24Error::Http {
                status,
                body: String::from_utf8_lossy(body).to_string(),
            });
        }
        Err(e) => return Err(Bitrix24Error::Json(e)),
    };

    if value.get("error").map_or(false, Value::is_string) {
        let envelope: ErrorEnvelope = serde_json::from_value(value)?;
        let error = Bitrix24Error::from_api(status, method, envelope);
        if error.is_query_limit_exceeded() {
            warn!(method, "query limit exceeded");
        }
        return Err(error);
    }

    if status >= 400 {
        return Err(Bitrix24Error::Http {
            status,
            body: String::from_utf8_lossy(body).to_string(),
        });
    }

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success() {
        let response = parse_reply("crm.deal.add", 200, br#"{"result": 12}"#).unwrap();
        assert_eq!(response.result, json!(12));
    }

    #[test]
    fn test_parse_error_envelope() {
        let error = parse_reply(
            "crm.deal.get",
            401,
            br#"{"error": "expired_token", "error_description": "The access token provided has expired."}"#,
        )
        .unwrap_err();
        assert!(matches!(error, Bitrix24Error::ExpiredToken));
    }

    #[test]
    fn test_parse_non_json_failure() {
        let error = parse_reply("crm.deal.get", 502, b"<html>Bad Gateway</html>").unwrap_err();
        match error {
            Bitrix24Error::Http { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("Bad Gateway"));
            }
            other => panic!("expected Http, got {:?}", other),
        }
    }

    #[test]
    fn test_params_must_be_object() {
        assert!(to_param(json!({"id": 1})).is_ok());
        assert!(to_param(()).unwrap().is_empty());
        assert!(matches!(
            to_param(json!([1, 2])),
            Err(Bitrix24Error::InvalidArgument(_))
        ));
    }
}
