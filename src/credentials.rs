use crate::client::Config;
use crate::error::{Bitrix24Error, Result};
use crate::token::{AccessToken, RenewedAccessToken};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};
use tracing::info;
use url::Url;

/// Incoming webhook address: `https://<portal>/rest/<user id>/<secret>/`
#[derive(Clone)]
pub struct WebhookUrl {
    base: Url,
    user_id: i64,
    secret: SecretString,
}

impl WebhookUrl {
    /// Validate and normalise a webhook address
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let mut url = Url::parse(raw)
            .map_err(|e| Bitrix24Error::InvalidWebhookUrl(format!("{}: {}", redact(raw), e)))?;

        if url.host_str().is_none() {
            return Err(Bitrix24Error::InvalidWebhookUrl("missing host".to_string()));
        }

        let segments: Vec<String> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();

        let (user_id, secret) = match segments.as_slice() {
            [rest, user_id, secret] if rest == "rest" => {
                let user_id = user_id.parse::<i64>().map_err(|_| {
                    Bitrix24Error::InvalidWebhookUrl(format!("user id {:?} is not numeric", user_id))
                })?;
                (user_id, secret.clone())
            }
            _ => {
                return Err(Bitrix24Error::InvalidWebhookUrl(
                    "expected path /rest/<user id>/<secret>/".to_string(),
                ))
            }
        };

        url.set_path(&format!("/rest/{}/{}/", user_id, secret));
        url.set_query(None);
        url.set_fragment(None);

        Ok(WebhookUrl {
            base: url,
            user_id,
            secret: SecretString::from(secret),
        })
    }

    /// User the webhook acts on behalf of
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Portal host the webhook points to
    pub fn domain(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// Endpoint for a REST method
    pub fn endpoint(&self, method: &str) -> Result<Url> {
        Ok(self.base.join(&format!("{}.json", method))?)
    }

    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl FromStr for WebhookUrl {
    type Err = Bitrix24Error;

    fn from_str(s: &str) -> Result<Self> {
        WebhookUrl::parse(s)
    }
}

// Manual Debug to keep the secret out of logs
impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookUrl")
            .field("domain", &self.domain())
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn redact(raw: &str) -> String {
    match raw.find("/rest/") {
        Some(pos) => format!("{}/rest/...", &raw[..pos]),
        None => "<webhook url>".to_string(),
    }
}

/// Permission scopes an application can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ScopeCode {
    AiAdmin,
    Appform,
    Baas,
    Biconnector,
    Bizproc,
    Calendar,
    Calendarmobile,
    Call,
    Cashbox,
    Catalog,
    Catalogmobile,
    #[strum(serialize = "configuration.import")]
    ConfigurationImport,
    ContactCenter,
    Crm,
    Delivery,
    Department,
    Disk,
    Documentgenerator,
    Entity,
    Faceid,
    Forum,
    #[strum(serialize = "humanresources.hcmlink")]
    HumanresourcesHcmlink,
    Iblock,
    Im,
    #[strum(serialize = "im.import")]
    ImImport,
    Imbot,
    Imconnector,
    Imopenlines,
    Intranet,
    Landing,
    LandingCloud,
    Lists,
    Log,
    Mailservice,
    Main,
    Messageservice,
    Mobile,
    Notifications,
    PaySystem,
    Placement,
    Pull,
    PullChannel,
    Rating,
    Rpa,
    Sale,
    Salescenter,
    #[strum(serialize = "sign.b2e")]
    SignB2e,
    Smile,
    Socialnetwork,
    Sonet,
    SonetGroup,
    Task,
    Tasks,
    TasksExtended,
    Tasksmobile,
    Telephony,
    Timeman,
    User,
    #[strum(serialize = "user.mode")]
    UserMode,
    #[strum(serialize = "user.userfield")]
    UserUserfield,
    UserBasic,
    UserBrief,
    Userconsent,
    Userfieldconfig,
    Vote,
}

/// Set of scopes, parsed from a comma-separated list such as `crm,telephony,im`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(Vec<ScopeCode>);

impl Scope {
    pub fn new(codes: Vec<ScopeCode>) -> Self {
        let mut scope = Scope(Vec::with_capacity(codes.len()));
        for code in codes {
            if !scope.0.contains(&code) {
                scope.0.push(code);
            }
        }
        scope
    }

    pub fn codes(&self) -> &[ScopeCode] {
        &self.0
    }

    pub fn contains(&self, code: ScopeCode) -> bool {
        self.0.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Scope {
    type Err = Bitrix24Error;

    fn from_str(s: &str) -> Result<Self> {
        let codes = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| {
                ScopeCode::from_str(&c.to_ascii_lowercase())
                    .map_err(|_| Bitrix24Error::UnknownScope(c.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Scope::new(codes))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.0.iter().map(|c| c.as_ref()).collect();
        f.write_str(&codes.join(","))
    }
}

/// Local or marketplace application registered on the portal
#[derive(Debug, Clone)]
pub struct ApplicationProfile {
    pub client_id: String,
    pub client_secret: SecretString,
    pub scope: Scope,
}

impl ApplicationProfile {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, scope: Scope) -> Self {
        ApplicationProfile {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            scope,
        }
    }

    /// Build a profile from `BITRIX24_APPLICATION_CLIENT_ID`,
    /// `BITRIX24_APPLICATION_CLIENT_SECRET` and `BITRIX24_APPLICATION_SCOPE`
    pub fn from_env() -> Result<Self> {
        let client_id = required_env("BITRIX24_APPLICATION_CLIENT_ID")?;
        let client_secret = required_env("BITRIX24_APPLICATION_CLIENT_SECRET")?;
        let scope = std::env::var("BITRIX24_APPLICATION_SCOPE")
            .unwrap_or_default()
            .parse::<Scope>()?;
        Ok(ApplicationProfile::new(client_id, client_secret, scope))
    }

    pub fn has_client_secret(&self) -> bool {
        !self.client_secret.expose_secret().is_empty()
    }
}

pub(crate) fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Bitrix24Error::InvalidArgument(format!(
            "environment variable {} is not set",
            name
        ))),
    }
}

/// How calls are authenticated against the portal
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Incoming webhook, the secret is part of the URL
    Webhook(WebhookUrl),
    /// OAuth2 application with a renewable access token
    OAuth {
        token: AccessToken,
        profile: ApplicationProfile,
        /// Portal host, e.g. `example.bitrix24.com`
        domain: String,
    },
}

impl Credentials {
    pub fn webhook(url: &str) -> Result<Self> {
        Ok(Credentials::Webhook(WebhookUrl::parse(url)?))
    }

    pub fn oauth(domain: impl Into<String>, token: AccessToken, profile: ApplicationProfile) -> Self {
        let domain = domain.into();
        Credentials::OAuth {
            token,
            profile,
            domain: normalize_domain(&domain),
        }
    }

    /// Endpoint URL for a REST method
    pub fn endpoint(&self, config: &Config, method: &str) -> Result<Url> {
        match self {
            Credentials::Webhook(webhook) => webhook.endpoint(method),
            Credentials::OAuth { domain, .. } => Ok(Url::parse(&format!(
                "{}://{}/rest/{}.json",
                config.scheme, domain, method
            ))?),
        }
    }

    /// Access token to send in the `auth` field, if any
    pub fn auth_param(&self) -> Option<&str> {
        match self {
            Credentials::Webhook(_) => None,
            Credentials::OAuth { token, .. } => Some(&token.access_token),
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            Credentials::Webhook(webhook) => webhook.domain(),
            Credentials::OAuth { domain, .. } => domain,
        }
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Credentials::Webhook(_) => None,
            Credentials::OAuth { token, .. } => Some(token),
        }
    }

    /// Store a renewed token. The portal may have moved to another domain,
    /// which the OAuth server reports through `client_endpoint`.
    pub fn apply_renewed(&mut self, renewed: &RenewedAccessToken) {
        if let Credentials::OAuth { token, domain, .. } = self {
            *token = renewed.access_token();

            if let Some(new_domain) = renewed.portal_domain() {
                if new_domain != *domain {
                    info!(old = %domain, new = %new_domain, "portal domain changed");
                    *domain = new_domain;
                }
            }
        }
    }
}

fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}
