//! Inbound event notifications.
//!
//! The portal delivers bound events as form-encoded POST requests:
//!
//! ```text
//! event=ONCRMDEALDELETE&event_handler_id=12&data[FIELDS][ID]=42&ts=1709276400
//!     &auth[domain]=example.bitrix24.com&auth[application_token]=...
//! ```
//!
//! [`RemoteEvent::from_form`] decodes such a body, [`Event::from_remote`]
//! turns it into a typed event.

pub mod application;
pub mod crm;
pub mod telephony;
pub mod user;

pub use application::{ApplicationInstalled, ApplicationUninstalled};
pub use crm::{CrmAction, CrmEntityChanged, CrmEntityKind};
pub use telephony::ExternalCallStarted;
pub use user::UserAdded;

use crate::convert;
use crate::error::{Bitrix24Error, Result};
use crate::query;
use crate::time::Time;
use crate::token::AccessToken;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Authorization block sent along with an event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventAuth {
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub scope: Option<String>,
    pub domain: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub server_endpoint: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub client_endpoint: Option<String>,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub status: Option<String>,
    /// Shared secret issued to the application at install time
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub application_token: Option<String>,
}

impl EventAuth {
    /// Token the handler can call back with, if the event carried one
    pub fn access_token(&self) -> Option<AccessToken> {
        let access_token = self.access_token.clone()?;
        Some(AccessToken {
            access_token,
            refresh_token: self.refresh_token.clone().unwrap_or_default(),
            expires: self.expires,
            expires_in: self.expires_in,
        })
    }
}

/// Event as posted by the portal, before typing
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEvent {
    /// Upper-cased event code, e.g. `ONCRMDEALADD`
    pub code: String,
    pub handler_id: Option<i64>,
    pub timestamp: Option<Time>,
    pub data: Value,
    pub auth: Option<EventAuth>,
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default, deserialize_with = "convert::opt_int")]
    event_handler_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    ts: Option<i64>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    auth: Option<EventAuth>,
}

impl RemoteEvent {
    /// Decode a form-encoded event body
    pub fn from_form(body: &str) -> Result<Self> {
        let value = query::parse_query(body);
        if value.get("event").is_none() {
            return Err(Bitrix24Error::InvalidArgument(
                "event body has no event code".to_string(),
            ));
        }

        let raw: RawEvent = serde_json::from_value(value)?;
        let event = RemoteEvent {
            code: raw.event.trim().to_uppercase(),
            handler_id: raw.event_handler_id,
            timestamp: raw.ts.and_then(Time::from_unix),
            data: raw.data,
            auth: raw.auth,
        };

        debug!(code = %event.code, handler_id = event.handler_id, "event received");
        Ok(event)
    }

    /// Check the application token against the one stored at install time
    pub fn verify_application_token(&self, expected: &str) -> Result<()> {
        let received = self
            .auth
            .as_ref()
            .and_then(|auth| auth.application_token.as_deref());

        match received {
            Some(token) if !expected.is_empty() && token == expected => Ok(()),
            _ => {
                warn!(code = %self.code, "event with mismatching application token");
                Err(Bitrix24Error::InvalidApplicationToken)
            }
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.auth.as_ref().map(|auth| auth.domain.as_str())
    }

    fn payload<P: DeserializeOwned>(&self, pointer: &str) -> Result<P> {
        let value = self.data.pointer(pointer).cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

/// Event together with its decoded payload
#[derive(Debug, Clone)]
pub struct TypedEvent<P> {
    remote: RemoteEvent,
    payload: P,
}

impl<P> TypedEvent<P> {
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn remote(&self) -> &RemoteEvent {
        &self.remote
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}

/// Typed inbound event
#[derive(Debug, Clone)]
pub enum Event {
    /// `ONCRM<ENTITY><ACTION>` for deals, contacts, companies and leads
    Crm {
        kind: CrmEntityKind,
        action: CrmAction,
        event: TypedEvent<CrmEntityChanged>,
    },
    ApplicationInstall(TypedEvent<ApplicationInstalled>),
    ApplicationUninstall(TypedEvent<ApplicationUninstalled>),
    ExternalCallStart(TypedEvent<ExternalCallStarted>),
    UserAdd(TypedEvent<UserAdded>),
    Unknown(RemoteEvent),
}

impl Event {
    /// Type the event by its code; unknown codes are kept as is
    pub fn from_remote(remote: RemoteEvent) -> Result<Self> {
        if let Some((kind, action)) = crm::parse_code(&remote.code) {
            let payload = remote.payload("/FIELDS")?;
            return Ok(Event::Crm {
                kind,
                action,
                event: TypedEvent { remote, payload },
            });
        }

        Ok(match remote.code.as_str() {
            application::ON_APP_INSTALL => {
                let payload = remote.payload("")?;
                Event::ApplicationInstall(TypedEvent { remote, payload })
            }
            application::ON_APP_UNINSTALL => {
                let payload = remote.payload("")?;
                Event::ApplicationUninstall(TypedEvent { remote, payload })
            }
            telephony::ON_EXTERNAL_CALL_START => {
                let payload = remote.payload("")?;
                Event::ExternalCallStart(TypedEvent { remote, payload })
            }
            user::ON_USER_ADD => {
                let payload = remote.payload("")?;
                Event::UserAdd(TypedEvent { remote, payload })
            }
            _ => Event::Unknown(remote),
        })
    }

    /// Decode a form body and type it in one step
    pub fn from_form(body: &str) -> Result<Self> {
        Self::from_remote(RemoteEvent::from_form(body)?)
    }

    pub fn remote(&self) -> &RemoteEvent {
        match self {
            Event::Crm { event, .. } => event.remote(),
            Event::ApplicationInstall(event) => event.remote(),
            Event::ApplicationUninstall(event) => event.remote(),
            Event::ExternalCallStart(event) => event.remote(),
            Event::UserAdd(event) => event.remote(),
            Event::Unknown(remote) => remote,
        }
    }

    pub fn code(&self) -> &str {
        &self.remote().code
    }
}
