use crate::batch::Batch;
use crate::client::Config;
use crate::core::Core;
use crate::credentials::{required_env, ApplicationProfile, Credentials};
use crate::error::Result;
use crate::services::crm::Crm;
use crate::services::event::Events;
use crate::services::im::Im;
use crate::services::main::Main;
use crate::services::placement::Placement;
use crate::services::telephony::Telephony;
use crate::services::user::User;
use crate::token::{AccessToken, RenewedAccessToken};
use std::sync::Arc;

/// Entry point: builds service objects over a shared transport core.
///
/// Cloning is cheap, clones share credentials and renewal state.
#[derive(Clone)]
pub struct Bitrix24 {
    core: Arc<Core>,
}

impl Bitrix24 {
    /// Client authenticated by an incoming webhook URL such as
    /// `https://example.bitrix24.com/rest/1/abc123/`
    pub fn from_webhook(url: &str) -> Result<Self> {
        Self::with_config(Credentials::webhook(url)?, Config::from_env())
    }

    /// Client authenticated as an OAuth application
    pub fn from_oauth(domain: &str, token: AccessToken, profile: ApplicationProfile) -> Result<Self> {
        Self::with_config(Credentials::oauth(domain, token, profile), Config::from_env())
    }

    /// Webhook client configured from `BITRIX24_WEBHOOK_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_webhook(&required_env("BITRIX24_WEBHOOK_URL")?)
    }

    pub fn with_config(credentials: Credentials, config: Config) -> Result<Self> {
        Ok(Bitrix24 {
            core: Arc::new(Core::new(credentials, config)?),
        })
    }

    /// Register a callback run after every token renewal
    pub fn on_token_renewed<F>(&self, listener: F)
    where
        F: Fn(&RenewedAccessToken) + Send + Sync + 'static,
    {
        self.core.on_token_renewed(listener);
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn main(&self) -> Main<'_> {
        Main::new(&self.core)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(&self.core)
    }

    pub fn crm(&self) -> Crm<'_> {
        Crm::new(&self.core)
    }

    pub fn telephony(&self) -> Telephony<'_> {
        Telephony::new(&self.core)
    }

    pub fn im(&self) -> Im<'_> {
        Im::new(&self.core)
    }

    pub fn placement(&self) -> Placement<'_> {
        Placement::new(&self.core)
    }

    pub fn user(&self) -> User<'_> {
        User::new(&self.core)
    }

    pub fn batch(&self) -> Batch<'_> {
        Batch::new(&self.core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_webhook() {
        let b24 = Bitrix24::from_webhook("https://example.bitrix24.com/rest/1/abc123/").unwrap();
        assert_eq!(b24.core().domain(), "example.bitrix24.com");

        let clone = b24.clone();
        assert!(Arc::ptr_eq(&b24.core, &clone.core));
    }

    #[test]
    fn test_from_webhook_invalid() {
        assert!(Bitrix24::from_webhook("https://example.bitrix24.com/").is_err());
    }
}
