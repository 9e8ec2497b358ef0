use crate::error::Result;
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

/// Default OAuth server used to renew access tokens.
pub const DEFAULT_OAUTH_SERVER: &str = "https://oauth.bitrix.info";

/// Create the HTTP client for REST API requests
/// with connection pooling and the configured timeouts
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Configuration for the REST API client
#[derive(Debug, Clone)]
pub struct Config {
    /// URL scheme used for portal requests (http or https)
    pub scheme: String,
    /// Base URL of the OAuth server handling token renewal
    pub oauth_server: String,
    /// Total request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scheme: "https".to_string(),
            oauth_server: DEFAULT_OAUTH_SERVER.to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("bitrix24-sdk-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Build a configuration from `BITRIX24_OAUTH_SERVER` and `BITRIX24_TIMEOUT_SECS`,
    /// falling back to the defaults for anything missing or unparsable
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(server) = std::env::var("BITRIX24_OAUTH_SERVER") {
            if !server.trim().is_empty() {
                config.oauth_server = server.trim().trim_end_matches('/').to_string();
            }
        }

        if let Some(secs) = std::env::var("BITRIX24_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Set the URL scheme for portal requests
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the OAuth server base URL
    pub fn with_oauth_server(mut self, server: impl Into<String>) -> Self {
        self.oauth_server = server.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the total request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Token renewal endpoint on the OAuth server
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token/", self.oauth_server)
    }
}
