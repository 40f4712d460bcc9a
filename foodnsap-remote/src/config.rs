use foodnsap::{FoodnsapError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        RemoteConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Load backend configuration from environment variables.
    ///
    /// Required: FOODNSAP_BACKEND_URL (http or https)
    /// Required: FOODNSAP_ANON_KEY
    /// Optional: FOODNSAP_ACCESS_TOKEN (signed-in user; the anon key is used otherwise)
    /// Optional: FOODNSAP_TIMEOUT_SECS (defaults to 5)
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("FOODNSAP_BACKEND_URL")
            .map_err(|_| FoodnsapError::Config("FOODNSAP_BACKEND_URL is required".into()))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FoodnsapError::Config(format!(
                "FOODNSAP_BACKEND_URL must be an http(s) URL, got: {}",
                base_url
            )));
        }

        let anon_key = env::var("FOODNSAP_ANON_KEY")
            .map_err(|_| FoodnsapError::Config("FOODNSAP_ANON_KEY is required".into()))?;

        let mut config = RemoteConfig::new(base_url, anon_key);
        config.access_token = env::var("FOODNSAP_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());

        if let Ok(raw) = env::var("FOODNSAP_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                FoodnsapError::Config(format!("Invalid FOODNSAP_TIMEOUT_SECS: {}", raw))
            })?;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Token sent as `Authorization: Bearer`.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn health_url(&self) -> String {
        format!("{}/rest/v1/", self.base_url)
    }
}
