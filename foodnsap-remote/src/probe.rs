use crate::config::RemoteConfig;
use async_trait::async_trait;
use foodnsap::Connectivity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Treats the backend as reachable when a GET to `url` gets any HTTP answer
/// within the timeout, whatever the status.
pub struct HttpProbe {
    url: String,
    http_client: reqwest::Client,
    last_seen: AtomicBool,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            url: url.into(),
            http_client,
            last_seen: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.health_url(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        let online = match self.http_client.get(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("[PROBE] {} unreachable: {}", self.url, e);
                false
            }
        };
        if self.last_seen.swap(online, Ordering::Relaxed) != online {
            tracing::info!(
                "[PROBE] backend {} is {}",
                self.url,
                if online { "reachable" } else { "unreachable" }
            );
        }
        online
    }
}
