//! Page-fetching probe for all supported platforms.

use super::{LiveProbe, LiveReading, ProbeError, twitch, youtube};
use crate::config::ProbeConfig;
use crate::state::Platform;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        info!(timeout_secs = timeout.as_secs(), "HTTP probe initialized");

        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<String, ProbeError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        response.text().await.map_err(classify)
    }
}

fn classify(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Http(e)
    }
}

#[async_trait]
impl LiveProbe for HttpProbe {
    async fn probe(&self, platform: Platform, name: &str) -> Result<LiveReading, ProbeError> {
        let url = platform.channel_url(name);
        let page = self.fetch(&url).await?;
        debug!(url = %url, bytes = page.len(), "Fetched channel page");

        match platform {
            Platform::YouTube => youtube::parse(&page),
            Platform::Twitch => twitch::parse(&page),
        }
    }
}
