//! Discord REST delivery.
//!
//! Posts to `{api_base}/channels/{target}/messages` as a bot. Mentions are
//! restricted through `allowed_mentions`, so only the users the composer
//! picked are ever pinged.

use super::{DeliveryError, DeliverySink, MentionPolicy, Notification};
use crate::config::DeliveryConfig;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

pub struct DiscordSink {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordSink {
    pub fn new(config: &DeliveryConfig, timeout: Duration) -> Result<Self, DeliveryError> {
        let token = config.resolve_token().ok_or_else(|| {
            DeliveryError::NotConfigured(format!(
                "missing bot token (delivery.token or {})",
                DeliveryConfig::TOKEN_ENV
            ))
        })?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        info!(api_base = %config.api_base, "Discord delivery initialized");

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }
}

/// Request body for a channel message.
pub(super) fn message_payload(notification: &Notification) -> Value {
    let allowed_mentions = match &notification.mention {
        MentionPolicy::None => json!({ "parse": [] }),
        MentionPolicy::Everyone => json!({ "parse": ["everyone"] }),
        MentionPolicy::Users(users) => {
            let users: Vec<String> = users.iter().map(u64::to_string).collect();
            json!({ "parse": [], "users": users })
        }
    };

    json!({
        "content": notification.text,
        "allowed_mentions": allowed_mentions,
    })
}

#[async_trait]
impl DeliverySink for DiscordSink {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let url = format!(
            "{}/channels/{}/messages",
            self.api_base, notification.target
        );

        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&message_payload(notification))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        debug!(room = notification.target, "Discord message delivered");
        Ok(())
    }
}
