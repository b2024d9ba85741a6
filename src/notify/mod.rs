//! Notification composition and delivery.
//!
//! The composer is pure; sinks own the transport. A delivery failure is
//! reported to the caller and never retried here.

use async_trait::async_trait;
use thiserror::Error;

pub mod composer;
mod discord;
mod log;

pub use composer::{NotifyEvent, compose, needs_subscribers};
pub use discord::DiscordSink;
pub use log::LogSink;

/// Who a delivered message is allowed to ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionPolicy {
    /// Nobody, even if the text contains mentions.
    None,
    /// The broadcast tag.
    Everyone,
    /// Exactly these users.
    Users(Vec<u64>),
}

/// A rendered message bound for one chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub target: u64,
    pub text: String,
    pub mention: MentionPolicy,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("delivery rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("delivery timed out")]
    Timeout,
    #[error("delivery not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}
