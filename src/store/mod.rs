//! Channel state store abstraction.
//!
//! The poller only ever talks to a [`ChannelStore`]. Writes are keyed per
//! channel, so no cross-channel locking is needed; each `set_channel_state`
//! is a single atomic update.

use crate::state::{Channel, ChannelState, MentionMode, Platform};
use async_trait::async_trait;
use thiserror::Error;

pub mod bootstrap;
pub mod memory;

pub use memory::MemoryStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("channel not found: {0}")]
    ChannelNotFound(i64),
    #[error("channel already registered: {0} {1}")]
    ChannelExists(Platform, String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// List tracked channels, optionally for one platform, in id order.
    async fn list_channels(&self, platform: Option<Platform>) -> Result<Vec<Channel>, StoreError>;

    /// Fetch a single channel.
    async fn get_channel(&self, id: i64) -> Result<Channel, StoreError>;

    /// Atomically replace the engine-owned state of a channel.
    ///
    /// Fails with [`StoreError::ChannelNotFound`] if the channel was removed.
    async fn set_channel_state(&self, id: i64, state: &ChannelState) -> Result<(), StoreError>;

    /// User ids subscribed to a channel.
    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<u64>, StoreError>;
}

/// Operator-side channel management.
///
/// Registration and removal happen outside the poll loop; removal cascades
/// to the channel's subscriptions.
#[async_trait]
pub trait ChannelAdmin: Send + Sync {
    /// Register a channel in the Offline state.
    async fn register_channel(
        &self,
        name: &str,
        platform: Platform,
        notify_target: u64,
        mention: MentionMode,
    ) -> Result<Channel, StoreError>;

    async fn find_channel(
        &self,
        platform: Platform,
        name: &str,
    ) -> Result<Option<Channel>, StoreError>;

    /// Remove a channel and all of its subscriptions. Returns whether it existed.
    async fn remove_channel(&self, id: i64) -> Result<bool, StoreError>;

    /// Move a channel's notifications to another chat room.
    async fn set_notify_target(&self, id: i64, notify_target: u64) -> Result<(), StoreError>;

    async fn set_mention_mode(&self, id: i64, mention: MentionMode) -> Result<(), StoreError>;

    /// Subscribe a user. Returns `false` if already subscribed.
    async fn add_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError>;

    /// Unsubscribe a user. Returns whether a subscription existed.
    async fn remove_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError>;
}
