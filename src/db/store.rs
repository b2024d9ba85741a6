//! SQLite-backed [`ChannelStore`] and [`ChannelAdmin`].

use super::Database;
use crate::state::{Channel, ChannelState, MentionMode, Platform};
use crate::store::{ChannelAdmin, ChannelStore, StoreError};
use async_trait::async_trait;

#[async_trait]
impl ChannelStore for Database {
    async fn list_channels(&self, platform: Option<Platform>) -> Result<Vec<Channel>, StoreError> {
        self.channels().list(platform).await
    }

    async fn get_channel(&self, id: i64) -> Result<Channel, StoreError> {
        self.channels()
            .find(id)
            .await?
            .ok_or(StoreError::ChannelNotFound(id))
    }

    async fn set_channel_state(&self, id: i64, state: &ChannelState) -> Result<(), StoreError> {
        self.channels().set_state(id, state).await
    }

    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<u64>, StoreError> {
        self.subscribers().list(channel_id).await
    }
}

#[async_trait]
impl ChannelAdmin for Database {
    async fn register_channel(
        &self,
        name: &str,
        platform: Platform,
        notify_target: u64,
        mention: MentionMode,
    ) -> Result<Channel, StoreError> {
        self.channels()
            .register(name, platform, notify_target, mention)
            .await
    }

    async fn find_channel(
        &self,
        platform: Platform,
        name: &str,
    ) -> Result<Option<Channel>, StoreError> {
        self.channels().find_by_name(platform, name).await
    }

    async fn remove_channel(&self, id: i64) -> Result<bool, StoreError> {
        self.channels().remove(id).await
    }

    async fn set_notify_target(&self, id: i64, notify_target: u64) -> Result<(), StoreError> {
        self.channels().set_notify_target(id, notify_target).await
    }

    async fn set_mention_mode(&self, id: i64, mention: MentionMode) -> Result<(), StoreError> {
        self.channels().set_mention_mode(id, mention).await
    }

    async fn add_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        self.subscribers().add(user_id, channel_id).await
    }

    async fn remove_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        self.subscribers().remove(user_id, channel_id).await
    }
}
