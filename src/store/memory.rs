//! In-memory channel store.
//!
//! Keeps the same per-channel semantics as the SQLite store, including the
//! subscriber cascade on removal. State does not survive restarts.

use super::{ChannelAdmin, ChannelStore, StoreError};
use crate::state::{Channel, ChannelState, MentionMode, Platform};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: DashMap<i64, Channel>,
    /// Subscribers per channel, in subscription order.
    subscribers: DashMap<i64, Vec<u64>>,
    /// Serializes registration so the (platform, name) check and insert
    /// cannot race. Holds the last assigned id.
    registry: Mutex<i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn list_channels(&self, platform: Option<Platform>) -> Result<Vec<Channel>, StoreError> {
        let mut channels: Vec<Channel> = self
            .channels
            .iter()
            .filter(|c| platform.is_none_or(|p| c.platform == p))
            .map(|c| c.value().clone())
            .collect();
        channels.sort_by_key(|c| c.id);
        Ok(channels)
    }

    async fn get_channel(&self, id: i64) -> Result<Channel, StoreError> {
        self.channels
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or(StoreError::ChannelNotFound(id))
    }

    async fn set_channel_state(&self, id: i64, state: &ChannelState) -> Result<(), StoreError> {
        let mut channel = self
            .channels
            .get_mut(&id)
            .ok_or(StoreError::ChannelNotFound(id))?;
        channel.state = state.clone();
        Ok(())
    }

    async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<u64>, StoreError> {
        Ok(self
            .subscribers
            .get(&channel_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ChannelAdmin for MemoryStore {
    async fn register_channel(
        &self,
        name: &str,
        platform: Platform,
        notify_target: u64,
        mention: MentionMode,
    ) -> Result<Channel, StoreError> {
        let mut last_id = self.registry.lock();
        if self
            .channels
            .iter()
            .any(|c| c.platform == platform && c.name.eq_ignore_ascii_case(name))
        {
            return Err(StoreError::ChannelExists(platform, name.to_string()));
        }

        *last_id += 1;
        let channel = Channel {
            id: *last_id,
            name: name.to_string(),
            platform,
            notify_target,
            mention,
            state: ChannelState::offline(),
        };
        self.channels.insert(channel.id, channel.clone());
        Ok(channel)
    }

    async fn find_channel(
        &self,
        platform: Platform,
        name: &str,
    ) -> Result<Option<Channel>, StoreError> {
        Ok(self
            .channels
            .iter()
            .find(|c| c.platform == platform && c.name.eq_ignore_ascii_case(name))
            .map(|c| c.value().clone()))
    }

    async fn remove_channel(&self, id: i64) -> Result<bool, StoreError> {
        self.subscribers.remove(&id);
        Ok(self.channels.remove(&id).is_some())
    }

    async fn set_notify_target(&self, id: i64, notify_target: u64) -> Result<(), StoreError> {
        let mut channel = self
            .channels
            .get_mut(&id)
            .ok_or(StoreError::ChannelNotFound(id))?;
        channel.notify_target = notify_target;
        Ok(())
    }

    async fn set_mention_mode(&self, id: i64, mention: MentionMode) -> Result<(), StoreError> {
        let mut channel = self
            .channels
            .get_mut(&id)
            .ok_or(StoreError::ChannelNotFound(id))?;
        channel.mention = mention;
        Ok(())
    }

    async fn remove_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .subscribers
            .get_mut(&channel_id)
            .and_then(|mut users| {
                let pos = users.iter().position(|u| *u == user_id)?;
                users.remove(pos);
                Some(())
            })
            .is_some())
    }

    async fn add_subscriber(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        if !self.channels.contains_key(&channel_id) {
            return Err(StoreError::ChannelNotFound(channel_id));
        }
        let mut users = self.subscribers.entry(channel_id).or_default();
        if users.contains(&user_id) {
            return Ok(false);
        }
        users.push(user_id);
        Ok(true)
    }
}
