//! Channel repository for database queries.

use super::models::{ChannelRow, channel_from_row};
use crate::state::{Channel, ChannelState, MentionMode, Platform};
use crate::store::StoreError;
use sqlx::SqlitePool;

pub(super) const CHANNEL_COLUMNS: &str =
    "id, name, platform, notify_target, mention_everyone, live, live_title, pending_offline";

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new channel in the Offline state.
    pub async fn register(
        &self,
        name: &str,
        platform: Platform,
        notify_target: u64,
        mention: MentionMode,
    ) -> Result<Channel, StoreError> {
        if self.find_by_name(platform, name).await?.is_some() {
            return Err(StoreError::ChannelExists(platform, name.to_string()));
        }

        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO channels (name, platform, notify_target, mention_everyone, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(platform.as_str())
        .bind(notify_target as i64)
        .bind(mention == MentionMode::Everyone)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Channel {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            platform,
            notify_target,
            mention,
            state: ChannelState::offline(),
        })
    }

    /// Find channel by id.
    pub async fn find(&self, id: i64) -> Result<Option<Channel>, StoreError> {
        let row = sqlx::query_as::<_, ChannelRow>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(channel_from_row).transpose()
    }

    /// Find channel by platform handle.
    pub async fn find_by_name(
        &self,
        platform: Platform,
        name: &str,
    ) -> Result<Option<Channel>, StoreError> {
        let row = sqlx::query_as::<_, ChannelRow>(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE platform = ? AND name = ? COLLATE NOCASE"
        ))
        .bind(platform.as_str())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(channel_from_row).transpose()
    }

    /// List channels in registration order, optionally for one platform.
    pub async fn list(&self, platform: Option<Platform>) -> Result<Vec<Channel>, StoreError> {
        let rows = match platform {
            Some(platform) => {
                sqlx::query_as::<_, ChannelRow>(&format!(
                    "SELECT {CHANNEL_COLUMNS} FROM channels WHERE platform = ? ORDER BY id"
                ))
                .bind(platform.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ChannelRow>(&format!(
                    "SELECT {CHANNEL_COLUMNS} FROM channels ORDER BY id"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(channel_from_row).collect()
    }

    /// Replace the engine-owned state in a single statement.
    pub async fn set_state(&self, id: i64, state: &ChannelState) -> Result<(), StoreError> {
        let live = state.live.is_live();
        let result = sqlx::query(
            r#"
            UPDATE channels
            SET live = ?, live_title = ?, pending_offline = ?
            WHERE id = ?
            "#,
        )
        .bind(live)
        .bind(if live { state.last_title.as_deref() } else { None })
        .bind(live && state.pending_offline)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ChannelNotFound(id));
        }
        Ok(())
    }

    /// Move a channel's notifications to another chat room.
    pub async fn set_notify_target(&self, id: i64, notify_target: u64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE channels SET notify_target = ? WHERE id = ?")
            .bind(notify_target as i64)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ChannelNotFound(id));
        }
        Ok(())
    }

    pub async fn set_mention_mode(&self, id: i64, mention: MentionMode) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE channels SET mention_everyone = ? WHERE id = ?")
            .bind(mention == MentionMode::Everyone)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ChannelNotFound(id));
        }
        Ok(())
    }

    /// Remove a channel together with its subscriptions.
    pub async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM subscribers WHERE channel_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
