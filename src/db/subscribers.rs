//! Subscriber repository.
//!
//! A subscription is a bare (user, channel) membership; subscribers are the
//! users pinged when a subscribers-only channel goes live.

use crate::store::StoreError;
use sqlx::SqlitePool;

/// Repository for subscription operations.
pub struct SubscriberRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubscriberRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Subscribe a user to a channel. Returns `false` if already subscribed.
    pub async fn add(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO subscribers (user_id, channel_id)
            VALUES (?, ?)
            "#,
        )
        .bind(user_id as i64)
        .bind(channel_id)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::ChannelNotFound(channel_id)
            }
            other => StoreError::Sqlx(other),
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Unsubscribe a user. Returns whether a subscription existed.
    pub async fn remove(&self, user_id: u64, channel_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE user_id = ? AND channel_id = ?")
            .bind(user_id as i64)
            .bind(channel_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// User ids subscribed to a channel, in subscription order.
    pub async fn list(&self, channel_id: i64) -> Result<Vec<u64>, StoreError> {
        let rows = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM subscribers WHERE channel_id = ? ORDER BY id",
        )
        .bind(channel_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|id| id as u64).collect())
    }
}
