//! Log-only sink.
//!
//! Used when no chat transport is configured. Every delivery succeeds and
//! nothing leaves the process.

use super::{DeliveryError, DeliverySink, Notification};
use async_trait::async_trait;
use tracing::info;

pub struct LogSink;

#[async_trait]
impl DeliverySink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            target_room = notification.target,
            mention = ?notification.mention,
            text = %notification.text,
            "Notification"
        );
        Ok(())
    }
}
