//! Registers `[[channel]]` config blocks at startup.
//!
//! Config owns a listed channel's notify target and mention mode; live
//! state is never touched. Channels and subscribers are only ever added.

use super::{ChannelAdmin, StoreError};
use crate::config::ChannelBlock;
use crate::state::Channel;
use tracing::info;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub registered: usize,
    pub updated: usize,
    pub subscribers_added: usize,
}

pub async fn sync_channels(
    admin: &dyn ChannelAdmin,
    blocks: &[ChannelBlock],
) -> Result<BootstrapReport, StoreError> {
    let mut report = BootstrapReport::default();

    for block in blocks {
        let channel = match admin.find_channel(block.platform, &block.name).await? {
            Some(existing) => {
                if reconcile(admin, &existing, block).await? {
                    report.updated += 1;
                }
                existing
            }
            None => {
                let channel = admin
                    .register_channel(
                        &block.name,
                        block.platform,
                        block.notify_target,
                        block.mention,
                    )
                    .await?;
                info!(
                    channel_id = channel.id,
                    channel = %channel.name,
                    platform = %channel.platform,
                    "Registered channel from config"
                );
                report.registered += 1;
                channel
            }
        };

        for user_id in &block.subscribers {
            if admin.add_subscriber(*user_id, channel.id).await? {
                report.subscribers_added += 1;
            }
        }
    }

    info!(
        registered = report.registered,
        updated = report.updated,
        subscribers = report.subscribers_added,
        "Channel bootstrap complete"
    );
    Ok(report)
}

/// Apply config-owned settings to an already tracked channel.
async fn reconcile(
    admin: &dyn ChannelAdmin,
    channel: &Channel,
    block: &ChannelBlock,
) -> Result<bool, StoreError> {
    let mut changed = false;

    if channel.notify_target != block.notify_target {
        admin
            .set_notify_target(channel.id, block.notify_target)
            .await?;
        changed = true;
    }
    if channel.mention != block.mention {
        admin.set_mention_mode(channel.id, block.mention).await?;
        changed = true;
    }

    if changed {
        info!(
            channel_id = channel.id,
            channel = %channel.name,
            notify_target = block.notify_target,
            mention = ?block.mention,
            "Updated channel settings from config"
        );
    }
    Ok(changed)
}
