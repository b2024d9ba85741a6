//! Channel database models.

use crate::state::{Channel, ChannelState, LiveState, MentionMode, Platform};
use crate::store::StoreError;

/// Raw `channels` row as selected by [`super::queries::CHANNEL_COLUMNS`].
pub(super) type ChannelRow = (
    i64,
    String,
    String,
    i64,
    bool,
    bool,
    Option<String>,
    bool,
);

pub(super) fn channel_from_row(row: ChannelRow) -> Result<Channel, StoreError> {
    let (id, name, platform, notify_target, mention_everyone, live, live_title, pending_offline) =
        row;

    let platform: Platform = platform
        .parse()
        .map_err(|e: crate::state::UnknownPlatform| StoreError::Internal(e.to_string()))?;

    let state = if live {
        ChannelState {
            live: LiveState::Live,
            last_title: live_title,
            pending_offline,
        }
    } else {
        ChannelState::offline()
    };

    Ok(Channel {
        id,
        name,
        platform,
        notify_target: notify_target as u64,
        mention: if mention_everyone {
            MentionMode::Everyone
        } else {
            MentionMode::Subscribers
        },
        state,
    })
}
