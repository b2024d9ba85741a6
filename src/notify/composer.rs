//! Notification text and audience.
//!
//! Pure: the output depends only on the decision, the channel, and the
//! subscriber list handed in.

use super::{MentionPolicy, Notification};
use crate::state::{Channel, MentionMode};

/// Event worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    GoLive { title: String },
    StreamEnded,
}

/// Whether composing `event` for `channel` needs the subscriber list.
pub fn needs_subscribers(event: &NotifyEvent, channel: &Channel) -> bool {
    matches!(event, NotifyEvent::GoLive { .. }) && channel.mention == MentionMode::Subscribers
}

/// Render a notification for `channel`.
pub fn compose(event: &NotifyEvent, channel: &Channel, subscribers: &[u64]) -> Notification {
    match event {
        NotifyEvent::GoLive { title } => {
            let mut text = format!(
                "## {}'s [stream is live]({}) !\nGo watch today's stream **{}**",
                channel.name,
                channel.url(),
                strip_urls(title)
            );

            let mention = match channel.mention {
                MentionMode::Everyone => {
                    text.push_str("\n@everyone");
                    MentionPolicy::Everyone
                }
                MentionMode::Subscribers if subscribers.is_empty() => MentionPolicy::None,
                MentionMode::Subscribers => {
                    text.push_str("\n*Subscribers: ");
                    for user in subscribers {
                        text.push_str(&format!("<@{user}>; "));
                    }
                    text.push('*');
                    MentionPolicy::Users(subscribers.to_vec())
                }
            };

            Notification {
                target: channel.notify_target,
                text,
                mention,
            }
        }
        NotifyEvent::StreamEnded => Notification {
            target: channel.notify_target,
            text: format!("{}'s stream has ended.", channel.name),
            mention: MentionPolicy::None,
        },
    }
}

/// Drop URLs embedded in a stream title so chat clients don't unfurl them.
pub fn strip_urls(title: &str) -> String {
    title
        .split_whitespace()
        .filter(|word| !word.starts_with("http://") && !word.starts_with("https://"))
        .collect::<Vec<_>>()
        .join(" ")
}
