//! Tracked channel model.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Streaming platform a channel broadcasts on.
///
/// Config values go through [`FromStr`], so any casing is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Platform {
    YouTube,
    Twitch,
}

impl Platform {
    /// Canonical name, as stored in the database and shown in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Twitch => "Twitch",
        }
    }

    /// Public page for a channel handle on this platform.
    pub fn channel_url(&self, name: &str) -> String {
        match self {
            Self::YouTube => format!("https://www.youtube.com/@{name}/live"),
            Self::Twitch => format!("https://www.twitch.tv/{name}"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown platform name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform: {}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("youtube") {
            Ok(Self::YouTube)
        } else if s.eq_ignore_ascii_case("twitch") {
            Ok(Self::Twitch)
        } else {
            Err(UnknownPlatform(s.to_string()))
        }
    }
}

/// Who gets pinged when a channel goes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionMode {
    /// Broadcast tag (`@everyone`).
    Everyone,
    /// Only users subscribed to the channel.
    #[default]
    #[serde(alias = "subscribers_only")]
    Subscribers,
}

/// Persisted live flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveState {
    #[default]
    Offline,
    Live,
}

impl LiveState {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// The persisted fields owned by the transition engine.
///
/// `pending_offline` and `last_title` are only meaningful while `Live`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelState {
    pub live: LiveState,
    pub last_title: Option<String>,
    pub pending_offline: bool,
}

impl ChannelState {
    /// Initial state of a freshly registered channel.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn live(title: impl Into<String>) -> Self {
        Self {
            live: LiveState::Live,
            last_title: Some(title.into()),
            pending_offline: false,
        }
    }
}

/// A tracked broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub platform: Platform,
    /// Chat room that receives notifications.
    pub notify_target: u64,
    pub mention: MentionMode,
    pub state: ChannelState,
}

impl Channel {
    pub fn url(&self) -> String {
        self.platform.channel_url(&self.name)
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownPlatform;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
