//! Default values for optional configuration keys.

use crate::state::Platform;

pub(super) fn default_db_path() -> String {
    "livewatch.db".to_string()
}

pub(super) fn default_interval() -> u64 {
    60
}

pub(super) fn default_concurrency() -> usize {
    1
}

pub(super) fn default_probe_timeout() -> u64 {
    10
}

pub(super) fn default_delivery_timeout() -> u64 {
    10
}

pub(super) fn default_platforms() -> Vec<Platform> {
    vec![Platform::YouTube, Platform::Twitch]
}

pub(super) fn default_user_agent() -> String {
    concat!("livewatch/", env!("CARGO_PKG_VERSION")).to_string()
}

pub(super) fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}
