//! Live-status probes.
//!
//! A probe turns a platform page into a best-effort [`LiveReading`]. Probes
//! are unreliable by nature: a still-live channel may intermittently read as
//! offline. Debouncing that is the transition engine's job, not the probe's.

use crate::state::Platform;
use async_trait::async_trait;
use thiserror::Error;

mod http;
pub mod twitch;
pub mod youtube;

pub use crate::state::LiveReading;
pub use http::HttpProbe;

/// Probe failures. All are non-authoritative: no state change follows.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("unparseable page: {0}")]
    Parse(String),
    #[error("probe timed out")]
    Timeout,
}

#[async_trait]
pub trait LiveProbe: Send + Sync {
    /// Read the current live status of `name` on `platform`.
    async fn probe(&self, platform: Platform, name: &str) -> Result<LiveReading, ProbeError>;
}

/// Text between the first `start` marker and the following `end` marker.
pub(crate) fn between<'a>(haystack: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = haystack.find(start)? + start.len();
    let rest = &haystack[from..];
    let to = rest.find(end)?;
    Some(&rest[..to])
}

/// Decode the handful of HTML entities that show up in page titles.
pub(crate) fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
