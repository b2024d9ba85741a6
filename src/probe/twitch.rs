//! Twitch channel page parsing.
//!
//! Live channels embed a `VideoObject` JSON-LD block flagged with
//! `isLiveBroadcast`; its `description` carries the stream title. A live
//! marker without that block is a parse error.

use super::{LiveReading, ProbeError, between};

const LIVE_MARKER: &str = "isLiveBroadcast";
const DESCRIPTION: &str = r#""VideoObject","description":""#;

pub fn parse(page: &str) -> Result<LiveReading, ProbeError> {
    if !page.contains(LIVE_MARKER) {
        return Ok(LiveReading::offline());
    }

    let title = between(page, DESCRIPTION, "\"")
        .ok_or_else(|| ProbeError::Parse("live page without VideoObject".to_string()))?;
    Ok(LiveReading::live(title.trim()))
}
