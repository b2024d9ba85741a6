//! YouTube `/@handle/live` page parsing.
//!
//! When a channel is live, `/live` canonicalizes to a `watch?v=` URL and the
//! player response reports status `OK`. Otherwise it canonicalizes to the
//! channel page. A page missing either marker (consent walls, interstitials)
//! is a parse error, never an offline reading.

use super::{LiveReading, ProbeError, between, decode_entities};

const CANONICAL: &str = r#"<link rel="canonical" href="https://www.youtube.com/"#;
const STATUS: &str = r#""status":""#;

pub fn parse(page: &str) -> Result<LiveReading, ProbeError> {
    let title = between(page, "<title>", "</title>")
        .ok_or_else(|| ProbeError::Parse("missing <title>".to_string()))?;

    let canonical = between(page, CANONICAL, ">")
        .ok_or_else(|| ProbeError::Parse("missing canonical link".to_string()))?;
    if !canonical.starts_with("watch") {
        return Ok(LiveReading::offline());
    }

    let status = between(page, STATUS, "\"")
        .ok_or_else(|| ProbeError::Parse("missing player status".to_string()))?;
    if status != "OK" {
        return Ok(LiveReading::offline());
    }

    let title = title.trim();
    let title = title.strip_suffix(" - YouTube").unwrap_or(title).trim();
    Ok(LiveReading::live(decode_entities(title)))
}
