//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, SinkKind, StoreBackend};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("poll.interval_secs must be greater than zero")]
    ZeroInterval,
    #[error("poll.concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("poll.platforms must list at least one platform")]
    NoPlatforms,
    #[error("channel block #{0} has an empty name")]
    EmptyChannelName(usize),
    #[error("delivery.kind = \"discord\" requires delivery.token or LIVEWATCH_DISCORD_TOKEN")]
    MissingToken,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.poll.interval_secs == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.poll.concurrency == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }
    if config.poll.platforms.is_empty() {
        errors.push(ValidationError::NoPlatforms);
    }

    for (i, block) in config.channels.iter().enumerate() {
        if block.name.trim().is_empty() {
            errors.push(ValidationError::EmptyChannelName(i));
        }
    }

    if config.delivery.kind == SinkKind::Discord && config.delivery.resolve_token().is_none() {
        errors.push(ValidationError::MissingToken);
    }

    if config.database.backend == StoreBackend::Sqlite && config.database.path != ":memory:" {
        let db_path = Path::new(&config.database.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(
                config.database.path.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
