//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and loading
//! - [`defaults`]: default values for optional keys
//! - [`validation`]: startup checks

mod defaults;
mod types;
mod validation;

pub use types::{
    ChannelBlock, Config, ConfigError, DatabaseConfig, DeliveryConfig, MetricsConfig, PollConfig,
    ProbeConfig, SinkKind, StoreBackend,
};
pub use validation::{ValidationError, validate};
