//! Channel repository.
//!
//! Handles channel registration, lookup, and persisted live state.

pub mod models;
pub mod queries;

pub use queries::ChannelRepository;
