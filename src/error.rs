//! Channel-scoped poll errors.
//!
//! Every error here belongs to a single channel's pipeline and is never
//! fatal: the poller logs it, counts it, and moves on to the next channel.

use crate::notify::DeliveryError;
use crate::probe::ProbeError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollError {
    /// No reading this cycle; persisted state is left untouched.
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// State was not written, so no notification was sent either.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// State was written but the notification did not go out. Not retried.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl PollError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Probe(ProbeError::Http(_)) => "probe_http",
            Self::Probe(ProbeError::Status(_)) => "probe_status",
            Self::Probe(ProbeError::Parse(_)) => "probe_parse",
            Self::Probe(ProbeError::Timeout) => "probe_timeout",
            Self::Store(StoreError::ChannelNotFound(_)) => "store_channel_gone",
            Self::Store(_) => "store",
            Self::Delivery(DeliveryError::Timeout) => "delivery_timeout",
            Self::Delivery(DeliveryError::Rejected { .. }) => "delivery_rejected",
            Self::Delivery(_) => "delivery",
        }
    }
}
