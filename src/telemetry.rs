//! Telemetry utilities for poll timing and span correlation.

use std::time::Instant;

/// Guard for timing a poll cycle and recording metrics.
///
/// Records cycle latency when dropped.
pub struct CycleTimer {
    start: Instant,
}

impl CycleTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        crate::metrics::record_cycle(self.start.elapsed().as_secs_f64());
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::state::Channel;
    use tracing::{Span, info_span};

    /// Span for one poll cycle.
    pub fn poll_cycle(cycle: u64) -> Span {
        info_span!("poll_cycle", cycle = cycle)
    }

    /// Span for one channel's probe/transition/notify pipeline.
    pub fn channel(channel: &Channel) -> Span {
        info_span!(
            "channel",
            id = channel.id,
            channel = %channel.name,
            platform = %channel.platform
        )
    }
}
