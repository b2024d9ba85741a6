//! Prometheus metrics collection for livewatch.
//!
//! - `livewatch_poll_cycles_total` - Completed poll cycles
//! - `livewatch_poll_cycle_duration_seconds` - Cycle latency histogram
//! - `livewatch_probe_failures_total{platform}` - Readings that never arrived
//! - `livewatch_transitions_total{kind}` - Engine steps by kind
//! - `livewatch_notifications_total{result}` - Delivery outcomes
//! - `livewatch_poll_errors_total{error}` - Channel pipeline errors
//! - `livewatch_live_channels` - Channels persisted as live after the last cycle
//!
//! Recording is a no-op until [`init`] has run.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub static POLL_CYCLES: OnceLock<IntCounter> = OnceLock::new();
pub static POLL_CYCLE_DURATION: OnceLock<Histogram> = OnceLock::new();
pub static PROBE_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();
pub static TRANSITIONS: OnceLock<IntCounterVec> = OnceLock::new();
pub static NOTIFICATIONS: OnceLock<IntCounterVec> = OnceLock::new();
pub static POLL_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();
pub static LIVE_CHANNELS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before metrics are expected to record.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(POLL_CYCLES, IntCounter::new("livewatch_poll_cycles_total", "Completed poll cycles"));
    register!(POLL_CYCLE_DURATION, Histogram::with_opts(
        HistogramOpts::new("livewatch_poll_cycle_duration_seconds", "Poll cycle duration")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0])));
    register!(PROBE_FAILURES, IntCounterVec::new(Opts::new("livewatch_probe_failures_total", "Probe failures by platform"), &["platform"]));
    register!(TRANSITIONS, IntCounterVec::new(Opts::new("livewatch_transitions_total", "Engine steps by kind"), &["kind"]));
    register!(NOTIFICATIONS, IntCounterVec::new(Opts::new("livewatch_notifications_total", "Notification deliveries by result"), &["result"]));
    register!(POLL_ERRORS, IntCounterVec::new(Opts::new("livewatch_poll_errors_total", "Channel pipeline errors by type"), &["error"]));
    register!(LIVE_CHANNELS, IntGauge::new("livewatch_live_channels", "Channels currently live"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

pub fn record_cycle(duration_secs: f64) {
    if let Some(c) = POLL_CYCLES.get() {
        c.inc();
    }
    if let Some(h) = POLL_CYCLE_DURATION.get() {
        h.observe(duration_secs);
    }
}

pub fn record_probe_failure(platform: &str) {
    if let Some(c) = PROBE_FAILURES.get() {
        c.with_label_values(&[platform]).inc();
    }
}

pub fn record_transition(kind: &str) {
    if let Some(c) = TRANSITIONS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

pub fn record_notification(result: &str) {
    if let Some(c) = NOTIFICATIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

pub fn record_poll_error(error: &str) {
    if let Some(c) = POLL_ERRORS.get() {
        c.with_label_values(&[error]).inc();
    }
}

pub fn set_live_channels(count: usize) {
    if let Some(g) = LIVE_CHANNELS.get() {
        g.set(count as i64);
    }
}
