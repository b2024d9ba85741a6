//! Poll driver.
//!
//! Each cycle walks the configured platform groups in order, probes every
//! channel, and feeds readings to the [`TransitionEngine`] one at a time in
//! listing order. Cycles never overlap: the next tick is only awaited once
//! the previous cycle has fully completed.
//!
//! Per channel the pipeline is: probe -> engine step -> (compose) -> state
//! write -> deliver. The notification is only sent after its paired state
//! write succeeded, so a failed write can never double-notify on replay.
//! A failed or timed-out probe produces no step at all.

use crate::error::PollError;
use crate::metrics;
use crate::notify::{self, DeliveryError, DeliverySink, NotifyEvent};
use crate::probe::{LiveProbe, LiveReading, ProbeError};
use crate::state::{Channel, Decision, Platform, StepKind, TransitionEngine};
use crate::store::ChannelStore;
use crate::telemetry::{CycleTimer, spans};
use futures_util::StreamExt;
use futures_util::stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, warn};

/// Poll loop tuning.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub platforms: Vec<Platform>,
    pub concurrency: usize,
    pub probe_timeout: Duration,
    pub delivery_timeout: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            platforms: vec![Platform::YouTube, Platform::Twitch],
            concurrency: 1,
            probe_timeout: Duration::from_secs(10),
            delivery_timeout: Duration::from_secs(10),
        }
    }
}

/// Counts for one completed cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub polled: usize,
    pub probe_failures: usize,
    pub go_live: usize,
    pub ended: usize,
    pub delivered: usize,
    pub errors: usize,
    pub live: usize,
}

/// What a single channel's pipeline did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Skipped,
    Stepped { live: bool },
    Notified { kind: StepKind },
}

pub struct Scheduler {
    store: Arc<dyn ChannelStore>,
    probe: Arc<dyn LiveProbe>,
    sink: Arc<dyn DeliverySink>,
    engine: TransitionEngine,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn ChannelStore>,
        probe: Arc<dyn LiveProbe>,
        sink: Arc<dyn DeliverySink>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            store,
            probe,
            sink,
            engine: TransitionEngine::new(),
            settings,
        }
    }

    /// Poll every `interval` until `shutdown` flips to `true`.
    ///
    /// The first cycle starts immediately. A cycle that overruns the
    /// interval delays the next one instead of triggering a burst.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = interval.as_secs(),
            sink = self.sink.name(),
            "Poller started"
        );

        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
            if *shutdown.borrow() {
                break;
            }

            cycle += 1;
            let report = self
                .run_cycle_until(&shutdown)
                .instrument(spans::poll_cycle(cycle))
                .await;

            debug!(
                cycle,
                polled = report.polled,
                probe_failures = report.probe_failures,
                go_live = report.go_live,
                ended = report.ended,
                delivered = report.delivered,
                errors = report.errors,
                "Poll cycle complete"
            );
        }

        info!(cycles = cycle, "Poller stopped");
    }

    /// Run one full cycle over every platform group.
    pub async fn run_cycle(&self) -> CycleReport {
        let (_tx, rx) = watch::channel(false);
        self.run_cycle_until(&rx).await
    }

    async fn run_cycle_until(&self, shutdown: &watch::Receiver<bool>) -> CycleReport {
        let _timer = CycleTimer::start();
        let mut report = CycleReport::default();

        for platform in &self.settings.platforms {
            if *shutdown.borrow() {
                break;
            }

            let channels = match self.store.list_channels(Some(*platform)).await {
                Ok(channels) => channels,
                Err(e) => {
                    error!(platform = %platform, error = %e, "Failed to list channels");
                    metrics::record_poll_error("store_list");
                    report.errors += 1;
                    continue;
                }
            };

            self.poll_group(channels, shutdown, &mut report).await;
        }

        metrics::set_live_channels(report.live);
        report
    }

    /// Probe a platform group and apply readings in listing order.
    ///
    /// Up to `concurrency` probes are in flight at once; the engine still
    /// sees one reading at a time, in order.
    async fn poll_group(
        &self,
        channels: Vec<Channel>,
        shutdown: &watch::Receiver<bool>,
        report: &mut CycleReport,
    ) {
        let readings = stream::iter(channels)
            .map(|channel| {
                let span = spans::channel(&channel);
                async move {
                    let reading = self.read(&channel).await;
                    (channel, reading)
                }
                .instrument(span)
            })
            .buffered(self.settings.concurrency.max(1));
        let mut readings = std::pin::pin!(readings);

        while let Some((channel, reading)) = readings.next().await {
            // Dropping the stream cancels in-flight probes only; no state
            // has been touched for them yet.
            if *shutdown.borrow() {
                break;
            }

            report.polled += 1;
            let span = spans::channel(&channel);
            match self.process(&channel, reading).instrument(span).await {
                Ok(Outcome::Skipped) => {
                    report.probe_failures += 1;
                    if channel.state.live.is_live() {
                        report.live += 1;
                    }
                }
                Ok(Outcome::Stepped { live }) => {
                    if live {
                        report.live += 1;
                    }
                }
                Ok(Outcome::Notified { kind }) => {
                    report.delivered += 1;
                    match kind {
                        StepKind::GoLive => {
                            report.go_live += 1;
                            report.live += 1;
                        }
                        StepKind::StreamEnded => report.ended += 1,
                        _ => {}
                    }
                }
                Err(e) => {
                    report.errors += 1;
                    metrics::record_poll_error(e.error_code());
                    match &e {
                        PollError::Delivery(_) => {
                            // State already moved on; count the edge anyway.
                            if channel.state.live.is_live() {
                                report.ended += 1;
                            } else {
                                report.go_live += 1;
                                report.live += 1;
                            }
                            warn!(
                                channel_id = channel.id,
                                channel = %channel.name,
                                error = %e,
                                "State updated but notification not delivered"
                            );
                        }
                        _ => {
                            if channel.state.live.is_live() {
                                report.live += 1;
                            }
                            warn!(
                                channel_id = channel.id,
                                channel = %channel.name,
                                error = %e,
                                "Channel poll failed"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Probe one channel, bounded by the probe timeout.
    async fn read(&self, channel: &Channel) -> Result<LiveReading, ProbeError> {
        match tokio::time::timeout(
            self.settings.probe_timeout,
            self.probe.probe(channel.platform, &channel.name),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout),
        }
    }

    /// Apply one reading to one channel.
    async fn process(
        &self,
        channel: &Channel,
        reading: Result<LiveReading, ProbeError>,
    ) -> Result<Outcome, PollError> {
        let reading = match reading {
            Ok(reading) => reading,
            Err(e) => {
                // Not a reading: leave state, including any pending flag, as-is.
                metrics::record_probe_failure(channel.platform.as_str());
                debug!(error = %e, "Probe failed, skipping channel this cycle");
                return Ok(Outcome::Skipped);
            }
        };

        let transition = self.engine.step(&channel.state, &reading);
        metrics::record_transition(transition.kind.label());

        let event = match &transition.decision {
            Decision::None => None,
            Decision::GoLive { title } => Some(NotifyEvent::GoLive {
                title: title.clone(),
            }),
            Decision::StreamEnded => Some(NotifyEvent::StreamEnded),
        };

        // Compose before writing: if the subscriber lookup fails nothing has
        // been persisted and the edge is retried next cycle.
        let notification = match &event {
            Some(event) => {
                let subscribers = if notify::needs_subscribers(event, channel) {
                    self.store.list_subscribers(channel.id).await?
                } else {
                    Vec::new()
                };
                Some(notify::compose(event, channel, &subscribers))
            }
            None => None,
        };

        if transition.changes(&channel.state) {
            self.store
                .set_channel_state(channel.id, &transition.next)
                .await?;
        }

        match transition.kind {
            StepKind::Debounce => debug!("Offline reading while live, awaiting confirmation"),
            StepKind::FlickerAbsorbed => debug!("Live reading cleared pending offline"),
            _ => {}
        }

        let Some(notification) = notification else {
            return Ok(Outcome::Stepped {
                live: transition.next.live.is_live(),
            });
        };

        match transition.kind {
            StepKind::GoLive => info!(
                title = transition.next.last_title.as_deref().unwrap_or_default(),
                "Channel went live"
            ),
            _ => info!("Stream ended"),
        }

        let delivered = tokio::time::timeout(
            self.settings.delivery_timeout,
            self.sink.deliver(&notification),
        )
        .await
        .unwrap_or(Err(DeliveryError::Timeout));

        match delivered {
            Ok(()) => {
                metrics::record_notification("delivered");
                Ok(Outcome::Notified {
                    kind: transition.kind,
                })
            }
            Err(e) => {
                metrics::record_notification("failed");
                Err(PollError::Delivery(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MentionPolicy, Notification};
    use crate::state::{ChannelState, LiveState, MentionMode};
    use crate::store::{ChannelAdmin, MemoryStore, StoreError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Probe that replays a per-channel script; an exhausted script fails.
    #[derive(Default)]
    struct ScriptedProbe {
        scripts: Mutex<HashMap<String, VecDeque<Result<LiveReading, ProbeError>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn script(&self, name: &str, readings: Vec<Result<LiveReading, ProbeError>>) {
            self.scripts
                .lock()
                .insert(name.to_string(), readings.into());
        }
    }

    #[async_trait]
    impl LiveProbe for ScriptedProbe {
        async fn probe(&self, _platform: Platform, name: &str) -> Result<LiveReading, ProbeError> {
            self.calls.lock().push(name.to_string());
            self.scripts
                .lock()
                .get_mut(name)
                .and_then(|s| s.pop_front())
                .unwrap_or(Err(ProbeError::Parse("script exhausted".into())))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Notification>>,
        fail: AtomicBool,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<Notification> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl DeliverySink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DeliveryError::Rejected {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.sent.lock().push(notification.clone());
            Ok(())
        }
    }

    /// Memory store with injectable failures.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
        /// Listing this platform group fails.
        broken_platform: Option<Platform>,
        /// Subscriber lookups remove the channel first, as an operator
        /// removal landing mid-cycle would.
        remove_on_lookup: AtomicBool,
    }

    impl FlakyStore {
        fn wrap(inner: MemoryStore) -> Self {
            Self {
                inner,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ChannelStore for FlakyStore {
        async fn list_channels(
            &self,
            platform: Option<Platform>,
        ) -> Result<Vec<Channel>, StoreError> {
            if platform.is_some() && platform == self.broken_platform {
                return Err(StoreError::Internal("listing failed".into()));
            }
            self.inner.list_channels(platform).await
        }

        async fn get_channel(&self, id: i64) -> Result<Channel, StoreError> {
            self.inner.get_channel(id).await
        }

        async fn set_channel_state(&self, id: i64, state: &ChannelState) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Internal("disk full".into()));
            }
            self.inner.set_channel_state(id, state).await
        }

        async fn list_subscribers(&self, channel_id: i64) -> Result<Vec<u64>, StoreError> {
            if self.remove_on_lookup.load(Ordering::SeqCst) {
                self.inner.remove_channel(channel_id).await?;
            }
            self.inner.list_subscribers(channel_id).await
        }
    }

    fn scheduler_over(
        store: Arc<FlakyStore>,
    ) -> (Scheduler, Arc<ScriptedProbe>, Arc<RecordingSink>) {
        let probe = Arc::new(ScriptedProbe::default());
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(
            store,
            probe.clone(),
            sink.clone(),
            SchedulerSettings::default(),
        );
        (scheduler, probe, sink)
    }

    struct Harness {
        store: Arc<MemoryStore>,
        probe: Arc<ScriptedProbe>,
        sink: Arc<RecordingSink>,
        scheduler: Scheduler,
    }

    fn harness(settings: SchedulerSettings) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let probe = Arc::new(ScriptedProbe::default());
        let sink = Arc::new(RecordingSink::default());
        let scheduler = Scheduler::new(store.clone(), probe.clone(), sink.clone(), settings);
        Harness {
            store,
            probe,
            sink,
            scheduler,
        }
    }

    async fn add(store: &MemoryStore, name: &str, platform: Platform) -> Channel {
        store
            .register_channel(name, platform, 900, MentionMode::Subscribers)
            .await
            .unwrap()
    }

    fn live(title: &str) -> Result<LiveReading, ProbeError> {
        Ok(LiveReading::live(title))
    }

    fn offline() -> Result<LiveReading, ProbeError> {
        Ok(LiveReading::offline())
    }

    #[tokio::test]
    async fn go_live_then_debounced_end() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.probe
            .script("C", vec![live("Intro to X"), offline(), offline()]);

        let r1 = h.scheduler.run_cycle().await;
        assert_eq!(r1.go_live, 1);
        let sent = h.sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("**Intro to X**"));
        assert_eq!(sent[0].target, 900);
        let state = h.store.get_channel(ch.id).await.unwrap().state;
        assert_eq!(state, ChannelState::live("Intro to X"));

        h.scheduler.run_cycle().await;
        assert_eq!(h.sink.sent().len(), 1);
        assert!(h.store.get_channel(ch.id).await.unwrap().state.pending_offline);

        let r3 = h.scheduler.run_cycle().await;
        assert_eq!(r3.ended, 1);
        let sent = h.sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].text, "C's stream has ended.");
        assert_eq!(sent[1].mention, MentionPolicy::None);
        let state = h.store.get_channel(ch.id).await.unwrap().state;
        assert_eq!(state.live, LiveState::Offline);
        assert!(state.last_title.is_none());
    }

    #[tokio::test]
    async fn consecutive_live_readings_notify_once() {
        let h = harness(SchedulerSettings::default());
        add(&h.store, "C", Platform::Twitch).await;
        h.probe.script("C", vec![live("a"), live("a")]);

        h.scheduler.run_cycle().await;
        h.scheduler.run_cycle().await;
        assert_eq!(h.sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn flicker_produces_no_notification() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::Twitch).await;
        h.store
            .set_channel_state(ch.id, &ChannelState::live("x"))
            .await
            .unwrap();
        h.probe.script("C", vec![offline(), live("x")]);

        h.scheduler.run_cycle().await;
        h.scheduler.run_cycle().await;

        assert!(h.sink.sent().is_empty());
        let state = h.store.get_channel(ch.id).await.unwrap().state;
        assert_eq!(state, ChannelState::live("x"));
    }

    #[tokio::test]
    async fn probe_failure_leaves_state_untouched() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.store
            .set_channel_state(ch.id, &ChannelState::live("x"))
            .await
            .unwrap();
        h.probe.script(
            "C",
            vec![live("x"), Err(ProbeError::Status(503)), live("x")],
        );

        for _ in 0..3 {
            h.scheduler.run_cycle().await;
            assert_eq!(
                h.store.get_channel(ch.id).await.unwrap().state,
                ChannelState::live("x")
            );
        }
        assert!(h.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn probe_failure_keeps_pending_flag() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.store
            .set_channel_state(ch.id, &ChannelState::live("x"))
            .await
            .unwrap();
        h.probe
            .script("C", vec![offline(), Err(ProbeError::Timeout), offline()]);

        h.scheduler.run_cycle().await;
        let r2 = h.scheduler.run_cycle().await;
        assert_eq!(r2.probe_failures, 1);
        assert!(h.store.get_channel(ch.id).await.unwrap().state.pending_offline);

        // The pending flag is confirmed by the next real reading.
        h.scheduler.run_cycle().await;
        assert_eq!(h.sink.sent().len(), 1);
        assert_eq!(
            h.store.get_channel(ch.id).await.unwrap().state,
            ChannelState::offline()
        );
    }

    #[tokio::test]
    async fn failed_state_write_suppresses_notification() {
        let inner = MemoryStore::new();
        let ch = add(&inner, "C", Platform::YouTube).await;
        let store = Arc::new(FlakyStore::wrap(inner));
        store.fail_writes.store(true, Ordering::SeqCst);
        let (scheduler, probe, sink) = scheduler_over(store.clone());
        probe.script("C", vec![live("t"), live("t"), live("t")]);

        let r1 = scheduler.run_cycle().await;
        assert_eq!(r1.errors, 1);
        assert!(sink.sent().is_empty());
        assert_eq!(
            store.get_channel(ch.id).await.unwrap().state,
            ChannelState::offline()
        );

        // Once writes recover the edge is replayed exactly once.
        store.fail_writes.store(false, Ordering::SeqCst);
        scheduler.run_cycle().await;
        scheduler.run_cycle().await;
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_is_not_retried() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.sink.fail.store(true, Ordering::SeqCst);
        h.probe.script("C", vec![live("t"), live("t")]);

        let r1 = h.scheduler.run_cycle().await;
        assert_eq!(r1.errors, 1);
        assert_eq!(r1.go_live, 1);
        assert!(h.store.get_channel(ch.id).await.unwrap().state.live.is_live());

        h.sink.fail.store(false, Ordering::SeqCst);
        h.scheduler.run_cycle().await;
        assert!(h.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn sibling_channels_are_isolated_and_ordered() {
        let h = harness(SchedulerSettings::default());
        add(&h.store, "tw1", Platform::Twitch).await;
        add(&h.store, "yt1", Platform::YouTube).await;
        add(&h.store, "yt2", Platform::YouTube).await;
        h.probe.script("tw1", vec![live("t")]);
        h.probe.script("yt1", vec![Err(ProbeError::Parse("markup".into()))]);
        h.probe.script("yt2", vec![live("y")]);

        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.polled, 3);
        assert_eq!(report.probe_failures, 1);
        assert_eq!(report.go_live, 2);
        assert_eq!(report.live, 2);

        // YouTube group first, each group in registration order.
        assert_eq!(*h.probe.calls.lock(), vec!["yt1", "yt2", "tw1"]);
        let targets: Vec<String> = h
            .sink
            .sent()
            .iter()
            .map(|n| n.text.lines().next().unwrap_or_default().to_string())
            .collect();
        assert!(targets[0].contains("yt2"));
        assert!(targets[1].contains("tw1"));
    }

    #[tokio::test]
    async fn concurrent_probes_apply_in_order() {
        let h = harness(SchedulerSettings {
            concurrency: 4,
            ..SchedulerSettings::default()
        });
        for i in 0..6 {
            let name = format!("c{i}");
            add(&h.store, &name, Platform::Twitch).await;
            h.probe.script(&name, vec![live(&name)]);
        }

        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.go_live, 6);
        let order: Vec<bool> = h
            .sink
            .sent()
            .iter()
            .enumerate()
            .map(|(i, n)| n.text.contains(&format!("**c{i}**")))
            .collect();
        assert!(order.iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn subscribers_are_mentioned() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.store.add_subscriber(11, ch.id).await.unwrap();
        h.store.add_subscriber(22, ch.id).await.unwrap();
        h.probe.script("C", vec![live("t")]);

        h.scheduler.run_cycle().await;
        let sent = h.sink.sent();
        assert_eq!(sent[0].mention, MentionPolicy::Users(vec![11, 22]));
        assert!(sent[0].text.contains("<@11>; <@22>;"));
    }

    #[tokio::test]
    async fn channel_removed_before_cycle_is_skipped() {
        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.store.remove_channel(ch.id).await.unwrap();
        h.probe.script("C", vec![live("t")]);

        let report = h.scheduler.run_cycle().await;
        assert_eq!(report.polled, 0);
        assert!(h.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn channel_removed_mid_cycle_is_not_notified() {
        let inner = MemoryStore::new();
        let ch = add(&inner, "C", Platform::YouTube).await;
        let store = Arc::new(FlakyStore::wrap(inner));
        store.remove_on_lookup.store(true, Ordering::SeqCst);
        let (scheduler, probe, sink) = scheduler_over(store.clone());
        probe.script("C", vec![live("t")]);

        let report = scheduler.run_cycle().await;
        assert_eq!(report.polled, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.go_live, 0);
        assert!(sink.sent().is_empty());
        assert!(matches!(
            store.get_channel(ch.id).await,
            Err(StoreError::ChannelNotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_listing_skips_only_that_platform() {
        let inner = MemoryStore::new();
        add(&inner, "yt", Platform::YouTube).await;
        add(&inner, "tw", Platform::Twitch).await;
        let store = Arc::new(FlakyStore {
            broken_platform: Some(Platform::YouTube),
            ..FlakyStore::wrap(inner)
        });
        let (scheduler, probe, sink) = scheduler_over(store);
        probe.script("yt", vec![live("a")]);
        probe.script("tw", vec![live("b")]);

        let report = scheduler.run_cycle().await;
        assert_eq!(report.errors, 1);
        assert_eq!(report.polled, 1);
        assert_eq!(report.go_live, 1);
        assert_eq!(*probe.calls.lock(), vec!["tw"]);
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("**b**"));
    }

    #[tokio::test]
    async fn unreadable_pages_do_not_end_a_stream() {
        use crate::probe::youtube;

        let live_page = r#"<title>Intro - YouTube</title>
            <link rel="canonical" href="https://www.youtube.com/watch?v=abc">
            <script>{"status":"OK"}</script>"#;
        let consent_wall = "<html><title>Before you continue to YouTube</title></html>";

        let h = harness(SchedulerSettings::default());
        let ch = add(&h.store, "C", Platform::YouTube).await;
        h.probe.script(
            "C",
            vec![
                youtube::parse(live_page),
                youtube::parse(consent_wall),
                youtube::parse(consent_wall),
            ],
        );

        h.scheduler.run_cycle().await;
        for _ in 0..2 {
            let report = h.scheduler.run_cycle().await;
            assert_eq!(report.probe_failures, 1);
            let state = h.store.get_channel(ch.id).await.unwrap().state;
            assert_eq!(state, ChannelState::live("Intro"));
            assert!(!state.pending_offline);
        }

        let sent = h.sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("**Intro**"));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let h = harness(SchedulerSettings::default());
        add(&h.store, "C", Platform::YouTube).await;
        h.probe.script("C", vec![live("t")]);

        let (tx, rx) = watch::channel(false);
        let sink = h.sink.clone();
        let scheduler = Arc::new(h.scheduler);
        let runner = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(Duration::from_millis(20), rx).await })
        };

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while sink.sent().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sink.sent().len(), 1);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), runner)
            .await
            .unwrap()
            .unwrap();
    }
}
