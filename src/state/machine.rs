//! Debounced live-status state machine.
//!
//! ## State Machine
//!
//! ```text
//!                 live                      offline
//!  ┌─────────┐ ──────────► ┌──────────┐ ───────────► ┌──────────────────┐
//!  │ Offline │  GO_LIVE    │   Live   │   (debounce)  │ LiveReadyToClose │
//!  └─────────┘             └──────────┘ ◄─────────── └────────┬─────────┘
//!       ▲                                  live (flicker)      │
//!       │                     offline, STREAM_ENDED            │
//!       └──────────────────────────────────────────────────────┘
//! ```
//!
//! `LiveReadyToClose` is persisted as `Live` with `pending_offline = true`.
//! Ending a broadcast takes two consecutive offline readings, so a single
//! dropped probe never produces a false "stream ended" event. A go-live
//! event only fires on the Offline -> Live edge, so repeated live readings
//! are idempotent.
//!
//! A failed probe never reaches this module: no reading means no step.

use super::channel::{ChannelState, LiveState};

/// One observation from a live-status probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveReading {
    pub is_live: bool,
    pub title: String,
}

impl LiveReading {
    pub fn live(title: impl Into<String>) -> Self {
        Self {
            is_live: true,
            title: title.into(),
        }
    }

    pub fn offline() -> Self {
        Self {
            is_live: false,
            title: String::new(),
        }
    }
}

/// Notification decision produced alongside a state step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to announce.
    None,
    /// The channel just went live with this title.
    GoLive { title: String },
    /// A second consecutive offline reading confirmed the end.
    StreamEnded,
}

/// What happened on a step, for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Offline and still offline.
    Idle,
    GoLive,
    /// Live and still live (title may have refreshed).
    Steady,
    /// First offline reading while live; end not yet confirmed.
    Debounce,
    /// Live reading cleared a pending offline.
    FlickerAbsorbed,
    StreamEnded,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::GoLive => "go_live",
            Self::Steady => "steady",
            Self::Debounce => "debounce",
            Self::FlickerAbsorbed => "flicker",
            Self::StreamEnded => "stream_ended",
        }
    }
}

/// Result of feeding one reading through the engine.
///
/// The next state and the decision are produced together; callers persist
/// `next` first and only then act on `decision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ChannelState,
    pub decision: Decision,
    pub kind: StepKind,
}

impl Transition {
    /// Whether the persisted state must be written.
    pub fn changes(&self, current: &ChannelState) -> bool {
        self.next != *current
    }
}

/// Stateless transition engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionEngine;

impl TransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the next state and notification decision.
    pub fn step(&self, current: &ChannelState, reading: &LiveReading) -> Transition {
        match (current.live, current.pending_offline, reading.is_live) {
            // Pending is meaningless while offline and is ignored.
            (LiveState::Offline, _, false) => Transition {
                next: ChannelState::offline(),
                decision: Decision::None,
                kind: StepKind::Idle,
            },
            (LiveState::Offline, _, true) => Transition {
                next: ChannelState::live(reading.title.clone()),
                decision: Decision::GoLive {
                    title: reading.title.clone(),
                },
                kind: StepKind::GoLive,
            },
            (LiveState::Live, false, true) => Transition {
                next: ChannelState::live(reading.title.clone()),
                decision: Decision::None,
                kind: StepKind::Steady,
            },
            (LiveState::Live, false, false) => Transition {
                next: ChannelState {
                    live: LiveState::Live,
                    last_title: current.last_title.clone(),
                    pending_offline: true,
                },
                decision: Decision::None,
                kind: StepKind::Debounce,
            },
            (LiveState::Live, true, true) => Transition {
                next: ChannelState::live(reading.title.clone()),
                decision: Decision::None,
                kind: StepKind::FlickerAbsorbed,
            },
            (LiveState::Live, true, false) => Transition {
                next: ChannelState::offline(),
                decision: Decision::StreamEnded,
                kind: StepKind::StreamEnded,
            },
        }
    }
}
