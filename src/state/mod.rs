//! Channel model and the live-status transition engine.

mod channel;
pub mod machine;

pub use channel::{Channel, ChannelState, LiveState, MentionMode, Platform, UnknownPlatform};
pub use machine::{Decision, LiveReading, StepKind, Transition, TransitionEngine};
