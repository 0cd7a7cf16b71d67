//! # Capsule Core Library
//!
//! Core logic for Capsule, a time-locked message application: a
//! sender seals a message (optionally with media) behind a future
//! timestamp, and the receiver walks through an interactive reveal
//! sequence once the unlock time has passed.
//!
//! ## Architecture
//!
//! Everything is single-threaded and caller-driven: no component owns
//! a timer thread. The host schedules a periodic tick and funnels
//! every asynchronous source (clock, asset load, user tap, motion
//! samples) into one `RevealSession` per view.
//!
//! ## Key Components
//!
//! - [`AccessController`]: pure Locked/Unlocked predicate plus the
//!   at-most-once viewed-flag side effect
//! - [`RevealSession`]: the Searching -> Idle -> Opening -> Revealed
//!   state machine
//! - [`AnimationSequencer`]: one-shot opening animation with midpoint
//!   and completion signals
//! - [`MotionSmoother`]: calibrated, damped orientation smoothing for
//!   camera framing
//! - [`RevealConfig`]: TOML-backed tuning (dwell, clip timings,
//!   smoothing profiles)

pub mod access;
pub mod capsule;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod motion;
pub mod reveal;
pub mod store;

pub use access::{AccessController, AccessState, MarkOutcome};
pub use capsule::{OwnerRole, SealedItem};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AnimationConfig, RevealConfig, SmoothingConfig};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use motion::{MotionSmoother, OrientationSample, SmoothingProfile};
pub use reveal::{AnimationClip, AnimationSequencer, AssetOutcome, Phase, RevealSession};
pub use store::{CapsuleStore, JsonStore, MemoryStore};
