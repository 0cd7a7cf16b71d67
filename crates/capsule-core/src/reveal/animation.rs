//! One-shot opening animation sequencer.
//!
//! The sequencer owns no timers. `play` computes the two deadlines up
//! front and `poll(now)` delivers whichever signals have come due,
//! each at most once:
//!
//! - `MidpointReached` at `start + duration * midpoint_fraction / speed`
//!   (the held pose),
//! - `Completed` at `midpoint + hold_duration`.
//!
//! `Completed` is never delivered before `MidpointReached`, for any
//! speed value, because completion is defined relative to the midpoint
//! time. Cancellation drops the playback entirely, so neither signal
//! can fire afterward even if a poll was already queued.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A one-shot clip description. Timings come from `AnimationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub duration_ms: u64,
    /// Fraction of the clip at which the held pose is reached.
    pub midpoint_fraction: f64,
    /// How long the pose is held before completion, not speed-scaled.
    pub hold_duration_ms: u64,
}

/// Identifies one `play` call. Handles from an earlier playback are
/// stale and ignored by `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSignal {
    MidpointReached,
    Completed,
}

#[derive(Debug, Clone)]
struct Playback {
    handle: PlaybackHandle,
    midpoint_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    midpoint_fired: bool,
    completed_fired: bool,
}

/// Plays one clip at a time, poll-driven.
#[derive(Debug, Default)]
pub struct AnimationSequencer {
    playback: Option<Playback>,
    next_handle: u64,
}

impl AnimationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a playback. Duration scales inversely with `speed`;
    /// non-positive or non-finite speeds are clamped to 1.0. A second
    /// `play` replaces the first, staling its handle.
    pub fn play(&mut self, clip: AnimationClip, speed: f64, now: DateTime<Utc>) -> PlaybackHandle {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        let midpoint_ms =
            (clip.duration_ms as f64 * clip.midpoint_fraction / speed).round().max(0.0) as i64;
        let midpoint_at = now + Duration::milliseconds(midpoint_ms);
        let completed_at = midpoint_at + Duration::milliseconds(clip.hold_duration_ms as i64);

        self.next_handle += 1;
        let handle = PlaybackHandle(self.next_handle);
        self.playback = Some(Playback {
            handle,
            midpoint_at,
            completed_at,
            midpoint_fired: false,
            completed_fired: false,
        });
        handle
    }

    /// Collect the signals that are due. Each fires at most once; a
    /// large time jump delivers both, in order, from a single poll.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<AnimationSignal> {
        let mut due = Vec::new();
        if let Some(pb) = self.playback.as_mut() {
            if !pb.midpoint_fired && now >= pb.midpoint_at {
                pb.midpoint_fired = true;
                due.push(AnimationSignal::MidpointReached);
            }
            if pb.midpoint_fired && !pb.completed_fired && now >= pb.completed_at {
                pb.completed_fired = true;
                due.push(AnimationSignal::Completed);
            }
        }
        due
    }

    /// Suppress every unfired signal of `handle`. Stale handles are
    /// ignored so cancelling an old playback cannot kill the current
    /// one.
    pub fn cancel(&mut self, handle: PlaybackHandle) {
        if self.playback.as_ref().map(|p| p.handle) == Some(handle) {
            self.playback = None;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .map(|p| !p.completed_fired)
            .unwrap_or(false)
    }

    pub fn current_handle(&self) -> Option<PlaybackHandle> {
        self.playback.as_ref().map(|p| p.handle)
    }
}
