//! Reveal session state machine.
//!
//! One session per detail view, created when the viewer lands on a
//! capsule and disposed on navigation away. Every asynchronous source
//! (clock tick, asset load, user tap, motion sample) funnels into the
//! session's methods, so all state mutation is serialized through one
//! place instead of racing closures.
//!
//! ## Phases
//!
//! ```text
//! Searching -> Idle(locked|unlocked) -> Opening -> Revealed
//!      \------------ dispose() ------------/ -> Terminated
//! ```
//!
//! Searching ends only when the asset outcome AND the minimum dwell
//! have both arrived, in either order. Opening starts on a tap while
//! unlocked; Revealed fires exactly once, when the animation
//! completes. A disposed session absorbs every late callback as a
//! no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::animation::{AnimationSequencer, AnimationSignal, PlaybackHandle};
use crate::access::{AccessController, AccessState};
use crate::capsule::SealedItem;
use crate::config::RevealConfig;
use crate::events::Event;
use crate::motion::{MotionSmoother, OrientationSample};

/// Reveal phase. Tagged so illegal combinations (opening while still
/// locked) cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Searching,
    Idle(AccessState),
    Opening,
    Revealed,
    /// Session disposed; every input is a no-op.
    Terminated,
}

/// Result of the host's asset load, fed back into the session.
#[derive(Debug, Clone)]
pub enum AssetOutcome {
    Ready,
    Failed { reason: String },
}

/// Ephemeral per-view reveal state. Owned exclusively by the view
/// that created it; never shared across sessions.
#[derive(Debug)]
pub struct RevealSession {
    capsule_id: Uuid,
    unlock_at: DateTime<Utc>,
    phase: Phase,
    created_at: DateTime<Utc>,
    dwell_deadline: DateTime<Utc>,
    asset_ready: bool,
    asset_fallback: bool,
    min_dwell_elapsed: bool,
    has_completed_once: bool,
    smoother: MotionSmoother,
    sequencer: AnimationSequencer,
    playback: Option<PlaybackHandle>,
    config: RevealConfig,
}

impl RevealSession {
    /// Create a session in the Searching phase. Returns the session
    /// and its `SearchStarted` event.
    pub fn new(item: &SealedItem, config: &RevealConfig, now: DateTime<Utc>) -> (Self, Event) {
        let session = Self {
            capsule_id: item.id,
            unlock_at: item.unlock_at(),
            phase: Phase::Searching,
            created_at: now,
            dwell_deadline: now + chrono::Duration::milliseconds(config.min_dwell_ms as i64),
            asset_ready: false,
            asset_fallback: false,
            min_dwell_elapsed: false,
            has_completed_once: false,
            smoother: MotionSmoother::new(config.smoothing.search),
            sequencer: AnimationSequencer::new(),
            playback: None,
            config: config.clone(),
        };
        let started = Event::SearchStarted {
            capsule_id: item.id,
            at: now,
        };
        (session, started)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn capsule_id(&self) -> Uuid {
        self.capsule_id
    }

    /// Smoothed camera orientation for the host's viewport transform.
    pub fn orientation(&self) -> OrientationSample {
        self.smoother.orientation()
    }

    /// True when the asset failed and the default representation is
    /// in use.
    pub fn asset_fallback(&self) -> bool {
        self.asset_fallback
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == Phase::Terminated
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Periodic clock tick. Drives the dwell deadline, the countdown
    /// while locked, the unlock transition, and animation playback.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        match self.phase {
            Phase::Terminated | Phase::Revealed => {}
            Phase::Searching => {
                if !self.min_dwell_elapsed && now >= self.dwell_deadline {
                    self.min_dwell_elapsed = true;
                }
                self.try_end_search(now, &mut events);
            }
            Phase::Idle(AccessState::Locked) => {
                // Re-resolve only while locked; the first Unlocked
                // observation ends the polling for this session.
                match AccessController::resolve(now, self.unlock_at) {
                    AccessState::Unlocked => {
                        self.phase = Phase::Idle(AccessState::Unlocked);
                        events.push(Event::UnlockReached { at: now });
                    }
                    AccessState::Locked => {
                        events.push(Event::CountdownUpdated {
                            remaining_ms: AccessController::remaining_ms(now, self.unlock_at),
                            at: now,
                        });
                    }
                }
            }
            Phase::Idle(AccessState::Unlocked) => {}
            Phase::Opening => {
                for signal in self.sequencer.poll(now) {
                    match signal {
                        AnimationSignal::MidpointReached => {
                            events.push(Event::AnimationMidpoint { at: now });
                        }
                        AnimationSignal::Completed => {
                            self.complete_opening(now, &mut events);
                        }
                    }
                }
            }
        }
        events
    }

    /// Asset load outcome from the host. A failure degrades to the
    /// fallback representation and still counts as ready, so the
    /// reveal is never permanently blocked by a missing asset.
    pub fn asset_loaded(&mut self, outcome: AssetOutcome, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        if self.phase == Phase::Terminated || self.asset_ready {
            // Late or duplicate delivery; absorb.
            return events;
        }
        if let AssetOutcome::Failed { reason } = outcome {
            self.asset_fallback = true;
            events.push(Event::AssetFallback { reason, at: now });
        }
        self.asset_ready = true;
        self.try_end_search(now, &mut events);
        events
    }

    /// User tap. While locked this is feedback, not an error; while
    /// unlocked it starts the opening animation.
    pub fn tap(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        match self.phase {
            Phase::Idle(AccessState::Locked) => {
                vec![Event::TapWhileLocked {
                    remaining_ms: AccessController::remaining_ms(now, self.unlock_at),
                    at: now,
                }]
            }
            Phase::Idle(AccessState::Unlocked) => {
                self.phase = Phase::Opening;
                self.smoother.set_profile(self.config.smoothing.settle);
                let handle = self.sequencer.play(
                    self.config.animation.clip(),
                    self.config.animation.open_speed,
                    now,
                );
                self.playback = Some(handle);
                vec![Event::OpeningStarted { at: now }]
            }
            // Taps during searching, opening, or after reveal do nothing.
            _ => Vec::new(),
        }
    }

    /// Raw orientation sample from the motion sensor. The first sample
    /// of the session calibrates the smoother.
    pub fn motion_sample(&mut self, sample: OrientationSample) -> Option<OrientationSample> {
        if self.phase == Phase::Terminated {
            return None;
        }
        Some(self.smoother.update(sample))
    }

    /// Tear down the session. Pending playback is cancelled and every
    /// later input -- a queued asset callback, a stray tick -- is
    /// absorbed without mutating anything.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.playback.take() {
            self.sequencer.cancel(handle);
        }
        self.phase = Phase::Terminated;
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The Searching -> Idle rendezvous. Fires exactly once, when both
    /// readiness sources report true, whichever arrived last.
    fn try_end_search(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        if self.phase != Phase::Searching {
            return;
        }
        if !(self.asset_ready && self.min_dwell_elapsed) {
            return;
        }
        let access = AccessController::resolve(now, self.unlock_at);
        self.phase = Phase::Idle(access);
        let waited_ms = (now - self.created_at).num_milliseconds().max(0) as u64;
        events.push(Event::SearchEnded {
            access,
            waited_ms,
            at: now,
        });
    }

    fn complete_opening(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        // Duplicate completion (timer/event race in the playback
        // mechanism) is absorbed here as well as in the sequencer.
        if self.has_completed_once {
            return;
        }
        self.has_completed_once = true;
        self.phase = Phase::Revealed;
        events.push(Event::Revealed { at: now });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::OwnerRole;
    use chrono::Duration;

    fn unlocked_item(now: DateTime<Utc>) -> SealedItem {
        SealedItem::new(
            "m".into(),
            now - Duration::minutes(1),
            OwnerRole::Receiver,
            None,
        )
    }

    fn locked_item(now: DateTime<Utc>, in_ms: i64) -> SealedItem {
        SealedItem::new(
            "m".into(),
            now + Duration::milliseconds(in_ms),
            OwnerRole::Receiver,
            None,
        )
    }

    fn session(item: &SealedItem, now: DateTime<Utc>) -> RevealSession {
        let (session, _) = RevealSession::new(item, &RevealConfig::default(), now);
        session
    }

    fn at(start: DateTime<Utc>, ms: i64) -> DateTime<Utc> {
        start + Duration::milliseconds(ms)
    }

    #[test]
    fn search_waits_for_dwell_when_asset_is_fast() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);

        // Asset at 500ms; dwell is 2000ms.
        assert!(s.asset_loaded(AssetOutcome::Ready, at(now, 500)).is_empty());
        assert_eq!(s.phase(), Phase::Searching);
        assert!(s.tick(at(now, 1999)).is_empty());

        let events = s.tick(at(now, 2000));
        assert!(matches!(
            events.as_slice(),
            [Event::SearchEnded { waited_ms: 2000, .. }]
        ));
        assert_eq!(s.phase(), Phase::Idle(AccessState::Unlocked));
    }

    #[test]
    fn search_waits_for_asset_when_dwell_is_fast() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);

        assert!(s.tick(at(now, 2000)).is_empty());
        assert!(s.tick(at(now, 4000)).is_empty());

        let events = s.asset_loaded(AssetOutcome::Ready, at(now, 5000));
        assert!(matches!(
            events.as_slice(),
            [Event::SearchEnded { waited_ms: 5000, .. }]
        ));

        // Further ticks and duplicate deliveries change nothing.
        assert!(s.asset_loaded(AssetOutcome::Ready, at(now, 5100)).is_empty());
        assert_eq!(s.phase(), Phase::Idle(AccessState::Unlocked));
    }

    #[test]
    fn asset_failure_degrades_but_never_blocks() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);

        let events = s.asset_loaded(
            AssetOutcome::Failed {
                reason: "boom".into(),
            },
            at(now, 100),
        );
        assert!(matches!(events.as_slice(), [Event::AssetFallback { .. }]));
        assert!(s.asset_fallback());

        let events = s.tick(at(now, 2000));
        assert!(matches!(events.as_slice(), [Event::SearchEnded { .. }]));
    }

    #[test]
    fn locked_tap_feeds_back_without_state_change() {
        let now = Utc::now();
        let mut s = session(&locked_item(now, 60_000), now);
        s.asset_loaded(AssetOutcome::Ready, now);
        s.tick(at(now, 2000));
        assert_eq!(s.phase(), Phase::Idle(AccessState::Locked));

        let events = s.tap(at(now, 3000));
        assert!(matches!(events.as_slice(), [Event::TapWhileLocked { .. }]));
        assert_eq!(s.phase(), Phase::Idle(AccessState::Locked));
    }

    #[test]
    fn countdown_ticks_then_unlock_fires_once() {
        let now = Utc::now();
        let mut s = session(&locked_item(now, 5000), now);
        s.asset_loaded(AssetOutcome::Ready, now);
        s.tick(at(now, 2000));

        let events = s.tick(at(now, 3000));
        assert!(matches!(
            events.as_slice(),
            [Event::CountdownUpdated { remaining_ms: 2000, .. }]
        ));

        let events = s.tick(at(now, 5000));
        assert!(matches!(events.as_slice(), [Event::UnlockReached { .. }]));
        assert_eq!(s.phase(), Phase::Idle(AccessState::Unlocked));

        // Unlocked is monotonic: no more countdown or unlock events.
        assert!(s.tick(at(now, 6000)).is_empty());
    }

    #[test]
    fn full_reveal_fires_exactly_once() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);
        s.asset_loaded(AssetOutcome::Ready, now);
        s.tick(at(now, 2000));

        let events = s.tap(at(now, 2500));
        assert!(matches!(events.as_slice(), [Event::OpeningStarted { .. }]));
        assert_eq!(s.phase(), Phase::Opening);

        // Defaults: midpoint at +450ms, completion at +1050ms.
        let events = s.tick(at(now, 2950));
        assert!(matches!(events.as_slice(), [Event::AnimationMidpoint { .. }]));

        let events = s.tick(at(now, 3550));
        assert!(matches!(events.as_slice(), [Event::Revealed { .. }]));
        assert_eq!(s.phase(), Phase::Revealed);

        // Late ticks and taps after the terminal transition are no-ops.
        assert!(s.tick(at(now, 4000)).is_empty());
        assert!(s.tap(at(now, 4000)).is_empty());
    }

    #[test]
    fn tap_during_searching_is_ignored() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);
        assert!(s.tap(at(now, 100)).is_empty());
        assert_eq!(s.phase(), Phase::Searching);
    }

    #[test]
    fn disposed_session_absorbs_queued_callbacks() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);

        s.dispose();
        assert!(s.is_disposed());

        // A callback queued before disposal runs afterward: no events,
        // no mutation, no panic.
        assert!(s.asset_loaded(AssetOutcome::Ready, at(now, 500)).is_empty());
        assert!(s.tick(at(now, 2000)).is_empty());
        assert!(s.tap(at(now, 2500)).is_empty());
        assert!(s
            .motion_sample(OrientationSample {
                beta: 1.0,
                gamma: 1.0
            })
            .is_none());
        assert_eq!(s.phase(), Phase::Terminated);
    }

    #[test]
    fn dispose_mid_opening_suppresses_animation() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);
        s.asset_loaded(AssetOutcome::Ready, now);
        s.tick(at(now, 2000));
        s.tap(at(now, 2000));
        assert_eq!(s.phase(), Phase::Opening);

        s.dispose();
        assert!(s.tick(at(now, 10_000)).is_empty());
        assert_eq!(s.phase(), Phase::Terminated);
    }

    #[test]
    fn motion_samples_calibrate_then_smooth() {
        let now = Utc::now();
        let mut s = session(&unlocked_item(now), now);

        let first = s
            .motion_sample(OrientationSample {
                beta: 10.0,
                gamma: 5.0,
            })
            .unwrap();
        assert_eq!(first, OrientationSample::ZERO);

        let second = s
            .motion_sample(OrientationSample {
                beta: 12.0,
                gamma: 5.0,
            })
            .unwrap();
        assert!(second.beta > 0.0);
        assert_eq!(second.gamma, 0.0);
    }
}
