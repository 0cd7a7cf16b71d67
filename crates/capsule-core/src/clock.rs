//! Clock abstraction.
//!
//! Every timing decision in this crate takes an explicit `now` so the
//! state machines stay deterministic under test. Hosts drive sessions
//! with `SystemClock`; tests advance a `ManualClock` by hand. No
//! component spawns its own timer thread -- the caller schedules the
//! periodic tick (roughly 1 Hz for countdown display, see
//! `RevealConfig::countdown_tick_ms`).

use std::cell::Cell;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually-advanced clock for tests and simulation.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock forward. Time never goes backward within a session.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
