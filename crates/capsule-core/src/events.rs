use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessState;

/// Every observable step of a reveal session produces an Event.
/// The host polls the session and renders from these; the CLI prints
/// them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A session was created and entered the searching phase.
    SearchStarted {
        capsule_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Searching ended: the asset and the minimum dwell both arrived.
    SearchEnded {
        access: AccessState,
        waited_ms: u64,
        at: DateTime<Utc>,
    },
    /// Periodic countdown refresh while the capsule is still locked.
    CountdownUpdated {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The unlock timestamp passed while the session was open.
    UnlockReached {
        at: DateTime<Utc>,
    },
    /// Tap on a locked capsule: transient feedback, no state change.
    TapWhileLocked {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The asset failed to load; a fallback representation is used
    /// and the reveal sequence continues.
    AssetFallback {
        reason: String,
        at: DateTime<Utc>,
    },
    /// Tap on an unlocked capsule started the opening animation.
    OpeningStarted {
        at: DateTime<Utc>,
    },
    /// The opening animation reached its held pose.
    AnimationMidpoint {
        at: DateTime<Utc>,
    },
    /// Terminal: content may be shown. Fired once per session.
    Revealed {
        at: DateTime<Utc>,
    },
    /// The viewed flag was recorded for the receiver.
    ViewedMarked {
        capsule_id: Uuid,
        at: DateTime<Utc>,
    },
}
