//! Temporal access control.
//!
//! Whether a capsule may be opened is a pure function of the current
//! time and the unlock timestamp. The one side effect in this module,
//! `mark_viewed`, is best-effort bookkeeping: a store failure is
//! logged and swallowed, never rolled back -- the viewing already
//! happened, and the flag is not access control itself.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::capsule::{OwnerRole, SealedItem};
use crate::store::CapsuleStore;

/// Derived access state. Never persisted.
///
/// Monotonic within a session: time does not go backward, so once a
/// capsule resolves Unlocked it never resolves Locked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    Locked,
    Unlocked,
}

/// Outcome of a mark-viewed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The viewed flag was recorded.
    Marked,
    /// Already marked earlier; nothing to do.
    AlreadyViewed,
    /// The capsule is still locked.
    StillLocked,
    /// Senders never mark their own capsule viewed.
    NotReceiver,
}

pub struct AccessController;

impl AccessController {
    /// Pure, total access predicate. The boundary `now == unlock_at`
    /// is Unlocked.
    pub fn resolve(now: DateTime<Utc>, unlock_at: DateTime<Utc>) -> AccessState {
        if now >= unlock_at {
            AccessState::Unlocked
        } else {
            AccessState::Locked
        }
    }

    /// Time left until unlock, clamped to zero.
    pub fn remaining(now: DateTime<Utc>, unlock_at: DateTime<Utc>) -> Duration {
        std::cmp::max(unlock_at - now, Duration::zero())
    }

    /// Like `remaining`, in milliseconds, for countdown display.
    pub fn remaining_ms(now: DateTime<Utc>, unlock_at: DateTime<Utc>) -> u64 {
        Self::remaining(now, unlock_at).num_milliseconds().max(0) as u64
    }

    /// Record that the receiver viewed the capsule. At most once per
    /// item, and only while Unlocked.
    ///
    /// The local item is updated even if the store write fails; the
    /// failure is logged and swallowed.
    pub fn mark_viewed(
        store: &mut dyn CapsuleStore,
        item: &mut SealedItem,
        now: DateTime<Utc>,
    ) -> MarkOutcome {
        if Self::resolve(now, item.unlock_at()) != AccessState::Unlocked {
            return MarkOutcome::StillLocked;
        }
        if item.owner_role != OwnerRole::Receiver {
            return MarkOutcome::NotReceiver;
        }
        if item.viewed {
            return MarkOutcome::AlreadyViewed;
        }
        if let Err(e) = store.mark_viewed(item.id, now) {
            eprintln!("Warning: failed to persist viewed flag for {}: {e}", item.id);
        }
        item.record_viewed(now);
        MarkOutcome::Marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn receiver_item(unlock_at: DateTime<Utc>) -> SealedItem {
        SealedItem::new("m".into(), unlock_at, OwnerRole::Receiver, None)
    }

    #[test]
    fn resolve_before_unlock_is_locked() {
        let unlock = Utc::now();
        assert_eq!(
            AccessController::resolve(unlock - Duration::milliseconds(1), unlock),
            AccessState::Locked
        );
    }

    #[test]
    fn resolve_boundary_is_unlocked() {
        let unlock = Utc::now();
        assert_eq!(
            AccessController::resolve(unlock, unlock),
            AccessState::Unlocked
        );
        assert_eq!(
            AccessController::resolve(unlock + Duration::milliseconds(1), unlock),
            AccessState::Unlocked
        );
    }

    #[test]
    fn remaining_clamps_to_zero() {
        let unlock = Utc::now();
        assert_eq!(
            AccessController::remaining_ms(unlock + Duration::seconds(5), unlock),
            0
        );
        assert_eq!(
            AccessController::remaining_ms(unlock - Duration::seconds(2), unlock),
            2000
        );
    }

    #[test]
    fn test_mark_viewed_at_most_once() {
        let unlock = Utc::now() - Duration::minutes(1);
        let mut item = receiver_item(unlock);
        let mut store = MemoryStore::new();
        store.insert(item.clone()).unwrap();

        let now = Utc::now();
        assert_eq!(
            AccessController::mark_viewed(&mut store, &mut item, now),
            MarkOutcome::Marked
        );
        assert_eq!(
            AccessController::mark_viewed(&mut store, &mut item, now),
            MarkOutcome::AlreadyViewed
        );
        assert_eq!(store.mark_viewed_calls, 1);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_mark_viewed_requires_unlock() {
        let mut item = receiver_item(Utc::now() + Duration::hours(1));
        let mut store = MemoryStore::new();
        store.insert(item.clone()).unwrap();

        assert_eq!(
            AccessController::mark_viewed(&mut store, &mut item, Utc::now()),
            MarkOutcome::StillLocked
        );
        assert_eq!(store.mark_viewed_calls, 0);
        assert!(!item.viewed);
    }

    #[test]
    fn test_mark_viewed_skips_sender() {
        let mut item = SealedItem::new(
            "m".into(),
            Utc::now() - Duration::minutes(1),
            OwnerRole::Sender,
            None,
        );
        let mut store = MemoryStore::new();
        store.insert(item.clone()).unwrap();

        assert_eq!(
            AccessController::mark_viewed(&mut store, &mut item, Utc::now()),
            MarkOutcome::NotReceiver
        );
        assert!(!item.viewed);
    }

    #[test]
    fn test_mark_viewed_swallows_store_failure() {
        let unlock = Utc::now() - Duration::minutes(1);
        let mut item = receiver_item(unlock);
        let mut store = MemoryStore::new();
        store.insert(item.clone()).unwrap();
        store.fail_mark_viewed = true;

        // The store write fails, but the local item still flips: the
        // viewing already happened and the UI does not roll back.
        assert_eq!(
            AccessController::mark_viewed(&mut store, &mut item, Utc::now()),
            MarkOutcome::Marked
        );
        assert!(item.viewed);
        assert!(item.viewed_at.is_some());
    }
}
