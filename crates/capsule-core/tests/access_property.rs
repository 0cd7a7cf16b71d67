//! Property tests for the access predicate.

use capsule_core::{AccessController, AccessState};
use chrono::{DateTime, Utc};
use proptest::prelude::*;

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).expect("timestamp in range")
}

proptest! {
    #[test]
    fn locked_iff_now_precedes_unlock(now in -4_000_000_000i64..4_000_000_000, unlock in -4_000_000_000i64..4_000_000_000) {
        let resolved = AccessController::resolve(ts(now), ts(unlock));
        if now < unlock {
            prop_assert_eq!(resolved, AccessState::Locked);
        } else {
            prop_assert_eq!(resolved, AccessState::Unlocked);
        }
    }

    #[test]
    fn unlocked_is_monotonic_in_now(now in -4_000_000_000i64..3_000_000_000, unlock in -4_000_000_000i64..3_000_000_000, ahead in 0i64..1_000_000_000) {
        // Once unlocked, moving time forward never re-locks.
        if AccessController::resolve(ts(now), ts(unlock)) == AccessState::Unlocked {
            prop_assert_eq!(
                AccessController::resolve(ts(now + ahead), ts(unlock)),
                AccessState::Unlocked
            );
        }
    }

    #[test]
    fn remaining_is_zero_exactly_when_unlocked(now in -4_000_000_000i64..4_000_000_000, unlock in -4_000_000_000i64..4_000_000_000) {
        let remaining = AccessController::remaining_ms(ts(now), ts(unlock));
        let unlocked = AccessController::resolve(ts(now), ts(unlock)) == AccessState::Unlocked;
        prop_assert_eq!(remaining == 0, unlocked);
    }
}

#[test]
fn boundary_instant_is_unlocked() {
    let unlock = ts(1_700_000_000);
    assert_eq!(
        AccessController::resolve(unlock, unlock),
        AccessState::Unlocked
    );
}
