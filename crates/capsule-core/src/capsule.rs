//! Sealed capsule data model.
//!
//! A `SealedItem` is the record a sender leaves behind: a message
//! (plus an optional media reference) that the receiver may not open
//! until `unlock_at` has passed. The lock is a plain timestamp
//! comparison, not a security mechanism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Role of the current viewer relative to a capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerRole {
    Sender,
    Receiver,
}

/// A record whose content is access-gated by a future timestamp.
///
/// `unlock_at` is immutable after creation (no mutator exists). The
/// viewed flag is set exactly once, only by the receiving party, only
/// after unlock -- see `AccessController::mark_viewed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedItem {
    pub id: Uuid,
    unlock_at: DateTime<Utc>,
    pub viewed: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    pub owner_role: OwnerRole,
    /// Reference to the attached media, if any.
    pub asset_ref: Option<String>,
    pub message: String,
    pub sealed_at: DateTime<Utc>,
}

impl SealedItem {
    pub fn new(
        message: String,
        unlock_at: DateTime<Utc>,
        owner_role: OwnerRole,
        asset_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            unlock_at,
            viewed: false,
            viewed_at: None,
            owner_role,
            asset_ref,
            message,
            sealed_at: Utc::now(),
        }
    }

    pub fn unlock_at(&self) -> DateTime<Utc> {
        self.unlock_at
    }

    /// Record that the receiver viewed the capsule. Idempotent: the
    /// first call wins, later calls are ignored.
    pub fn record_viewed(&mut self, at: DateTime<Utc>) {
        if self.viewed {
            return;
        }
        self.viewed = true;
        self.viewed_at = Some(at);
    }

    /// Check the viewed/unlock invariant:
    /// `viewed == true` implies `viewed_at` is set and `>= unlock_at`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.viewed {
            match self.viewed_at {
                None => return Err(ValidationError::ViewedWithoutTimestamp),
                Some(viewed_at) if viewed_at < self.unlock_at => {
                    return Err(ValidationError::ViewedBeforeUnlock {
                        viewed_at,
                        unlock_at: self.unlock_at,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(unlock_at: DateTime<Utc>) -> SealedItem {
        SealedItem::new("hi".into(), unlock_at, OwnerRole::Receiver, None)
    }

    #[test]
    fn new_item_is_unviewed_and_valid() {
        let it = item(Utc::now() + Duration::hours(1));
        assert!(!it.viewed);
        assert!(it.viewed_at.is_none());
        assert!(it.validate().is_ok());
    }

    #[test]
    fn record_viewed_is_idempotent() {
        let unlock = Utc::now();
        let mut it = item(unlock);
        let first = unlock + Duration::seconds(5);
        it.record_viewed(first);
        it.record_viewed(first + Duration::seconds(30));
        assert!(it.viewed);
        assert_eq!(it.viewed_at, Some(first));
        assert!(it.validate().is_ok());
    }

    #[test]
    fn validate_rejects_viewed_before_unlock() {
        let unlock = Utc::now();
        let mut it = item(unlock);
        it.viewed = true;
        it.viewed_at = Some(unlock - Duration::seconds(1));
        assert!(matches!(
            it.validate(),
            Err(ValidationError::ViewedBeforeUnlock { .. })
        ));
    }

    #[test]
    fn validate_rejects_viewed_without_timestamp() {
        let mut it = item(Utc::now());
        it.viewed = true;
        assert!(matches!(
            it.validate(),
            Err(ValidationError::ViewedWithoutTimestamp)
        ));
    }
}
