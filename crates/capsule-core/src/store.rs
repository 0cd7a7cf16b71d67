//! Capsule storage.
//!
//! The reveal core only reads a capsule and flips its viewed flag;
//! everything else about persistence belongs to the host. `JsonStore`
//! is the minimal file-backed implementation the CLI runs against
//! (`~/.config/capsule/capsules.json`), and `MemoryStore` backs tests.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::capsule::SealedItem;
use crate::config::data_dir;
use crate::error::StoreError;

/// Host-side capsule storage, as seen by the reveal core.
pub trait CapsuleStore {
    fn fetch(&self, id: Uuid) -> Result<SealedItem, StoreError>;
    fn insert(&mut self, item: SealedItem) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<SealedItem>, StoreError>;
    /// Persist the viewed flag. At-most-once semantics are enforced
    /// by `AccessController::mark_viewed`, not here.
    fn mark_viewed(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<Uuid, SealedItem>,
    /// Number of mark_viewed calls that reached the store.
    pub mark_viewed_calls: u32,
    /// When set, mark_viewed fails with an IO error.
    pub fail_mark_viewed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapsuleStore for MemoryStore {
    fn fetch(&self, id: Uuid) -> Result<SealedItem, StoreError> {
        self.items.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn insert(&mut self, item: SealedItem) -> Result<(), StoreError> {
        self.items.insert(item.id, item);
        Ok(())
    }

    fn list(&self) -> Result<Vec<SealedItem>, StoreError> {
        let mut items: Vec<_> = self.items.values().cloned().collect();
        items.sort_by_key(|i| i.sealed_at);
        Ok(items)
    }

    fn mark_viewed(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.mark_viewed_calls += 1;
        if self.fail_mark_viewed {
            return Err(StoreError::Io(std::io::Error::other(
                "injected mark_viewed failure",
            )));
        }
        let item = self.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.record_viewed(at);
        Ok(())
    }
}

/// JSON-file-backed store used by the CLI.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    items: HashMap<Uuid, SealedItem>,
}

impl JsonStore {
    /// Open (or create) the store at the default data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(StoreError::Io)?;
        Self::open(dir.join("capsules.json"))
    }

    /// Open (or create) the store at `path`.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self {
                path,
                items: HashMap::new(),
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| StoreError::ReadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let list: Vec<SealedItem> = serde_json::from_str(&raw)?;
        let items = list.into_iter().map(|i| (i.id, i)).collect();
        Ok(Self { path, items })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let mut list: Vec<_> = self.items.values().cloned().collect();
        list.sort_by_key(|i| i.sealed_at);
        let json = serde_json::to_string_pretty(&list)?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl CapsuleStore for JsonStore {
    fn fetch(&self, id: Uuid) -> Result<SealedItem, StoreError> {
        self.items.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn insert(&mut self, item: SealedItem) -> Result<(), StoreError> {
        self.items.insert(item.id, item);
        self.persist()
    }

    fn list(&self) -> Result<Vec<SealedItem>, StoreError> {
        let mut items: Vec<_> = self.items.values().cloned().collect();
        items.sort_by_key(|i| i.sealed_at);
        Ok(items)
    }

    fn mark_viewed(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let item = self.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        item.record_viewed(at);
        self.persist()
    }
}
