//! # Pupil Store Trait & In-Memory Backend
//!
//! `PupilStore` is the seam between the roster operations and the storage
//! engine. Two implementations exist:
//! - `MemoryStore` (here): `BTreeMap`-backed, volatile, used by tests and
//!   the API test harness
//! - `RedbStore` (`storage` module): disk-backed ACID store
//!
//! Stores are dumb document containers: id allocation, upsert, lookup,
//! ordered listing, and removal. Validation and timestamp maintenance live
//! in `Roster`.

use crate::types::{DrivetrackError, Pupil, PupilId};
use std::collections::BTreeMap;

// =============================================================================
// PUPIL STORE TRAIT
// =============================================================================

/// Operations every storage backend must support.
///
/// Each method is a single atomic document operation; no method spans
/// multiple documents.
pub trait PupilStore {
    /// Hand out the next pupil id. Ids are monotonic and never reused.
    fn allocate_id(&mut self) -> Result<PupilId, DrivetrackError>;

    /// Insert or overwrite a pupil document keyed by its id.
    fn insert(&mut self, pupil: &Pupil) -> Result<(), DrivetrackError>;

    /// Fetch a pupil by id.
    fn get(&self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError>;

    /// All pupils in ascending id order.
    fn list(&self) -> Result<Vec<Pupil>, DrivetrackError>;

    /// Remove a pupil, returning the removed document.
    fn remove(&mut self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError>;

    /// Number of stored pupils.
    fn len(&self) -> Result<usize, DrivetrackError>;

    /// True if the store holds no pupils.
    fn is_empty(&self) -> Result<bool, DrivetrackError> {
        Ok(self.len()? == 0)
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile in-memory pupil store.
///
/// Uses `BTreeMap` so listing order is deterministic (ascending id).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pupils: BTreeMap<PupilId, Pupil>,
    next_id: u64,
}

impl MemoryStore {
    /// Create a new empty store. The first allocated id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PupilStore for MemoryStore {
    fn allocate_id(&mut self) -> Result<PupilId, DrivetrackError> {
        self.next_id = self.next_id.saturating_add(1);
        Ok(PupilId(self.next_id))
    }

    fn insert(&mut self, pupil: &Pupil) -> Result<(), DrivetrackError> {
        self.pupils.insert(pupil.id, pupil.clone());
        Ok(())
    }

    fn get(&self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError> {
        Ok(self.pupils.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Pupil>, DrivetrackError> {
        Ok(self.pupils.values().cloned().collect())
    }

    fn remove(&mut self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError> {
        Ok(self.pupils.remove(&id))
    }

    fn len(&self) -> Result<usize, DrivetrackError> {
        Ok(self.pupils.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressRecord, Stage};
    use chrono::Utc;

    fn pupil(id: u64) -> Pupil {
        Pupil {
            id: PupilId(id),
            first_name: "Amy".to_string(),
            last_name: "Hughes".to_string(),
            email: "amy@example.com".to_string(),
            progress_records: vec![ProgressRecord::new("Gear Changing", Stage::Introduced)],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let mut store = MemoryStore::new();
        let a = store.allocate_id().expect("id");
        let b = store.allocate_id().expect("id");
        assert!(b > a);
    }

    #[test]
    fn insert_get_remove_round_trip() {
        let mut store = MemoryStore::new();
        let p = pupil(1);
        store.insert(&p).expect("insert");

        assert_eq!(store.get(PupilId(1)).expect("get"), Some(p.clone()));
        assert_eq!(store.len().expect("len"), 1);

        let removed = store.remove(PupilId(1)).expect("remove");
        assert_eq!(removed, Some(p));
        assert!(store.is_empty().expect("empty"));
    }

    #[test]
    fn remove_missing_returns_none() {
        let mut store = MemoryStore::new();
        assert_eq!(store.remove(PupilId(42)).expect("remove"), None);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let mut store = MemoryStore::new();
        store.insert(&pupil(3)).expect("insert");
        store.insert(&pupil(1)).expect("insert");
        store.insert(&pupil(2)).expect("insert");

        let ids: Vec<u64> = store
            .list()
            .expect("list")
            .iter()
            .map(|p| p.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
