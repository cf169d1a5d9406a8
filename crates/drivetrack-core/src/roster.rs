//! # Roster Module
//!
//! The `Roster` is the service-facing owner of a pupil store. It performs
//! validation, id allocation, and timestamp maintenance, and delegates the
//! raw document operations to its storage backend.
//!
//! ## Storage Backends
//!
//! Roster supports two storage backends:
//! - `InMemory`: Uses `MemoryStore` (fast, volatile; tests and throwaway
//!   rosters)
//! - `Persistent`: Uses `RedbStore` for disk-backed ACID storage
//!
//! Each roster operation is a single atomic document operation; no
//! operation spans multiple pupils.

use crate::store::{MemoryStore, PupilStore};
use crate::storage::RedbStore;
use crate::types::{DrivetrackError, Pupil, PupilDraft, PupilId, PupilPatch, require_field};
use chrono::Utc;
use std::path::Path;

/// Storage backend for a Roster.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned; the service layer
// shares a Roster behind Arc<RwLock<_>> instead.

/// A Roster owns the pupil store and exposes the CRUD operations the
/// service layer and CLI build on.
#[derive(Debug, Default)]
pub struct Roster {
    /// The storage backend (in-memory or persistent).
    backend: StorageBackend,
}

impl Roster {
    /// Create a new empty roster with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a roster with persistent redb storage.
    ///
    /// Opens or creates a database at the given path. All changes are
    /// persisted automatically.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, DrivetrackError> {
        let store = RedbStore::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(store),
        })
    }

    /// Create a roster around an existing store backend.
    #[must_use]
    pub fn with_backend(backend: StorageBackend) -> Self {
        Self { backend }
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn PupilStore {
        match &self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn store_mut(&mut self) -> &mut dyn PupilStore {
        match &mut self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    // =========================================================================
    // CRUD OPERATIONS
    // =========================================================================

    /// Create a pupil from a validated draft.
    ///
    /// Assigns the id, stamps both timestamps, and stores the document.
    /// The progress list is exactly what the draft carries; callers wanting
    /// the fixed 16-skill default supply it via `skills::default_progress_records`.
    pub fn create(&mut self, draft: PupilDraft) -> Result<Pupil, DrivetrackError> {
        draft.validate()?;

        let store = self.store_mut();
        let id = store.allocate_id()?;
        let now = Utc::now();
        let pupil = Pupil {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            progress_records: draft.progress_records,
            created_at: now,
            updated_at: now,
        };
        store.insert(&pupil)?;
        Ok(pupil)
    }

    /// Fetch a pupil by id.
    pub fn get(&self, id: PupilId) -> Result<Pupil, DrivetrackError> {
        self.store()
            .get(id)?
            .ok_or(DrivetrackError::NotFound(id))
    }

    /// All pupils in ascending id order.
    pub fn list(&self) -> Result<Vec<Pupil>, DrivetrackError> {
        self.store().list()
    }

    /// Number of pupils on the roster.
    pub fn len(&self) -> Result<usize, DrivetrackError> {
        self.store().len()
    }

    /// True if the roster has no pupils.
    pub fn is_empty(&self) -> Result<bool, DrivetrackError> {
        self.store().is_empty()
    }

    /// Merge a partial update into a pupil.
    ///
    /// Supplied scalar fields overwrite; a supplied progress list replaces
    /// the prior one wholesale. A patch may not blank a required field.
    /// `updated_at` is refreshed; `created_at` is untouched.
    pub fn update(&mut self, id: PupilId, patch: PupilPatch) -> Result<Pupil, DrivetrackError> {
        let store = self.store_mut();
        let mut pupil = store.get(id)?.ok_or(DrivetrackError::NotFound(id))?;

        pupil.apply(patch);
        require_field("firstName", &pupil.first_name)?;
        require_field("lastName", &pupil.last_name)?;
        require_field("eMail", &pupil.email)?;

        pupil.updated_at = Utc::now();
        store.insert(&pupil)?;
        Ok(pupil)
    }

    /// Remove a pupil, returning the deleted document.
    pub fn delete(&mut self, id: PupilId) -> Result<Pupil, DrivetrackError> {
        self.store_mut()
            .remove(id)?
            .ok_or(DrivetrackError::NotFound(id))
    }

    /// Reclaim free space in the persistent database file.
    ///
    /// No-op for in-memory rosters.
    pub fn compact(&mut self) -> Result<(), DrivetrackError> {
        match &mut self.backend {
            StorageBackend::InMemory(_) => Ok(()),
            StorageBackend::Persistent(store) => store.compact(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressRecord, Stage};

    fn draft() -> PupilDraft {
        PupilDraft::new("Amy", "Hughes", "amy@example.com")
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        let mut roster = Roster::new();
        let pupil = roster.create(draft()).expect("create");

        assert_eq!(pupil.id, PupilId(1));
        assert_eq!(pupil.created_at, pupil.updated_at);
        assert!(pupil.progress_records.is_empty());
    }

    #[test]
    fn create_rejects_missing_last_name() {
        let mut roster = Roster::new();
        let err = roster
            .create(PupilDraft::new("Amy", "", "amy@example.com"))
            .unwrap_err();
        assert!(matches!(err, DrivetrackError::Validation(ref m) if m.contains("lastName")));
        assert!(roster.is_empty().expect("empty"));
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let roster = Roster::new();
        assert!(matches!(
            roster.get(PupilId(9)),
            Err(DrivetrackError::NotFound(PupilId(9)))
        ));
    }

    #[test]
    fn update_merges_scalars_and_replaces_records() {
        let mut roster = Roster::new();
        let pupil = roster
            .create(draft().with_progress_records(vec![
                ProgressRecord::new("Gear Changing", Stage::Introduced),
                ProgressRecord::new("Cross Roads", Stage::Introduced),
            ]))
            .expect("create");

        let updated = roster
            .update(
                pupil.id,
                PupilPatch {
                    email: Some("amy.hughes@example.com".to_string()),
                    progress_records: Some(vec![ProgressRecord::new(
                        "Gear Changing",
                        Stage::Independent,
                    )]),
                    ..PupilPatch::default()
                },
            )
            .expect("update");

        assert_eq!(updated.email, "amy.hughes@example.com");
        assert_eq!(updated.first_name, "Amy");
        assert_eq!(updated.progress_records.len(), 1);
        assert_eq!(updated.created_at, pupil.created_at);
        assert!(updated.updated_at >= pupil.updated_at);
    }

    #[test]
    fn update_cannot_blank_a_required_field() {
        let mut roster = Roster::new();
        let pupil = roster.create(draft()).expect("create");

        let err = roster
            .update(
                pupil.id,
                PupilPatch {
                    email: Some("   ".to_string()),
                    ..PupilPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DrivetrackError::Validation(_)));

        // The stored document is untouched
        assert_eq!(roster.get(pupil.id).expect("get").email, "amy@example.com");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut roster = Roster::new();
        assert!(matches!(
            roster.update(PupilId(5), PupilPatch::default()),
            Err(DrivetrackError::NotFound(PupilId(5)))
        ));
    }

    #[test]
    fn delete_returns_the_document() {
        let mut roster = Roster::new();
        let pupil = roster.create(draft()).expect("create");

        let deleted = roster.delete(pupil.id).expect("delete");
        assert_eq!(deleted, pupil);
        assert!(matches!(
            roster.delete(pupil.id),
            Err(DrivetrackError::NotFound(_))
        ));
    }

    #[test]
    fn with_backend_adopts_an_existing_store() {
        use crate::store::PupilStore;
        use chrono::Utc;

        let mut store = MemoryStore::new();
        let id = store.allocate_id().expect("id");
        let now = Utc::now();
        store
            .insert(&Pupil {
                id,
                first_name: "Amy".to_string(),
                last_name: "Hughes".to_string(),
                email: "amy@example.com".to_string(),
                progress_records: vec![],
                created_at: now,
                updated_at: now,
            })
            .expect("insert");

        let roster = Roster::with_backend(StorageBackend::InMemory(store));
        assert!(!roster.is_persistent());
        assert_eq!(roster.len().expect("len"), 1);
        assert_eq!(roster.get(id).expect("get").first_name, "Amy");
    }

    #[test]
    fn compact_is_a_no_op_in_memory() {
        let mut roster = Roster::new();
        roster.create(draft()).expect("create");
        roster.compact().expect("compact");
        assert_eq!(roster.len().expect("len"), 1);
    }

    #[test]
    fn persistent_roster_reports_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster = Roster::with_redb(dir.path().join("pupils.db")).expect("open");
        assert!(roster.is_persistent());
        assert!(!Roster::new().is_persistent());
    }
}
