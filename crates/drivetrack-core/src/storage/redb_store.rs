//! # redb-backed Pupil Storage
//!
//! A disk-backed pupil store using the redb embedded database, providing:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//! - Zero configuration
//!
//! The document database of the original deployment is replaced by a single
//! embedded database file; each roster operation maps to exactly one redb
//! transaction, which gives the per-document atomicity the service layer
//! relies on.

use crate::store::PupilStore;
use crate::types::{DrivetrackError, Pupil, PupilId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for pupils: PupilId(u64) -> serialized Pupil bytes
const PUPILS: TableDefinition<u64, &[u8]> = TableDefinition::new("pupils");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

/// Metadata key holding the id counter.
const NEXT_PUPIL_ID: &str = "next_pupil_id";

/// A disk-backed pupil store using redb.
///
/// The database handle is an explicitly-owned resource: it is created here,
/// threaded through `Roster` into the service layer, and closed on drop.
/// There is no process-global connection.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Highest id handed out so far, mirrored from the metadata table.
    next_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a pupil database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DrivetrackError> {
        let db = Database::create(path.as_ref())
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(PUPILS)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        }

        // Load the id counter
        let read_txn = db
            .begin_read()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        let next_id = {
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            table
                .get(NEXT_PUPIL_ID)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self { db, next_id })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), DrivetrackError> {
        self.db
            .compact()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// PUPILSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl PupilStore for RedbStore {
    fn allocate_id(&mut self) -> Result<PupilId, DrivetrackError> {
        let candidate = self.next_id.saturating_add(1);

        // Persist the counter before handing the id out; a crash may skip
        // ids but can never reuse one.
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        {
            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            meta_table
                .insert(NEXT_PUPIL_ID, candidate)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        self.next_id = candidate;
        Ok(PupilId(candidate))
    }

    fn insert(&mut self, pupil: &Pupil) -> Result<(), DrivetrackError> {
        let bytes = postcard::to_allocvec(pupil)
            .map_err(|e| DrivetrackError::Serialization(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        {
            let mut pupils_table = write_txn
                .open_table(PUPILS)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            pupils_table
                .insert(pupil.id.0, bytes.as_slice())
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        Ok(())
    }

    fn get(&self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        let pupils_table = read_txn
            .open_table(PUPILS)
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        pupils_table
            .get(id.0)
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?
            .map(|data| {
                postcard::from_bytes::<Pupil>(data.value())
                    .map_err(|e| DrivetrackError::Serialization(e.to_string()))
            })
            .transpose()
    }

    fn list(&self) -> Result<Vec<Pupil>, DrivetrackError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        let pupils_table = read_txn
            .open_table(PUPILS)
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        // redb iterates keys in ascending order, so listing is id-ordered.
        let mut pupils = Vec::new();
        for entry in pupils_table
            .iter()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            let pupil: Pupil = postcard::from_bytes(value.value())
                .map_err(|e| DrivetrackError::Serialization(e.to_string()))?;
            pupils.push(pupil);
        }
        Ok(pupils)
    }

    fn remove(&mut self, id: PupilId) -> Result<Option<Pupil>, DrivetrackError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        let removed = {
            let mut pupils_table = write_txn
                .open_table(PUPILS)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
            pupils_table
                .remove(id.0)
                .map_err(|e| DrivetrackError::Storage(e.to_string()))?
                .map(|data| {
                    postcard::from_bytes::<Pupil>(data.value())
                        .map_err(|e| DrivetrackError::Serialization(e.to_string()))
                })
                .transpose()?
        };

        write_txn
            .commit()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;

        Ok(removed)
    }

    fn len(&self) -> Result<usize, DrivetrackError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        let pupils_table = read_txn
            .open_table(PUPILS)
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        let count = pupils_table
            .len()
            .map_err(|e| DrivetrackError::Storage(e.to_string()))?;
        Ok(count as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
