//! # Persistent Storage
//!
//! Disk-backed pupil storage built on redb.

pub mod redb_store;

pub use redb_store::RedbStore;
