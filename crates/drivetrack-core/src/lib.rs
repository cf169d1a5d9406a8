//! # drivetrack-core
//!
//! The pupil progress engine for Drivetrack - THE LOGIC.
//!
//! This crate implements the domain core of a driving-instructor admin
//! tool: pupil documents with embedded progress records, the fixed skill
//! roster, the HTML report formatter, search filtering, and the pupil
//! stores.
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Is the only place pupil state lives (in-memory or redb-backed)
//! - Is deterministic: ordered maps, stable listing order
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod report;
pub mod roster;
pub mod search;
pub mod skills;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{DrivetrackError, ProgressRecord, Pupil, PupilDraft, PupilId, PupilPatch, Stage};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use report::{escape_html, format_progress_report};
pub use roster::{Roster, StorageBackend};
pub use search::filter_pupils;
pub use skills::{DEFAULT_SKILLS, default_progress_records};
pub use storage::RedbStore;
pub use store::{MemoryStore, PupilStore};
