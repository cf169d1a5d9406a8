//! # Core Type Definitions
//!
//! This module contains all core types for the Drivetrack pupil tracker:
//! - Pupil identifiers (`PupilId`)
//! - The five-value mastery scale (`Stage`)
//! - Progress records and pupil documents (`ProgressRecord`, `Pupil`)
//! - Validated inputs (`PupilDraft`, `PupilPatch`)
//! - Error types (`DrivetrackError`)
//!
//! ## Ordering Guarantees
//!
//! All types in this module implement `Ord` where they act as map keys, so
//! stores backed by `BTreeMap` iterate in deterministic id order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// PUPIL IDENTIFIER
// =============================================================================

/// Unique identifier for a pupil document.
/// Assigned by the store on creation; monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PupilId(pub u64);

impl fmt::Display for PupilId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// Mastery stage for a single driving skill.
///
/// Exactly five fixed values; the serialized labels match the historic wire
/// format ("Talk Through", "Rarely Prompted", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Introduced,
    #[serde(rename = "Talk Through")]
    TalkThrough,
    Prompted,
    #[serde(rename = "Rarely Prompted")]
    RarelyPrompted,
    Independent,
}

impl Stage {
    /// All stages in progression order.
    pub const ALL: [Stage; 5] = [
        Stage::Introduced,
        Stage::TalkThrough,
        Stage::Prompted,
        Stage::RarelyPrompted,
        Stage::Independent,
    ];

    /// The human-readable label, identical to the wire representation.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Introduced => "Introduced",
            Stage::TalkThrough => "Talk Through",
            Stage::Prompted => "Prompted",
            Stage::RarelyPrompted => "Rarely Prompted",
            Stage::Independent => "Independent",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = DrivetrackError;

    /// Parse an exact stage label. Anything outside the five fixed values is
    /// a validation error; the API boundary relies on this for enum
    /// membership checks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| {
                DrivetrackError::Validation(format!(
                    "Unknown stage '{}' (expected one of: Introduced, Talk Through, \
                     Prompted, Rarely Prompted, Independent)",
                    s
                ))
            })
    }
}

// =============================================================================
// PROGRESS RECORD
// =============================================================================

/// A (skill, mastery-stage) pair tracked per pupil.
///
/// The variable is free text and is NOT required to be unique within a
/// pupil's list; historic rosters repeat skill names. Records have no
/// identity of their own — they exist only embedded in a `Pupil` and are
/// replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Skill name, free text.
    pub variable: String,
    /// Current mastery stage for the skill.
    pub stage: Stage,
}

impl ProgressRecord {
    /// Create a new progress record.
    #[must_use]
    pub fn new(variable: impl Into<String>, stage: Stage) -> Self {
        Self {
            variable: variable.into(),
            stage,
        }
    }
}

// =============================================================================
// PUPIL
// =============================================================================

/// A driving-school pupil document.
///
/// Timestamps are maintained by the store layer: `created_at` is stamped on
/// creation and `updated_at` refreshed on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pupil {
    /// Store-assigned identifier.
    pub id: PupilId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Ordered sequence of tracked skills.
    pub progress_records: Vec<ProgressRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pupil {
    /// The pupil's display name, "first last" — also the search key.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Merge a partial update into this pupil.
    ///
    /// Scalar fields are overwritten when supplied; `progress_records`,
    /// when present, REPLACES the prior list (no merge). Timestamps are
    /// the caller's responsibility.
    pub fn apply(&mut self, patch: PupilPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(progress_records) = patch.progress_records {
            self.progress_records = progress_records;
        }
    }
}

// =============================================================================
// PUPIL DRAFT (create input)
// =============================================================================

/// Validated input for creating a pupil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupilDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Initial progress list; empty unless the caller supplies one.
    pub progress_records: Vec<ProgressRecord>,
}

impl PupilDraft {
    /// Create a draft with no progress records.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            progress_records: Vec::new(),
        }
    }

    /// Replace the initial progress list.
    #[must_use]
    pub fn with_progress_records(mut self, records: Vec<ProgressRecord>) -> Self {
        self.progress_records = records;
        self
    }

    /// Check field presence: first name, last name, and email are required
    /// and must be non-empty after trimming.
    pub fn validate(&self) -> Result<(), DrivetrackError> {
        require_field("firstName", &self.first_name)?;
        require_field("lastName", &self.last_name)?;
        require_field("eMail", &self.email)?;
        Ok(())
    }
}

/// Reject empty or whitespace-only required fields.
pub(crate) fn require_field(name: &str, value: &str) -> Result<(), DrivetrackError> {
    if value.trim().is_empty() {
        return Err(DrivetrackError::Validation(format!(
            "{} is required",
            name
        )));
    }
    Ok(())
}

// =============================================================================
// PUPIL PATCH (partial update input)
// =============================================================================

/// Partial update for a pupil. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupilPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Full replacement of the progress list when present.
    pub progress_records: Option<Vec<ProgressRecord>>,
}

impl PupilPatch {
    /// True if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.progress_records.is_none()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Drivetrack system.
///
/// - No silent failures
/// - Use `Result<T, DrivetrackError>` for fallible operations
/// - The core should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum DrivetrackError {
    /// A required field is missing/empty or a value is outside its enum.
    #[error("{0}")]
    Validation(String),

    /// The requested pupil does not exist.
    #[error("No such pupil: {0}")]
    NotFound(PupilId),

    /// The mail provider rejected or failed to deliver a report.
    #[error("Mail dispatch failed: {0}")]
    Mail(String),

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_round_trip_from_str() {
        for stage in Stage::ALL {
            let parsed: Stage = stage.label().parse().expect("label parses");
            assert_eq!(parsed, stage);
        }
    }

    #[test]
    fn stage_unknown_label_is_validation_error() {
        let err = "Mastered".parse::<Stage>().unwrap_err();
        assert!(matches!(err, DrivetrackError::Validation(_)));
    }

    #[test]
    fn stage_serde_uses_wire_labels() {
        let json = serde_json::to_string(&Stage::RarelyPrompted).expect("serialize");
        assert_eq!(json, "\"Rarely Prompted\"");
        let back: Stage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Stage::RarelyPrompted);
    }

    #[test]
    fn draft_missing_first_name_fails_validation() {
        let draft = PupilDraft::new("  ", "Hughes", "amy@example.com");
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, DrivetrackError::Validation(ref m) if m.contains("firstName")));
    }

    #[test]
    fn draft_with_all_fields_validates() {
        let draft = PupilDraft::new("Amy", "Hughes", "amy@example.com");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn apply_replaces_progress_records_wholesale() {
        let mut pupil = Pupil {
            id: PupilId(1),
            first_name: "Amy".to_string(),
            last_name: "Hughes".to_string(),
            email: "amy@example.com".to_string(),
            progress_records: vec![
                ProgressRecord::new("Gear Changing", Stage::Prompted),
                ProgressRecord::new("Cross Roads", Stage::Introduced),
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        pupil.apply(PupilPatch {
            progress_records: Some(vec![ProgressRecord::new(
                "Controlled Stop",
                Stage::Independent,
            )]),
            ..PupilPatch::default()
        });

        assert_eq!(pupil.progress_records.len(), 1);
        assert_eq!(pupil.progress_records[0].variable, "Controlled Stop");
        // Untouched scalars survive
        assert_eq!(pupil.first_name, "Amy");
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(PupilPatch::default().is_empty());
        let patch = PupilPatch {
            email: Some("new@example.com".to_string()),
            ..PupilPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
