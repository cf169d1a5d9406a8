//! Integration tests for the roster against both storage backends.
//!
//! The in-memory backend is exercised heavily in unit tests; these cover
//! the persistent backend and full create/update/delete flows across
//! database reopens.

#![allow(clippy::unwrap_used, clippy::panic)]

use drivetrack_core::{
    DrivetrackError, ProgressRecord, PupilDraft, PupilPatch, Roster, Stage,
    default_progress_records, filter_pupils,
};

fn draft(first: &str, last: &str) -> PupilDraft {
    PupilDraft::new(first, last, format!("{}@example.com", first.to_lowercase()))
}

#[test]
fn persistent_crud_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut roster = Roster::with_redb(dir.path().join("pupils.db")).unwrap();

    let amy = roster
        .create(draft("Amy", "Hughes").with_progress_records(default_progress_records()))
        .unwrap();
    let ben = roster.create(draft("Ben", "Owen")).unwrap();

    assert_eq!(roster.len().unwrap(), 2);
    assert_eq!(amy.progress_records.len(), 16);
    assert!(ben.progress_records.is_empty());

    let updated = roster
        .update(
            amy.id,
            PupilPatch {
                progress_records: Some(vec![ProgressRecord::new(
                    "Gear Changing",
                    Stage::Independent,
                )]),
                ..PupilPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.progress_records.len(), 1);

    let deleted = roster.delete(ben.id).unwrap();
    assert_eq!(deleted.first_name, "Ben");
    assert_eq!(roster.len().unwrap(), 1);
}

#[test]
fn pupils_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pupils.db");

    let amy_id = {
        let mut roster = Roster::with_redb(&path).unwrap();
        roster
            .create(draft("Amy", "Hughes").with_progress_records(vec![ProgressRecord::new(
                "Controlled Stop",
                Stage::Prompted,
            )]))
            .unwrap()
            .id
    };

    let roster = Roster::with_redb(&path).unwrap();
    let amy = roster.get(amy_id).unwrap();
    assert_eq!(amy.first_name, "Amy");
    assert_eq!(amy.progress_records[0].stage, Stage::Prompted);
}

#[test]
fn delete_unknown_id_is_not_found_on_persistent_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut roster = Roster::with_redb(dir.path().join("pupils.db")).unwrap();

    match roster.delete(drivetrack_core::PupilId(99)) {
        Err(DrivetrackError::NotFound(id)) => assert_eq!(id.0, 99),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn compact_and_reopen_preserves_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pupils.db");

    let amy_id = {
        let mut roster = Roster::with_redb(&path).unwrap();
        let amy = roster
            .create(draft("Amy", "Hughes").with_progress_records(default_progress_records()))
            .unwrap();
        let ben = roster.create(draft("Ben", "Owen")).unwrap();
        roster.delete(ben.id).unwrap();

        roster.compact().unwrap();
        assert_eq!(roster.len().unwrap(), 1);
        amy.id
    };

    let roster = Roster::with_redb(&path).unwrap();
    let amy = roster.get(amy_id).unwrap();
    assert_eq!(amy.full_name(), "Amy Hughes");
    assert_eq!(amy.progress_records.len(), 16);
}

#[test]
fn list_and_filter_over_persistent_roster() {
    let dir = tempfile::tempdir().unwrap();
    let mut roster = Roster::with_redb(dir.path().join("pupils.db")).unwrap();

    roster.create(draft("Amy", "Hughes")).unwrap();
    roster.create(draft("Ben", "Owen")).unwrap();
    roster.create(draft("Bethan", "Hughes")).unwrap();

    let pupils = roster.list().unwrap();
    let hughes = filter_pupils(&pupils, "HUGHES");
    assert_eq!(hughes.len(), 2);
    assert_eq!(hughes[0].first_name, "Amy");
    assert_eq!(hughes[1].first_name, "Bethan");
}
