//! # Property-Based Tests
//!
//! Verification tests using proptest for the report formatter, search
//! filter, and partial-update semantics.

use chrono::Utc;
use drivetrack_core::{
    ProgressRecord, Pupil, PupilDraft, PupilId, PupilPatch, Roster, Stage, filter_pupils,
    format_progress_report,
};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// GENERATORS
// =============================================================================

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn arb_record() -> impl Strategy<Value = ProgressRecord> {
    ("[A-Za-z][A-Za-z &()]{0,30}", arb_stage())
        .prop_map(|(variable, stage)| ProgressRecord::new(variable, stage))
}

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z]{1,12}").expect("valid regex")
}

fn pupil_from(first: String, last: String, records: Vec<ProgressRecord>) -> Pupil {
    Pupil {
        id: PupilId(1),
        first_name: first,
        last_name: last,
        email: "pupil@example.com".to_string(),
        progress_records: records,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Rendering twice yields byte-identical HTML.
    #[test]
    fn report_is_idempotent(
        first in arb_name(),
        last in arb_name(),
        records in vec(arb_record(), 0..32)
    ) {
        let pupil = pupil_from(first, last, records);
        let once = format_progress_report(&pupil);
        let twice = format_progress_report(&pupil);
        prop_assert_eq!(once, twice);
    }

    /// Report rows appear in input order: every stage label is present and
    /// each escaped variable appears at a non-decreasing position.
    #[test]
    fn report_preserves_record_order(
        records in vec(arb_record(), 1..24)
    ) {
        let pupil = pupil_from("Amy".to_string(), "Hughes".to_string(), records.clone());
        let html = format_progress_report(&pupil);

        let mut cursor = 0usize;
        for record in &records {
            let cell = format!(
                "<td>{}</td><td>{}</td>",
                drivetrack_core::escape_html(&record.variable),
                record.stage.label()
            );
            let pos = html[cursor..].find(&cell);
            prop_assert!(pos.is_some(), "row for {:?} missing or out of order", record.variable);
            // Advance past the matched row so duplicates map to later rows.
            if let Some(p) = pos {
                cursor += p + cell.len();
            }
        }
    }

    /// The empty search term returns the whole list, in order.
    #[test]
    fn empty_term_matches_everything(
        names in vec((arb_name(), arb_name()), 0..16)
    ) {
        let pupils: Vec<Pupil> = names
            .into_iter()
            .enumerate()
            .map(|(i, (first, last))| {
                let mut p = pupil_from(first, last, vec![]);
                p.id = PupilId(i as u64 + 1);
                p
            })
            .collect();

        let hits = filter_pupils(&pupils, "");
        prop_assert_eq!(hits.len(), pupils.len());
        for (hit, original) in hits.iter().zip(pupils.iter()) {
            prop_assert_eq!(hit.id, original.id);
        }
    }

    /// Filtering is case-insensitive and returns exactly the pupils whose
    /// "first last" contains the term.
    #[test]
    fn filter_matches_reference_definition(
        names in vec((arb_name(), arb_name()), 1..16),
        term in "[A-Za-z ]{0,8}"
    ) {
        let pupils: Vec<Pupil> = names
            .into_iter()
            .enumerate()
            .map(|(i, (first, last))| {
                let mut p = pupil_from(first, last, vec![]);
                p.id = PupilId(i as u64 + 1);
                p
            })
            .collect();

        let hits = filter_pupils(&pupils, &term);
        let needle = term.to_lowercase();
        for pupil in &pupils {
            let expected = pupil.full_name().to_lowercase().contains(&needle);
            let actual = hits.iter().any(|h| h.id == pupil.id);
            prop_assert_eq!(actual, expected, "pupil {:?}", pupil.full_name());
        }

        // Upper-casing the term never changes the result set.
        let upper_hits = filter_pupils(&pupils, &term.to_uppercase());
        prop_assert_eq!(hits.len(), upper_hits.len());
    }

    /// A patch carrying a progress list replaces the stored list exactly.
    #[test]
    fn patch_replaces_progress_list_wholesale(
        before in vec(arb_record(), 0..16),
        after in vec(arb_record(), 0..16)
    ) {
        let mut roster = Roster::new();
        let pupil = roster
            .create(
                PupilDraft::new("Amy", "Hughes", "amy@example.com")
                    .with_progress_records(before),
            )
            .expect("create");

        let updated = roster
            .update(
                pupil.id,
                PupilPatch {
                    progress_records: Some(after.clone()),
                    ..PupilPatch::default()
                },
            )
            .expect("update");

        prop_assert_eq!(updated.progress_records, after);
    }
}
