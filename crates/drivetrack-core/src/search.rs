//! # Pupil Search Filtering
//!
//! Case-insensitive substring filtering over "firstName lastName", as used
//! by the list view. Purely in-memory; the list view re-filters on every
//! search-term change.

use crate::types::Pupil;

/// Filter pupils whose "first last" name contains `term`, ignoring case.
///
/// An empty term matches everything. Input order is preserved.
#[must_use]
pub fn filter_pupils<'a>(pupils: &'a [Pupil], term: &str) -> Vec<&'a Pupil> {
    let needle = term.to_lowercase();
    pupils
        .iter()
        .filter(|pupil| pupil.full_name().to_lowercase().contains(&needle))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
