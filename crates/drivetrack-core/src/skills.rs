//! # Fixed Skill Roster
//!
//! The 16 driving-skill variables every new pupil card starts with, in the
//! order they appear on the lesson sheet. All start at `Stage::Introduced`.
//!
//! "Approaching & Emerging Left" appears twice; historic pupil records
//! carry the duplicate and skill variables are not required to be unique.

use crate::types::{ProgressRecord, Stage};

/// The default skill variables, in lesson-sheet order.
pub const DEFAULT_SKILLS: [&str; 16] = [
    "Cockpit Drill & Controls",
    "Moving Off Safely",
    "Steer Accurate Course",
    "Stop Normally",
    "Gear Changing",
    "Clutch Control (level & uphill)",
    "Approaching & Turning Left",
    "Approaching & Emerging Left",
    "Approaching & Turning Right",
    "Approaching & Emerging Left",
    "Crossing Path",
    "Moving off at an angle",
    "Hill Starts (up & down)",
    "Controlled Stop",
    "Cross Roads",
    "Ancillary Controls",
];

/// Build the default progress list: every skill at `Introduced`.
#[must_use]
pub fn default_progress_records() -> Vec<ProgressRecord> {
    DEFAULT_SKILLS
        .iter()
        .map(|skill| ProgressRecord::new(*skill, Stage::Introduced))
        .collect()
}
