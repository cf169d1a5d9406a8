//! # Progress Report Formatter
//!
//! Pure rendering of a pupil's progress list into an HTML report body.
//!
//! Guarantees:
//! - Deterministic: identical input produces byte-identical output
//! - Order-preserving: rows appear in the pupil's record order
//! - No side effects, no external calls
//! - All interpolated text is HTML-escaped

use crate::types::Pupil;

/// Render a pupil's progress report as an HTML fragment.
///
/// A heading naming the pupil followed by a two-column table pairing each
/// skill variable with its stage label, in input order.
#[must_use]
pub fn format_progress_report(pupil: &Pupil) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<h1>Progress Report for {}</h1>\n",
        escape_html(&pupil.full_name())
    ));
    html.push_str("<table>\n");
    html.push_str("  <tr><th>Skill</th><th>Stage</th></tr>\n");
    for record in &pupil.progress_records {
        html.push_str(&format!(
            "  <tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&record.variable),
            record.stage.label()
        ));
    }
    html.push_str("</table>\n");
    html
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProgressRecord, Pupil, PupilId, Stage};
    use chrono::Utc;

    fn pupil_with_records(records: Vec<ProgressRecord>) -> Pupil {
        Pupil {
            id: PupilId(1),
            first_name: "Amy".to_string(),
            last_name: "Hughes".to_string(),
            email: "amy@example.com".to_string(),
            progress_records: records,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn report_names_the_pupil() {
        let pupil = pupil_with_records(vec![]);
        let html = format_progress_report(&pupil);
        assert!(html.contains("Progress Report for Amy Hughes"));
    }

    #[test]
    fn rows_follow_record_order() {
        let pupil = pupil_with_records(vec![
            ProgressRecord::new("Gear Changing", Stage::Prompted),
            ProgressRecord::new("Controlled Stop", Stage::Introduced),
        ]);
        let html = format_progress_report(&pupil);

        let gear = html.find("Gear Changing").expect("gear row");
        let stop = html.find("Controlled Stop").expect("stop row");
        assert!(gear < stop, "rows must preserve input order");
        assert!(html.contains("<td>Gear Changing</td><td>Prompted</td>"));
    }

    #[test]
    fn skill_names_are_escaped() {
        let pupil = pupil_with_records(vec![ProgressRecord::new(
            "Clutch Control (level & uphill)",
            Stage::TalkThrough,
        )]);
        let html = format_progress_report(&pupil);
        assert!(html.contains("Clutch Control (level &amp; uphill)"));
        assert!(html.contains("Talk Through"));
    }

    #[test]
    fn markup_in_names_cannot_escape_the_table() {
        let mut pupil = pupil_with_records(vec![ProgressRecord::new(
            "<script>alert(1)</script>",
            Stage::Introduced,
        )]);
        pupil.first_name = "\"Bob\"".to_string();
        let html = format_progress_report(&pupil);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;Bob&quot;"));
    }

    #[test]
    fn formatter_is_idempotent() {
        let pupil = pupil_with_records(vec![
            ProgressRecord::new("Cross Roads", Stage::RarelyPrompted),
            // Duplicate variables are legal and must both render
            ProgressRecord::new("Cross Roads", Stage::Independent),
        ]);
        let first = format_progress_report(&pupil);
        let second = format_progress_report(&pupil);
        assert_eq!(first, second);
        assert_eq!(first.matches("Cross Roads").count(), 2);
    }
}
