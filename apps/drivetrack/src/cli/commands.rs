//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, PupilJson};
use crate::mail::{HttpMailer, MailMessage, Mailer, UnconfiguredMailer};
use drivetrack_core::{
    DrivetrackError, ProgressRecord, PupilDraft, PupilId, PupilPatch, Roster, Stage,
    default_progress_records, filter_pupils, format_progress_report,
};
use std::path::Path;
use std::sync::Arc;

/// Open the persistent roster backing every CLI command.
fn open_roster(db_path: &Path) -> Result<Roster, DrivetrackError> {
    Roster::with_redb(db_path)
}

fn print_json(pupil: drivetrack_core::Pupil) {
    let json = PupilJson::from(pupil);
    println!(
        "{}",
        serde_json::to_string_pretty(&json).unwrap_or_default()
    );
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: Option<u16>,
) -> Result<(), DrivetrackError> {
    let roster = open_roster(db_path)?;

    // Flag wins, then the PORT environment variable, then 4000.
    let port = port
        .or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
        })
        .unwrap_or(4000);

    let mailer: Arc<dyn Mailer> = match HttpMailer::from_env() {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::warn!(
                "Mail dispatcher not configured ({}); send-report will fail until \
                 DRIVETRACK_MAIL_URL / DRIVETRACK_MAIL_KEY / DRIVETRACK_MAIL_FROM are set",
                e
            );
            Arc::new(UnconfiguredMailer::new(e.to_string()))
        }
    };

    println!("Drivetrack Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  GET    /api/pupils                  - All pupils");
    println!("  POST   /api/pupils                  - Create a pupil");
    println!("  GET    /api/pupils/{{id}}             - One pupil");
    println!("  PATCH  /api/pupils/{{id}}             - Partial update");
    println!("  DELETE /api/pupils/{{id}}             - Remove a pupil");
    println!("  POST   /api/pupils/send-report      - Dispatch a rendered report");
    println!("  POST   /api/pupils/{{id}}/send-report - Render and dispatch");
    println!("  GET    /health                      - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, roster, mailer).await
}

// =============================================================================
// LIST COMMAND
// =============================================================================

/// List pupils, optionally filtered by a name substring.
pub fn cmd_list(
    db_path: &Path,
    json_mode: bool,
    search: Option<&str>,
) -> Result<(), DrivetrackError> {
    let roster = open_roster(db_path)?;
    let pupils = roster.list()?;
    let filtered = filter_pupils(&pupils, search.unwrap_or(""));

    if json_mode {
        let out: Vec<PupilJson> = filtered.iter().map(|p| PupilJson::from((*p).clone())).collect();
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    if filtered.is_empty() {
        println!("No pupils found.");
        return Ok(());
    }

    println!("Pupils ({})", filtered.len());
    println!("==========");
    for pupil in filtered {
        println!("  [{}] {} <{}>", pupil.id, pupil.full_name(), pupil.email);
    }
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show one pupil's card: contact fields plus the progress table.
pub fn cmd_show(db_path: &Path, json_mode: bool, id: u64) -> Result<(), DrivetrackError> {
    let roster = open_roster(db_path)?;
    let pupil = roster.get(PupilId(id))?;

    if json_mode {
        print_json(pupil);
        return Ok(());
    }

    println!("Pupil [{}]", pupil.id);
    println!("==========");
    println!("Name:    {}", pupil.full_name());
    println!("Email:   {}", pupil.email);
    println!("Created: {}", pupil.created_at);
    println!("Updated: {}", pupil.updated_at);
    println!();
    println!("Progress Record");
    for record in &pupil.progress_records {
        println!("  {:<34} {}", record.variable, record.stage);
    }
    Ok(())
}

// =============================================================================
// ADD COMMAND
// =============================================================================

/// Add a pupil, starting every skill on the fixed roster at Introduced.
pub fn cmd_add(
    db_path: &Path,
    json_mode: bool,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<(), DrivetrackError> {
    let mut roster = open_roster(db_path)?;
    let draft = PupilDraft::new(first_name, last_name, email)
        .with_progress_records(default_progress_records());
    let pupil = roster.create(draft)?;

    if json_mode {
        print_json(pupil);
    } else {
        println!("Added pupil [{}] {}", pupil.id, pupil.full_name());
    }
    Ok(())
}

// =============================================================================
// UPDATE COMMAND
// =============================================================================

/// Update a pupil's contact fields.
pub fn cmd_update(
    db_path: &Path,
    json_mode: bool,
    id: u64,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> Result<(), DrivetrackError> {
    let patch = PupilPatch {
        first_name,
        last_name,
        email,
        progress_records: None,
    };
    if patch.is_empty() {
        return Err(DrivetrackError::Validation(
            "nothing to update: supply --first-name, --last-name, or --email".to_string(),
        ));
    }

    let mut roster = open_roster(db_path)?;
    let pupil = roster.update(PupilId(id), patch)?;

    if json_mode {
        print_json(pupil);
    } else {
        println!("Updated pupil [{}] {}", pupil.id, pupil.full_name());
    }
    Ok(())
}

// =============================================================================
// SET-STAGE COMMAND
// =============================================================================

/// Change the stage of every record matching a skill variable.
pub fn cmd_set_stage(
    db_path: &Path,
    json_mode: bool,
    id: u64,
    skill: &str,
    stage: &str,
) -> Result<(), DrivetrackError> {
    let stage: Stage = stage.parse()?;

    let mut roster = open_roster(db_path)?;
    let pupil = roster.get(PupilId(id))?;

    if !pupil.progress_records.iter().any(|r| r.variable == skill) {
        return Err(DrivetrackError::Validation(format!(
            "Pupil {} has no skill named '{}'",
            id, skill
        )));
    }

    // Duplicate variables are legal; move every matching record.
    let records: Vec<ProgressRecord> = pupil
        .progress_records
        .iter()
        .map(|r| {
            if r.variable == skill {
                ProgressRecord::new(r.variable.clone(), stage)
            } else {
                r.clone()
            }
        })
        .collect();

    let updated = roster.update(
        PupilId(id),
        PupilPatch {
            progress_records: Some(records),
            ..PupilPatch::default()
        },
    )?;

    if json_mode {
        print_json(updated);
    } else {
        println!("Set '{}' to {} for pupil [{}]", skill, stage, id);
    }
    Ok(())
}

// =============================================================================
// DELETE COMMAND
// =============================================================================

/// Remove a pupil, printing the deleted document.
pub fn cmd_delete(db_path: &Path, json_mode: bool, id: u64) -> Result<(), DrivetrackError> {
    let mut roster = open_roster(db_path)?;
    let pupil = roster.delete(PupilId(id))?;

    if json_mode {
        print_json(pupil);
    } else {
        println!("Deleted pupil [{}] {}", pupil.id, pupil.full_name());
    }
    Ok(())
}

// =============================================================================
// REPORT COMMANDS
// =============================================================================

/// Print a pupil's HTML progress report to stdout.
pub fn cmd_report(db_path: &Path, id: u64) -> Result<(), DrivetrackError> {
    let roster = open_roster(db_path)?;
    let pupil = roster.get(PupilId(id))?;
    print!("{}", format_progress_report(&pupil));
    Ok(())
}

/// Render and email a pupil's progress report.
pub async fn cmd_send_report(db_path: &Path, id: u64) -> Result<(), DrivetrackError> {
    let roster = open_roster(db_path)?;
    let pupil = roster.get(PupilId(id))?;

    let mailer = HttpMailer::from_env()?;
    let html = format_progress_report(&pupil);
    let message = MailMessage::new(pupil.email.clone(), "Your Progress Report", html)?;
    mailer.send(&message).await?;

    println!("Report sent to {}", pupil.email);
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Reclaim free space in the database file.
pub fn cmd_compact(db_path: &Path) -> Result<(), DrivetrackError> {
    let mut roster = open_roster(db_path)?;
    roster.compact()?;
    println!("Compacted {:?}", db_path);
    Ok(())
}
