//! # Drivetrack CLI Module
//!
//! This module implements the CLI interface for Drivetrack - the terminal
//! rendition of the list and card views.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `list` - List pupils, optionally filtered by name
//! - `show` - Show one pupil's card
//! - `add` - Add a pupil with the default 16-skill roster
//! - `update` - Update a pupil's contact fields
//! - `set-stage` - Change the stage of a skill on a pupil's card
//! - `delete` - Remove a pupil
//! - `report` - Print a pupil's HTML progress report
//! - `send-report` - Render and email a pupil's progress report
//! - `compact` - Reclaim free space in the database file

mod commands;

use clap::{Parser, Subcommand};
use drivetrack_core::DrivetrackError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Drivetrack - Pupil Progress Tracker
///
/// An administrative tool for driving instructors: track pupils' progress
/// across the fixed driving-skill roster and email formatted reports.
#[derive(Parser, Debug)]
#[command(name = "drivetrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the pupil database (falls back to DRIVETRACK_DB, then drivetrack.db)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Resolve the database path: flag, then `DRIVETRACK_DB`, then default.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            std::env::var("DRIVETRACK_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("drivetrack.db"))
        })
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to (falls back to PORT, then 4000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List pupils, optionally filtered by name
    List {
        /// Case-insensitive substring match against "first last"
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one pupil's card
    Show {
        /// Pupil id
        id: u64,
    },

    /// Add a pupil with the default 16-skill roster
    Add {
        #[arg(short, long)]
        first_name: String,

        #[arg(short, long)]
        last_name: String,

        #[arg(short, long)]
        email: String,
    },

    /// Update a pupil's contact fields
    Update {
        /// Pupil id
        id: u64,

        #[arg(short, long)]
        first_name: Option<String>,

        #[arg(short, long)]
        last_name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Change the stage of a skill on a pupil's card
    SetStage {
        /// Pupil id
        id: u64,

        /// Skill variable, e.g. "Gear Changing"
        #[arg(short, long)]
        skill: String,

        /// Stage label: Introduced, Talk Through, Prompted, Rarely Prompted, Independent
        #[arg(short = 't', long)]
        stage: String,
    },

    /// Remove a pupil
    Delete {
        /// Pupil id
        id: u64,
    },

    /// Print a pupil's HTML progress report
    Report {
        /// Pupil id
        id: u64,
    },

    /// Render and email a pupil's progress report
    SendReport {
        /// Pupil id
        id: u64,
    },

    /// Reclaim free space in the database file
    Compact,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), DrivetrackError> {
    let db_path = cli.database_path();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&db_path, &host, port).await,
        Some(Commands::List { search }) => cmd_list(&db_path, json_mode, search.as_deref()),
        Some(Commands::Show { id }) => cmd_show(&db_path, json_mode, id),
        Some(Commands::Add {
            first_name,
            last_name,
            email,
        }) => cmd_add(&db_path, json_mode, &first_name, &last_name, &email),
        Some(Commands::Update {
            id,
            first_name,
            last_name,
            email,
        }) => cmd_update(&db_path, json_mode, id, first_name, last_name, email),
        Some(Commands::SetStage { id, skill, stage }) => {
            cmd_set_stage(&db_path, json_mode, id, &skill, &stage)
        }
        Some(Commands::Delete { id }) => cmd_delete(&db_path, json_mode, id),
        Some(Commands::Report { id }) => cmd_report(&db_path, id),
        Some(Commands::SendReport { id }) => cmd_send_report(&db_path, id).await,
        Some(Commands::Compact) => cmd_compact(&db_path),
        None => {
            // No subcommand - show the pupil list by default
            cmd_list(&db_path, json_mode, None)
        }
    }
}
