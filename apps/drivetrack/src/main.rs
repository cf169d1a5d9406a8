//! # Drivetrack - Pupil Progress Tracker
//!
//! The main binary for the Drivetrack driving-school admin tool.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) over the pupil roster
//! - CLI interface for list/card operations
//! - Mail dispatch of formatted progress reports
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! drivetrack serve --host 0.0.0.0 --port 4000
//!
//! # CLI operations
//! drivetrack list --search hughes
//! drivetrack add -f Amy -l Hughes -e amy@example.com
//! drivetrack set-stage 1 --skill "Gear Changing" --stage Independent
//! drivetrack report 1
//! ```

use clap::Parser;
use drivetrack::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Load .env (mail credentials, PORT, database path) if present.
    dotenvy::dotenv().ok();

    // Initialize tracing — DRIVETRACK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DRIVETRACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "drivetrack=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Drivetrack startup banner.
fn print_banner() {
    println!(
        r#"
  ██████╗ ██████╗ ██╗██╗   ██╗███████╗████████╗██████╗  █████╗  ██████╗██╗  ██╗
  ██╔══██╗██╔══██╗██║██║   ██║██╔════╝╚══██╔══╝██╔══██╗██╔══██╗██╔════╝██║ ██╔╝
  ██║  ██║██████╔╝██║██║   ██║█████╗     ██║   ██████╔╝███████║██║     █████╔╝
  ██║  ██║██╔══██╗██║╚██╗ ██╔╝██╔══╝     ██║   ██╔══██╗██╔══██║██║     ██╔═██╗
  ██████╔╝██║  ██║██║ ╚████╔╝ ███████╗   ██║   ██║  ██║██║  ██║╚██████╗██║  ██╗
  ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═══╝  ╚══════╝   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝

  Pupil Progress Tracker v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
