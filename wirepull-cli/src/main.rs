// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! wirepull CLI - chunked export of telephony provider data.
//!
//! # Examples
//!
//! ```bash
//! # Export January's messages to a JSON file
//! wirepull export --kind messages --start 2024-01-01 --end 2024-01-31 \
//!     --output january-messages.json
//!
//! # Credentials from the environment
//! export WIREPULL_SPACE_URL=example.signalwire.com
//! export WIREPULL_PROJECT_ID=...
//! export WIREPULL_API_TOKEN=...
//!
//! # Summarize an earlier export
//! wirepull summary january-messages.json
//!
//! # Preview the chunk plan without fetching
//! wirepull plan --start 2024-01-01 --end 2024-03-31
//!
//! # Show where the last run got to
//! wirepull status
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{export, plan, status, summary};

// ============================================================================
// CLI Definition
// ============================================================================

/// wirepull CLI - chunked telephony data export.
#[derive(Parser)]
#[command(name = "wirepull")]
#[command(about = "Export telephony provider records in weekly chunks")]
#[command(long_about = r#"
wirepull exports records from a telephony provider's compatibility API.

Large date ranges are split into 7-day chunks fetched strictly in order,
so a run can be cancelled cleanly with Ctrl-C, failed chunks can be
retried individually, and a storage budget can stop a run early with the
partial results intact.

Record kinds:
  • messages     SMS/MMS messages
  • calls        Voice calls
  • faxes        Faxes
  • recordings   Call recordings
  • numbers      Provisioned phone numbers (no date filter)
  • bins         Hosted content bins (no date filter)

Examples:
  wirepull export --kind messages --start 2024-01-01 --end 2024-01-31 -o out.json
  wirepull summary out.json
  wirepull plan --start 2024-01-01 --end 2024-03-31
"#)]
#[command(version)]
#[command(author = "wirepull Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch records for a date range and write them to a JSON file.
    #[command(visible_alias = "e")]
    Export(export::ExportArgs),

    /// Summarize a previously exported file.
    #[command(visible_alias = "s")]
    Summary(summary::SummaryArgs),

    /// Show the chunk plan for a date range without fetching.
    Plan(plan::PlanArgs),

    /// Show progress saved by the last export run.
    Status,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Bad credentials.
    AuthError = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    // Crate targets are underscored: wirepull_fetch, wirepull_store, ...
    let filter = if verbose {
        EnvFilter::new("wirepull_core=debug,wirepull_fetch=debug,wirepull_store=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Export(args) => export::run(args, &cli).await,
        Commands::Summary(args) => summary::run(args, &cli).await,
        Commands::Plan(args) => plan::run(args, &cli),
        Commands::Status => status::run(&cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        let auth_failure = e
            .downcast_ref::<wirepull_fetch::FetchError>()
            .is_some_and(|f| matches!(f, wirepull_fetch::FetchError::AuthenticationFailed(_)))
            || e.to_string().contains("Authentication failed");
        let code = if auth_failure {
            ExitCode::AuthError
        } else {
            ExitCode::Error
        };
        std::process::exit(code as i32);
    }

    Ok(())
}
