//! Export command - run a chunked fetch and write the records to disk.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wirepull_core::{Credentials, RecordKind};
use wirepull_fetch::{
    CompatApiClient, FetchOrchestrator, FetchSettings, SnapshotStore, StoragePredictor,
};
use wirepull_store::{ExportDocument, SessionCache};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Environment variable fallbacks for credentials.
const ENV_SPACE_URL: &str = "WIREPULL_SPACE_URL";
const ENV_PROJECT_ID: &str = "WIREPULL_PROJECT_ID";
const ENV_API_TOKEN: &str = "WIREPULL_API_TOKEN";

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Record kind to export (messages, calls, faxes, recordings, numbers, bins).
    #[arg(long, short)]
    pub kind: String,

    /// Start of the date range (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// End of the date range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,

    /// Output file path.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Space URL, e.g. example.signalwire.com (or WIREPULL_SPACE_URL).
    #[arg(long)]
    pub space: Option<String>,

    /// Project ID (or WIREPULL_PROJECT_ID).
    #[arg(long)]
    pub project: Option<String>,

    /// API token (or WIREPULL_API_TOKEN).
    #[arg(long)]
    pub token: Option<String>,

    /// Records per page requested from the API.
    #[arg(long, default_value = "1000")]
    pub page_size: u32,

    /// Per-chunk page budget before the chunk is failed.
    #[arg(long, default_value = "200")]
    pub max_pages: u32,

    /// Delay between chunks, in milliseconds.
    #[arg(long, default_value = "1000")]
    pub chunk_delay_ms: u64,

    /// Storage budget in MiB; the run stops early when the projected
    /// export would exceed it.
    #[arg(long)]
    pub quota_mib: Option<u64>,
}

/// Runs the export command.
pub async fn run(args: &ExportArgs, cli: &Cli) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let credentials = resolve_credentials(args)?;
    let formatter = Arc::new(TextFormatter::new(!cli.no_color));
    let quiet = cli.quiet;

    info!(kind = %kind, start = %args.start, end = %args.end, "Starting export");

    let settings = FetchSettings::default()
        .with_page_size(args.page_size)
        .with_max_pages(args.max_pages)
        .with_chunk_delay(Duration::from_millis(args.chunk_delay_ms));
    let mut orchestrator = FetchOrchestrator::new(settings)
        .with_snapshot_store(Arc::new(SessionCache::new()) as Arc<dyn SnapshotStore>);
    if let Some(mib) = args.quota_mib {
        orchestrator = orchestrator.with_predictor(StoragePredictor::with_quota(mib * 1024 * 1024));
    }

    if !quiet {
        let progress_formatter = Arc::clone(&formatter);
        orchestrator.on_progress(move |snapshot| {
            eprintln!("{}", progress_formatter.format_progress(&snapshot));
        });
        let limit_formatter = Arc::clone(&formatter);
        orchestrator.on_storage_limit(move |report| {
            eprintln!("{}", limit_formatter.format_projection(&report.projection));
        });
    }

    // Run-level aborts (bad credentials) arrive through the error
    // callback; stash the failure and surface it after the run.
    let abort: Arc<std::sync::Mutex<Option<String>>> = Arc::default();
    let abort_slot = Arc::clone(&abort);
    orchestrator.on_error(move |failure| {
        if let Ok(mut slot) = abort_slot.lock() {
            *slot = Some(failure.error);
        }
    });

    // First Ctrl-C cancels cooperatively; the in-flight page still lands.
    let control = orchestrator.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling after the current page...");
            control.cancel();
        }
    });

    let client = CompatApiClient::new(kind)?;
    orchestrator
        .start_fetch(&client, &credentials, args.start, args.end)
        .await?;

    if let Some(error) = abort.lock().ok().and_then(|mut slot| slot.take()) {
        bail!("Run aborted: {error}");
    }

    let state = orchestrator.state();
    if orchestrator.control().is_cancelled() {
        if !quiet {
            eprintln!(
                "Cancelled after {} of {} chunks; nothing written.",
                state.completed_count,
                state.total_chunks()
            );
        }
        return Ok(());
    }

    let document = ExportDocument::new(kind, args.start, args.end, state.records.clone());
    document
        .save(&args.output)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if cli.format == OutputFormat::Json {
        let json_formatter = JsonFormatter::new(cli.pretty);
        let value = serde_json::json!({
            "kind": kind,
            "output": args.output,
            "records_written": state.records.len(),
            "storage_limited": state.storage_limited,
            "failed_chunks": state.failed.len(),
            "chunks": JsonFormatter::chunks_value(&state.chunks)?,
        });
        println!("{}", json_formatter.render(&value)?);
        return Ok(());
    }

    if !quiet {
        eprintln!();
        eprintln!("{}", formatter.format_chunk_table(&state.chunks));
        eprintln!();
        let status = if state.storage_limited {
            "partial (storage limit)"
        } else if state.failed.is_empty() {
            "complete"
        } else {
            "complete with failed chunks"
        };
        eprintln!(
            "Wrote {} {} records to {} ({status})",
            state.records.len(),
            kind.display_name(),
            args.output.display()
        );
        if !state.failed.is_empty() {
            eprintln!(
                "{} chunk(s) failed; re-run with a narrower range to fill the gaps.",
                state.failed.len()
            );
        }
    }

    Ok(())
}

/// Maps a CLI kind name to a [`RecordKind`].
fn parse_kind(name: &str) -> Result<RecordKind> {
    let lowered = name.to_ascii_lowercase();
    RecordKind::all()
        .iter()
        .copied()
        .find(|k| k.cli_name() == lowered)
        .with_context(|| {
            let known: Vec<_> = RecordKind::all().iter().map(|k| k.cli_name()).collect();
            format!("Unknown kind '{name}' (expected one of: {})", known.join(", "))
        })
}

/// Builds credentials from flags, falling back to environment variables.
fn resolve_credentials(args: &ExportArgs) -> Result<Credentials> {
    let space = flag_or_env(&args.space, ENV_SPACE_URL);
    let project = flag_or_env(&args.project, ENV_PROJECT_ID);
    let token = flag_or_env(&args.token, ENV_API_TOKEN);

    match (space, project, token) {
        (Some(space), Some(project), Some(token)) => {
            Ok(Credentials::new(project, token, space))
        }
        (space, project, token) => {
            let mut missing = Vec::new();
            if space.is_none() {
                missing.push(format!("--space / {ENV_SPACE_URL}"));
            }
            if project.is_none() {
                missing.push(format!("--project / {ENV_PROJECT_ID}"));
            }
            if token.is_none() {
                missing.push(format!("--token / {ENV_API_TOKEN}"));
            }
            bail!("Missing credentials: {}", missing.join(", "));
        }
    }
}

fn flag_or_env(flag: &Option<String>, var: &str) -> Option<String> {
    flag.clone()
        .or_else(|| std::env::var(var).ok())
        .filter(|s| !s.trim().is_empty())
}
