//! Summary command - analytics over a previously exported file.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use wirepull_core::SummaryRegistry;
use wirepull_store::ExportDocument;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// An export file written by `wirepull export`.
    pub input: PathBuf,
}

/// Runs the summary command.
pub async fn run(args: &SummaryArgs, cli: &Cli) -> Result<()> {
    let document = ExportDocument::load(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let registry = SummaryRegistry::with_defaults();
    let summary = registry.summarize(document.kind, &document.records);

    if cli.format == OutputFormat::Json {
        let formatter = JsonFormatter::new(cli.pretty);
        let value = json!({
            "kind": document.kind,
            "start": document.start,
            "end": document.end,
            "record_count": document.record_count,
            "summary": summary.as_ref().map(JsonFormatter::summary_value),
        });
        println!("{}", formatter.render(&value)?);
        return Ok(());
    }

    let formatter = TextFormatter::new(!cli.no_color);
    match summary {
        Some(summary) => {
            println!("{}", formatter.format_summary(&summary));
            println!();
            println!(
                "{}",
                formatter.dim(&format!(
                    "{} records · {} → {} · exported {}",
                    document.record_count,
                    document.start,
                    document.end,
                    document.exported_at.format("%Y-%m-%d %H:%M UTC"),
                ))
            );
        }
        None => {
            println!(
                "No {} records in {} → {}.",
                document.kind.display_name(),
                document.start,
                document.end
            );
        }
    }

    Ok(())
}
