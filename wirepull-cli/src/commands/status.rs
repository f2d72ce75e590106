//! Status command - show progress saved by the last export run.

use anyhow::Result;
use wirepull_store::SessionCache;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the status command.
pub async fn run(cli: &Cli) -> Result<()> {
    let cache = SessionCache::new();
    let progress = cache.load_progress().await?;

    if cli.format == OutputFormat::Json {
        let formatter = JsonFormatter::new(cli.pretty);
        let value = match &progress {
            Some(p) => JsonFormatter::progress_value(p)?,
            None => serde_json::Value::Null,
        };
        println!("{}", formatter.render(&value)?);
        return Ok(());
    }

    let Some(progress) = progress else {
        println!("No saved session progress.");
        return Ok(());
    };

    let formatter = TextFormatter::new(!cli.no_color);
    println!(
        "{}",
        formatter.bold(&format!(
            "Last run: {}/{} chunks completed, {} failed, {} records",
            progress.completed_chunks,
            progress.chunks.len(),
            progress.failed_chunks,
            progress.total_records,
        ))
    );
    println!("{}", formatter.format_chunk_table(&progress.chunks));
    println!(
        "{}",
        formatter.dim(&format!(
            "saved {}",
            progress.saved_at.format("%Y-%m-%d %H:%M UTC")
        ))
    );
    Ok(())
}
