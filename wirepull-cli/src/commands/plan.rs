//! Plan command - preview the chunk plan for a date range.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use wirepull_core::plan_chunks;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the plan command.
#[derive(Args)]
pub struct PlanArgs {
    /// Start of the date range (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// End of the date range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,
}

/// Runs the plan command.
pub fn run(args: &PlanArgs, cli: &Cli) -> Result<()> {
    let chunks = plan_chunks(args.start, args.end);

    if cli.format == OutputFormat::Json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.render(&JsonFormatter::chunks_value(&chunks)?)?);
        return Ok(());
    }

    if chunks.is_empty() {
        println!("Empty range: start is after end.");
        return Ok(());
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!(
        "{}",
        formatter.bold(&format!(
            "{} chunk(s) for {} → {}",
            chunks.len(),
            args.start,
            args.end
        ))
    );
    println!("{}", formatter.format_chunk_table(&chunks));
    Ok(())
}
