//! Text output formatting with progress bars and colors.

use wirepull_core::{Chunk, ChunkStatus, Summary};
use wirepull_fetch::{format_bytes, format_elapsed, ProgressSnapshot, StorageProjection};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 20,
        }
    }

    /// One-line progress readout for a running export.
    pub fn format_progress(&self, snapshot: &ProgressSnapshot) -> String {
        let bar = self.bar(snapshot.completed_chunks, snapshot.total_chunks);
        let current = match (&snapshot.current_chunk, snapshot.current_chunk_index) {
            (Some(chunk), Some(index)) => format!(
                " · fetching #{} ({} → {})",
                index + 1,
                chunk.start,
                chunk.end
            ),
            _ => String::new(),
        };
        format!(
            "{bar} {}/{} chunks · {} records · {}{current}",
            snapshot.completed_chunks,
            snapshot.total_chunks,
            group_thousands(snapshot.records_fetched),
            format_elapsed(snapshot.elapsed),
        )
    }

    /// Chunk table: one row per chunk with status and counts.
    pub fn format_chunk_table(&self, chunks: &[Chunk]) -> String {
        let mut lines = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let status = self.colored_status(chunk.status);
            let mut line = format!(
                "  #{:<3} {} → {}  {status:<10} {:>8} records",
                index + 1,
                chunk.start,
                chunk.end,
                group_thousands(chunk.record_count),
            );
            if let Some(error) = &chunk.error {
                line.push_str(&format!("  {}", self.dim(error)));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Renders an analytics summary.
    pub fn format_summary(&self, summary: &Summary) -> String {
        let mut lines = vec![self.bold(&summary.title), String::new()];

        for metric in &summary.metrics {
            lines.push(format!("  {:<24} {}", metric.label, metric.value));
        }

        for breakdown in &summary.breakdowns {
            lines.push(String::new());
            lines.push(format!("  {}", self.bold(&breakdown.title)));
            for (value, count) in &breakdown.counts {
                lines.push(format!("    {:<22} {}", value, group_thousands(*count)));
            }
        }

        for top in &summary.top_lists {
            lines.push(String::new());
            lines.push(format!("  {}", self.bold(&top.title)));
            for (value, count) in &top.entries {
                lines.push(format!("    {:<22} {}", value, group_thousands(*count)));
            }
        }

        lines.join("\n")
    }

    /// Explains a storage-limited stop.
    pub fn format_projection(&self, projection: &StorageProjection) -> String {
        let mut lines = vec![self.color(YELLOW, projection.reason)];
        lines.push(format!(
            "  estimated total   {} ({:.0}% of budget)",
            format_bytes(projection.estimated_total_bytes),
            projection.usage_percent,
        ));
        lines.push(format!(
            "  fetched so far    {}",
            format_bytes(projection.current_bytes)
        ));
        lines.push(format!(
            "  budget remaining  {}",
            format_bytes(projection.available_bytes)
        ));
        if projection.assumes_uniform_records {
            lines.push(
                self.dim("  (estimate assumes remaining chunks resemble fetched ones)"),
            );
        }
        lines.join("\n")
    }

    /// Progress bar like `[████░░░░░░]`.
    fn bar(&self, done: usize, total: usize) -> String {
        let filled = if total == 0 {
            0
        } else {
            (done * self.bar_width) / total
        };
        let mut bar = String::with_capacity(self.bar_width + 2);
        bar.push('[');
        for i in 0..self.bar_width {
            bar.push(if i < filled { BAR_FULL } else { BAR_EMPTY });
        }
        bar.push(']');
        self.color(CYAN, &bar)
    }

    fn colored_status(&self, status: ChunkStatus) -> String {
        let color = match status {
            ChunkStatus::Completed => GREEN,
            ChunkStatus::Failed => RED,
            ChunkStatus::InProgress => CYAN,
            ChunkStatus::Skipped => YELLOW,
            ChunkStatus::Pending => DIM,
        };
        self.color(color, status.display_name())
    }

    /// Bolds text if colors are enabled.
    pub fn bold(&self, text: &str) -> String {
        self.color(BOLD, text)
    }

    /// Dims text if colors are enabled.
    pub fn dim(&self, text: &str) -> String {
        self.color(DIM, text)
    }

    fn color(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Formats a count with thousands separators: `1204` becomes `1,204`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn chunk(status: ChunkStatus) -> Chunk {
        let mut chunk = Chunk::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        );
        chunk.status = status;
        chunk.record_count = 1204;
        chunk
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1204), "1,204");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_progress_line_without_colors() {
        let formatter = TextFormatter::new(false);
        let line = formatter.format_progress(&ProgressSnapshot {
            total_chunks: 4,
            completed_chunks: 2,
            current_chunk: Some(chunk(ChunkStatus::InProgress)),
            current_chunk_index: Some(2),
            records_fetched: 2408,
            chunks: Vec::new(),
            elapsed: Duration::from_secs(65),
        });

        assert!(line.contains("2/4 chunks"));
        assert!(line.contains("2,408 records"));
        assert!(line.contains("1m 5s"));
        assert!(line.contains("fetching #3"));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn test_chunk_table_shows_errors() {
        let formatter = TextFormatter::new(false);
        let mut failed = chunk(ChunkStatus::Failed);
        failed.error = Some("simulated outage".to_string());

        let table = formatter.format_chunk_table(&[chunk(ChunkStatus::Completed), failed]);
        assert!(table.contains("#1"));
        assert!(table.contains("completed"));
        assert!(table.contains("simulated outage"));
    }
}
