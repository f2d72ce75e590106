//! JSON output formatting for scripting.

use anyhow::Result;
use serde_json::{json, Value};
use wirepull_core::{Chunk, Summary};
use wirepull_fetch::ProgressRecord;

/// JSON formatter with optional pretty-printing.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Renders a value to a JSON string.
    pub fn render(&self, value: &Value) -> Result<String> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        })
    }

    /// Converts a summary to JSON.
    pub fn summary_value(summary: &Summary) -> Value {
        json!({
            "title": summary.title,
            "metrics": summary.metrics.iter().map(|m| json!({
                "label": m.label,
                "value": m.value,
            })).collect::<Vec<_>>(),
            "breakdowns": summary.breakdowns.iter().map(|b| json!({
                "title": b.title,
                "counts": b.counts,
            })).collect::<Vec<_>>(),
            "top_lists": summary.top_lists.iter().map(|t| json!({
                "title": t.title,
                "entries": t.entries,
            })).collect::<Vec<_>>(),
        })
    }

    /// Converts a chunk list to JSON.
    pub fn chunks_value(chunks: &[Chunk]) -> Result<Value> {
        Ok(serde_json::to_value(chunks)?)
    }

    /// Converts a saved progress record to JSON.
    pub fn progress_value(progress: &ProgressRecord) -> Result<Value> {
        Ok(serde_json::to_value(progress)?)
    }
}
