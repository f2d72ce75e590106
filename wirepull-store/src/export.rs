//! Export documents.
//!
//! A completed (or partial) run is written to disk as a single JSON
//! document: the fetched records plus enough metadata to summarize the
//! file later without re-fetching.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use wirepull_core::{Record, RecordKind};

use crate::error::StoreError;
use crate::persistence;

/// One exported data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// What kind of records this file holds.
    pub kind: RecordKind,
    /// Start of the requested date range.
    pub start: NaiveDate,
    /// End of the requested date range (inclusive).
    pub end: NaiveDate,
    /// When the export was written.
    pub exported_at: DateTime<Utc>,
    /// Number of records; redundant with `records.len()`, kept so the
    /// header is useful without parsing the whole array.
    pub record_count: usize,
    /// The fetched records, in fetch order.
    pub records: Vec<Record>,
}

impl ExportDocument {
    /// Builds a document for a finished run.
    pub fn new(kind: RecordKind, start: NaiveDate, end: NaiveDate, records: Vec<Record>) -> Self {
        Self {
            kind,
            start,
            end,
            exported_at: Utc::now(),
            record_count: records.len(),
            records,
        }
    }

    /// Writes the document to `path` as pretty JSON.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        persistence::save_json(path, self).await
    }

    /// Reads a document back from `path`.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        persistence::load_json(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_export_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("messages.json");

        let doc = ExportDocument::new(
            RecordKind::Messages,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            vec![
                Record(json!({"sid": "SM1", "status": "delivered"})),
                Record(json!({"sid": "SM2", "status": "failed"})),
            ],
        );
        doc.save(&path).await.unwrap();

        let loaded = ExportDocument::load(&path).await.unwrap();
        assert_eq!(loaded.kind, RecordKind::Messages);
        assert_eq!(loaded.record_count, 2);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].get_str("sid"), Some("SM1"));
    }
}
