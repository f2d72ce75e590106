//! Best-effort session progress persistence.
//!
//! After each completed chunk the orchestrator writes a small snapshot of
//! chunk statuses and aggregate counts (never record payloads) so a
//! restarted session can show last-known progress. Snapshots are not read
//! back to resume a run, and write failures are logged and swallowed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wirepull_core::Chunk;

use crate::state::RunState;

/// The persisted progress shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Chunk statuses at save time.
    pub chunks: Vec<Chunk>,
    /// Chunks completed.
    pub completed_chunks: usize,
    /// Chunks failed.
    pub failed_chunks: usize,
    /// Records accumulated (count only).
    pub total_records: usize,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Builds a snapshot of the current run state.
    pub fn from_state(state: &RunState) -> Self {
        Self {
            chunks: state.chunks.clone(),
            completed_chunks: state.completed_count,
            failed_chunks: state.failed.len(),
            total_records: state.records.len(),
            saved_at: Utc::now(),
        }
    }
}

/// Boxed error for snapshot sinks; implementors keep their own error types.
pub type SnapshotError = Box<dyn std::error::Error + Send + Sync>;

/// Sink for session progress snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persists a snapshot, replacing any previous one.
    async fn save(&self, record: &ProgressRecord) -> Result<(), SnapshotError>;

    /// Removes any persisted snapshot.
    async fn clear(&self) -> Result<(), SnapshotError>;
}
