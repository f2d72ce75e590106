//! Progress snapshots, run reports, and callback types.
//!
//! The orchestrator is passive towards its caller: it emits nothing unless
//! a handler is registered, and each of the four events has at most one
//! handler.

use std::time::Duration;

use wirepull_core::{Chunk, FailedChunk, Record};

use crate::predictor::StorageProjection;

// ============================================================================
// Event Payloads
// ============================================================================

/// Point-in-time view of a run, delivered on every progress event.
///
/// Carries counts and chunk statuses, not record payloads; the full record
/// set travels only with the terminal reports.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Number of planned chunks.
    pub total_chunks: usize,
    /// Chunks completed so far.
    pub completed_chunks: usize,
    /// The chunk currently being fetched, if any.
    pub current_chunk: Option<Chunk>,
    /// Index of the current chunk, if any.
    pub current_chunk_index: Option<usize>,
    /// Records accumulated so far.
    pub records_fetched: usize,
    /// All chunks with their current statuses.
    pub chunks: Vec<Chunk>,
    /// Time since the run started.
    pub elapsed: Duration,
}

/// Terminal report for a run that visited every chunk.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// All accumulated records, in chunk-completion order.
    pub records: Vec<Record>,
    /// Total record count.
    pub total_records: usize,
    /// Final chunk statuses.
    pub chunks: Vec<Chunk>,
    /// Chunks that failed (retryable afterwards).
    pub failed: Vec<FailedChunk>,
    /// Total run time.
    pub elapsed: Duration,
}

/// Terminal report for a run aborted by an unexpected error.
#[derive(Debug, Clone)]
pub struct RunFailure {
    /// The error message.
    pub error: String,
    /// Chunk statuses at the time of the abort.
    pub chunks: Vec<Chunk>,
    /// Chunks that had failed before the abort.
    pub failed: Vec<FailedChunk>,
}

/// Terminal report for a run stopped early on the storage budget.
///
/// Partial results are valid and usable; the skipped chunks record what was
/// left behind.
#[derive(Debug, Clone)]
pub struct StorageLimitReport {
    /// Records accumulated before the stop.
    pub records: Vec<Record>,
    /// Chunks that were never attempted.
    pub skipped: Vec<Chunk>,
    /// The projection that triggered the stop.
    pub projection: StorageProjection,
    /// All chunks with their final statuses.
    pub chunks: Vec<Chunk>,
    /// Time since the run started.
    pub elapsed: Duration,
}

// ============================================================================
// Callback Types
// ============================================================================

/// Progress event handler.
pub type ProgressHandler = Box<dyn Fn(ProgressSnapshot) + Send + Sync>;
/// Completion event handler.
pub type CompleteHandler = Box<dyn Fn(RunReport) + Send + Sync>;
/// Error event handler.
pub type ErrorHandler = Box<dyn Fn(RunFailure) + Send + Sync>;
/// Storage-limit event handler.
pub type StorageLimitHandler = Box<dyn Fn(StorageLimitReport) + Send + Sync>;

// ============================================================================
// Elapsed Formatting
// ============================================================================

/// Renders an elapsed duration as `2h 3m 4s` / `3m 4s` / `4s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m {}s", minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}
