//! Run state and its transitions.
//!
//! All chunk transitions for a run go through the methods here, so the
//! state machine can be exercised in tests without timers or a network.
//! The orchestrator owns one `RunState` per run and is the only mutator.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use wirepull_core::{plan_chunks, Chunk, ChunkStatus, FailedChunk, Record};

/// Complete state of one run.
#[derive(Debug)]
pub struct RunState {
    /// Planned chunks, chronological order.
    pub chunks: Vec<Chunk>,
    /// Accumulated records: chunk-completion order, in-page order within a
    /// chunk.
    pub records: Vec<Record>,
    /// Number of chunks currently in `Completed` status.
    pub completed_count: usize,
    /// Failed chunks, in order of failure.
    pub failed: Vec<FailedChunk>,
    /// Whether the run stopped early on the storage budget.
    pub storage_limited: bool,
    /// When the run started; `None` before the first `start_fetch`.
    pub started_at: Option<Instant>,
}

impl RunState {
    /// Empty state, no run planned.
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            records: Vec::new(),
            completed_count: 0,
            failed: Vec::new(),
            storage_limited: false,
            started_at: None,
        }
    }

    /// Fresh state for a run over `[start, end]`, chunks planned and the
    /// run clock started.
    pub fn plan(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            chunks: plan_chunks(start, end),
            started_at: Some(Instant::now()),
            ..Self::new()
        }
    }

    /// Number of planned chunks.
    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Chunks that were skipped, in order.
    pub fn skipped(&self) -> Vec<Chunk> {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Skipped)
            .cloned()
            .collect()
    }

    /// Marks a chunk in progress and clears any prior error.
    pub fn begin_chunk(&mut self, index: usize) {
        let chunk = &mut self.chunks[index];
        chunk.status = ChunkStatus::InProgress;
        chunk.error = None;
    }

    /// Marks a chunk completed and appends its records to the accumulator.
    ///
    /// Removes the chunk from the failed list if a retry just succeeded.
    /// `completed_count` only moves when the chunk newly reaches
    /// `Completed`, so re-running an already completed chunk keeps the
    /// count equal to the number of completed chunks (the records still
    /// accumulate twice; callers wanting dedup must do it themselves).
    pub fn complete_chunk(&mut self, index: usize, records: Vec<Record>) {
        let chunk = &mut self.chunks[index];
        chunk.status = ChunkStatus::Completed;
        chunk.record_count = records.len();
        chunk.error = None;
        self.records.extend(records);
        self.failed.retain(|f| f.index != index);
        self.recount_completed();
    }

    /// Keeps `completed_count` equal to the number of `Completed` chunks.
    fn recount_completed(&mut self) {
        self.completed_count = self
            .chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Completed)
            .count();
    }

    /// Marks a chunk failed with the given error message.
    ///
    /// Failures are non-fatal to the run; the orchestrator moves on to the
    /// next chunk.
    pub fn fail_chunk(&mut self, index: usize, error: String) {
        let chunk = &mut self.chunks[index];
        chunk.status = ChunkStatus::Failed;
        chunk.error = Some(error.clone());
        self.recount_completed();
        self.failed.retain(|f| f.index != index);
        self.failed.push(FailedChunk {
            index,
            chunk: self.chunks[index].clone(),
            error,
        });
    }

    /// Marks every chunk from `from` onwards as skipped with `reason`,
    /// returning the skipped chunks. Only non-terminal chunks are touched.
    pub fn skip_remaining(&mut self, from: usize, reason: &str) -> Vec<Chunk> {
        let mut skipped = Vec::new();
        for chunk in self.chunks.iter_mut().skip(from) {
            if !chunk.status.is_terminal() {
                chunk.status = ChunkStatus::Skipped;
                chunk.error = Some(reason.to_string());
                skipped.push(chunk.clone());
            }
        }
        self.storage_limited = true;
        skipped
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
