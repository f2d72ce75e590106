//! Chunk types.
//!
//! A chunk is one 7-day (or shorter, final) date-bounded unit of fetch work.
//! Chunks are created by the planner and mutated only by the orchestrator;
//! their date bounds never change after planning.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Date Window
// ============================================================================

/// An inclusive date range at day granularity.
///
/// Time-of-day is irrelevant throughout the export engine; all comparisons
/// happen on whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a new window.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered, inclusive of both endpoints.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Chunk Status
// ============================================================================

/// Lifecycle state of a chunk.
///
/// Transitions: `Pending -> InProgress -> {Completed | Failed | Skipped}`.
/// A `Failed` chunk may be re-driven via manual retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStatus {
    /// Not yet processed.
    Pending,
    /// Fetch currently running.
    InProgress,
    /// All pages fetched.
    Completed,
    /// A page request failed; see the chunk's error.
    Failed,
    /// Never attempted because the run stopped early.
    Skipped,
}

impl ChunkStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Returns the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Chunk
// ============================================================================

/// One date-bounded unit of fetch work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// First day of the chunk window.
    pub start: NaiveDate,
    /// Last day of the chunk window (inclusive).
    pub end: NaiveDate,
    /// Current lifecycle state.
    pub status: ChunkStatus,
    /// Number of records fetched for this chunk.
    pub record_count: usize,
    /// Error message from the most recent failed attempt.
    pub error: Option<String>,
}

impl Chunk {
    /// Creates a pending chunk covering `[start, end]`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            status: ChunkStatus::Pending,
            record_count: 0,
            error: None,
        }
    }

    /// The chunk's date window.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start, self.end)
    }

    /// Number of days this chunk covers.
    pub fn span_days(&self) -> i64 {
        self.window().span_days()
    }
}

// ============================================================================
// Failed Chunk
// ============================================================================

/// Entry in the run's failed-chunk list, retaining the chunk's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedChunk {
    /// Index of the chunk in the planned sequence.
    pub index: usize,
    /// Snapshot of the chunk at the time of failure.
    pub chunk: Chunk,
    /// The failure message.
    pub error: String,
}
