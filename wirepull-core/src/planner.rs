//! Chunk planner.
//!
//! Splits a user-given date range into fixed 7-day windows, each an
//! independent unit of fetch work for the orchestrator.

use chrono::{Days, NaiveDate};

use crate::models::Chunk;

/// Splits `[start, end]` into contiguous, non-overlapping chunks of at most
/// 7 days, ordered chronologically. Only the final chunk may be shorter; it
/// is clipped to `end`. `start == end` yields exactly one single-day chunk.
///
/// Callers validate `start <= end` before planning; an inverted range
/// produces an empty plan rather than a panic.
pub fn plan_chunks(start: NaiveDate, end: NaiveDate) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = start;

    while current <= end {
        let chunk_end = current
            .checked_add_days(Days::new(6))
            .unwrap_or(end)
            .min(end);
        chunks.push(Chunk::new(current, chunk_end));

        let Some(next) = current.checked_add_days(Days::new(7)) else {
            break;
        };
        current = next;
    }

    chunks
}
