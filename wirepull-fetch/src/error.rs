//! Fetch error types.

use thiserror::Error;

/// Error type for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication rejected by the API.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success response or unexpected response shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `retry_failed_chunk` called with an out-of-range index.
    #[error("Invalid chunk index {index}: run has {chunk_count} chunks")]
    InvalidChunkIndex {
        /// The requested index.
        index: usize,
        /// Number of chunks in the current run.
        chunk_count: usize,
    },

    /// A chunk paged past its budget without the source reporting an end.
    ///
    /// Distinct from a single-page failure: the source kept promising more
    /// pages until the per-chunk cap was reached.
    #[error("Page budget exhausted after {pages} pages for one chunk")]
    PageBudgetExhausted {
        /// Pages fetched before giving up.
        pages: u32,
    },

    /// The run was cancelled while this operation was pending.
    #[error("Run cancelled")]
    Cancelled,

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] wirepull_core::CoreError),
}
