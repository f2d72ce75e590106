//! Core error types for wirepull.

use thiserror::Error;

/// Core error type for wirepull operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested range start.
        start: chrono::NaiveDate,
        /// Requested range end.
        end: chrono::NaiveDate,
    },

    /// Invalid data from an API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
