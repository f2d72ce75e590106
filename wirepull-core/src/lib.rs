// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # wirepull Core
//!
//! Core types and pure logic for the wirepull export engine.
//!
//! This crate provides the foundational abstractions used across all other
//! wirepull crates, including:
//!
//! - Domain models (chunks, records, credentials, pages)
//! - The chunk planner that splits a date range into weekly fetch windows
//! - The analytics summary registry
//! - Error types
//!
//! ## Key Types
//!
//! ### Fetch Units
//! - [`Chunk`] - One date-bounded unit of fetch work
//! - [`ChunkStatus`] - Lifecycle state of a chunk
//! - [`DateWindow`] - Inclusive day-granularity date range
//! - [`plan_chunks`] - Splits a range into 7-day chunks
//!
//! ### Records
//! - [`Record`] - One opaque unit of exported data
//! - [`RecordKind`] - Which API resource a record came from
//! - [`RecordPage`] - One page of records from the remote source
//!
//! ### Summaries
//! - [`SummaryRegistry`] - Data-type-keyed registry of summary builders
//! - [`Summary`] - Metrics, breakdowns, and top lists for a record set

pub mod error;
pub mod models;
pub mod planner;
pub mod summary;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    Chunk, ChunkStatus, Credentials, DateWindow, FailedChunk, Record, RecordKind, RecordPage,
};

// Re-export the planner entry point
pub use planner::plan_chunks;

// Re-export summary types
pub use summary::{Breakdown, Metric, Summary, SummaryBuilder, SummaryRegistry, TopList};
