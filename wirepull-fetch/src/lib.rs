// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # wirepull Fetch
//!
//! The chunked fetch engine for wirepull.
//!
//! A run splits a date range into weekly chunks (planned in
//! `wirepull-core`), then drives them strictly in order against a paginated
//! record source, one chunk and one page in flight at a time.
//!
//! ## Modules
//!
//! - [`orchestrator`] - The run loop: sequential chunk fetches with
//!   pause/resume/cancel, per-chunk retry, and early storage-limited stop
//! - [`source`] - The [`source::RecordSource`] trait the orchestrator
//!   consumes
//! - [`client`] - [`client::CompatApiClient`], the real HTTP implementation
//! - [`control`] - Cooperative pause/cancel handle
//! - [`state`] - Run state and its pure transition functions
//! - [`predictor`] - Heuristic storage-budget projection
//! - [`progress`] - Progress snapshots, run reports, and callbacks
//! - [`snapshot`] - Best-effort session progress persistence trait
//!
//! ## Example
//!
//! ```ignore
//! use wirepull_fetch::{CompatApiClient, FetchOrchestrator, FetchSettings};
//!
//! let mut orchestrator = FetchOrchestrator::new(FetchSettings::default());
//! orchestrator.on_complete(|report| {
//!     println!("fetched {} records", report.total_records);
//! });
//!
//! let client = CompatApiClient::new(RecordKind::Messages)?;
//! orchestrator.start_fetch(&client, &credentials, start, end).await?;
//! ```

pub mod client;
pub mod control;
pub mod error;
pub mod orchestrator;
pub mod predictor;
pub mod progress;
pub mod settings;
pub mod snapshot;
pub mod source;
pub mod state;

pub use client::CompatApiClient;
pub use control::{Cancelled, ControlHandle, ControlState};
pub use error::FetchError;
pub use orchestrator::FetchOrchestrator;
pub use predictor::{format_bytes, StoragePredictor, StorageProjection};
pub use progress::{format_elapsed, ProgressSnapshot, RunFailure, RunReport, StorageLimitReport};
pub use settings::FetchSettings;
pub use snapshot::{ProgressRecord, SnapshotError, SnapshotStore};
pub use source::{PageRequest, RecordSource};
pub use state::RunState;
