//! Domain models for wirepull.
//!
//! This module contains the data structures shared across the export engine.
//!
//! ## Submodules
//!
//! - [`chunk`] - Fetch units ([`Chunk`], [`ChunkStatus`], [`DateWindow`])
//! - [`record`] - Exported data ([`Record`], [`RecordKind`], [`RecordPage`])
//! - [`credentials`] - API account credentials

mod chunk;
mod credentials;
mod record;

// Re-export everything at the models level
pub use chunk::{Chunk, ChunkStatus, DateWindow, FailedChunk};
pub use credentials::Credentials;
pub use record::{Record, RecordKind, RecordPage};
