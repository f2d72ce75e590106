// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # wirepull Store
//!
//! Persistence for wirepull.
//!
//! This crate provides:
//!
//! - **ExportDocument**: fetched records written to disk with run metadata
//! - **SessionCache**: file-backed session progress snapshots
//! - **Persistence**: JSON file I/O helpers
//!
//! ## Usage
//!
//! ```ignore
//! use wirepull_store::{ExportDocument, SessionCache};
//!
//! let cache = SessionCache::new();
//! if let Some(progress) = cache.load_progress().await? {
//!     println!("last run: {}/{} chunks", progress.completed_chunks, progress.chunks.len());
//! }
//!
//! let doc = ExportDocument::new(kind, start, end, records);
//! doc.save(&output_path).await?;
//! ```

pub mod error;
pub mod export;
pub mod persistence;
pub mod session;

pub use error::StoreError;
pub use export::ExportDocument;
pub use persistence::{default_cache_dir, default_session_path, load_json, save_json};
pub use session::SessionCache;
