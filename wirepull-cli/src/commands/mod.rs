//! CLI command implementations.

pub mod export;
pub mod plan;
pub mod status;
pub mod summary;
