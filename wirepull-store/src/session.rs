//! Session progress cache.
//!
//! Persists the orchestrator's per-chunk progress snapshots so a later
//! invocation can show where the previous run got to. Snapshots carry
//! statuses and counts only, never record payloads.

use async_trait::async_trait;
use std::path::PathBuf;
use wirepull_fetch::{ProgressRecord, SnapshotError, SnapshotStore};

use crate::error::StoreError;
use crate::persistence::{self, default_session_path};

/// File-backed [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Creates a cache at the default per-user location.
    pub fn new() -> Self {
        Self::at_path(default_session_path())
    }

    /// Creates a cache at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file this cache writes to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Loads the last saved progress, if any.
    pub async fn load_progress(&self) -> Result<Option<ProgressRecord>, StoreError> {
        match persistence::load_json(&self.path).await {
            Ok(record) => Ok(Some(record)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for SessionCache {
    async fn save(&self, record: &ProgressRecord) -> Result<(), SnapshotError> {
        persistence::save_json(&self.path, record).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        persistence::remove_file(&self.path).await?;
        Ok(())
    }
}
