//! The chunked fetch orchestrator.
//!
//! Drives planned chunks strictly in order against a [`RecordSource`], one
//! chunk and one page in flight at a time. Pausing and cancelling are
//! cooperative: both are observed at the await points between pages and
//! chunks, never mid-request. After every completed chunk the storage
//! predictor decides whether the run may continue; failures stay isolated
//! to their chunk and can be retried individually afterwards.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wirepull_core::{CoreError, Credentials, DateWindow, Record};

use crate::control::ControlHandle;
use crate::error::FetchError;
use crate::predictor::{StoragePredictor, StorageProjection};
use crate::progress::{
    CompleteHandler, ErrorHandler, ProgressHandler, ProgressSnapshot, RunFailure, RunReport,
    StorageLimitHandler, StorageLimitReport,
};
use crate::settings::FetchSettings;
use crate::snapshot::{ProgressRecord, SnapshotStore};
use crate::source::{PageRequest, RecordSource};
use crate::state::RunState;

/// Reason recorded on chunks skipped by a storage-limited stop.
const STORAGE_LIMIT_REASON: &str = "Storage limit reached";

/// How a run's main loop ended.
enum RunEnd {
    /// Every chunk reached a terminal status.
    Completed,
    /// Cancellation was observed; remaining chunks untouched.
    Cancelled,
    /// The predictor stopped the run early.
    StorageLimited(StorageProjection),
}

// ============================================================================
// Fetch Orchestrator
// ============================================================================

/// Sequentially fetches planned chunks with pause/resume/cancel, per-chunk
/// retry, and a storage-budget early stop.
///
/// One orchestrator handles one run at a time: `start_fetch` borrows the
/// orchestrator exclusively for the whole run, so pause/resume/cancel from
/// another task go through a cloned [`ControlHandle`] (see
/// [`FetchOrchestrator::control`]).
pub struct FetchOrchestrator {
    settings: FetchSettings,
    predictor: StoragePredictor,
    control: ControlHandle,
    state: RunState,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    on_progress: Option<ProgressHandler>,
    on_complete: Option<CompleteHandler>,
    on_error: Option<ErrorHandler>,
    on_storage_limit: Option<StorageLimitHandler>,
}

impl FetchOrchestrator {
    /// Creates an orchestrator with the given settings and a default
    /// storage predictor.
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            predictor: StoragePredictor::new(),
            control: ControlHandle::new(),
            state: RunState::new(),
            snapshots: None,
            on_progress: None,
            on_complete: None,
            on_error: None,
            on_storage_limit: None,
        }
    }

    /// Replaces the storage predictor.
    pub fn with_predictor(mut self, predictor: StoragePredictor) -> Self {
        self.predictor = predictor;
        self
    }

    /// Attaches a best-effort session snapshot store.
    pub fn with_snapshot_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    // ------------------------------------------------------------------
    // Callback registration (at most one handler per event)
    // ------------------------------------------------------------------

    /// Registers the progress handler.
    pub fn on_progress(&mut self, handler: impl Fn(ProgressSnapshot) + Send + Sync + 'static) {
        self.on_progress = Some(Box::new(handler));
    }

    /// Registers the completion handler.
    pub fn on_complete(&mut self, handler: impl Fn(RunReport) + Send + Sync + 'static) {
        self.on_complete = Some(Box::new(handler));
    }

    /// Registers the run-error handler.
    pub fn on_error(&mut self, handler: impl Fn(RunFailure) + Send + Sync + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    /// Registers the storage-limit handler.
    pub fn on_storage_limit(
        &mut self,
        handler: impl Fn(StorageLimitReport) + Send + Sync + 'static,
    ) {
        self.on_storage_limit = Some(Box::new(handler));
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    /// Returns a cloneable handle for controlling an active run from
    /// another task.
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    /// Requests a pause; takes effect at the next chunk/page boundary.
    pub fn pause(&self) {
        self.control.pause();
    }

    /// Lifts a pause.
    pub fn resume(&self) {
        self.control.resume();
    }

    /// Cancels the run permanently. The run loop clears any persisted
    /// progress snapshot once it observes the cancellation.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Abandons any run state and rearms the control handle.
    pub fn reset(&mut self) {
        self.state = RunState::new();
        self.control.reset();
    }

    // ------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------

    /// The current run state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// A progress snapshot for polling callers.
    pub fn progress(&self) -> ProgressSnapshot {
        self.snapshot(None)
    }

    /// Estimated time to finish the remaining chunks, from the average
    /// time per completed chunk. `None` until the first chunk completes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn estimated_time_remaining(&self) -> Option<Duration> {
        self.state.started_at?;
        let completed = self.state.completed_count;
        if completed == 0 {
            return None;
        }
        let remaining = self.state.total_chunks() - completed;
        let avg = self.state.elapsed() / completed as u32;
        Some(avg * remaining as u32)
    }

    // ------------------------------------------------------------------
    // Run loop
    // ------------------------------------------------------------------

    /// Runs a full fetch over `[start, end]`.
    ///
    /// Resets all prior run state, plans chunks, then drives them in
    /// order. Terminal conditions are reported through the registered
    /// callbacks: completion, storage limit, or run error fire exactly
    /// once; a cancelled run fires nothing further. Chunk failures are
    /// non-fatal, but an authentication failure aborts the run through
    /// `on_error`. The returned `Result` only covers immediate misuse (an
    /// inverted date range).
    pub async fn start_fetch(
        &mut self,
        source: &dyn RecordSource,
        credentials: &Credentials,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), FetchError> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end }.into());
        }

        self.reset();
        self.state = RunState::plan(start, end);
        info!(
            total_chunks = self.state.total_chunks(),
            %start,
            %end,
            "Starting fetch run"
        );
        self.emit_progress(None);

        match self.process_chunks(source, credentials).await {
            Ok(RunEnd::Completed) => {
                info!(
                    completed = self.state.completed_count,
                    failed = self.state.failed.len(),
                    records = self.state.records.len(),
                    "Run completed"
                );
                if let Some(handler) = &self.on_complete {
                    handler(self.run_report());
                }
            }
            Ok(RunEnd::Cancelled) => {
                info!("Run cancelled");
                self.clear_snapshot().await;
            }
            Ok(RunEnd::StorageLimited(projection)) => {
                if let Some(handler) = &self.on_storage_limit {
                    handler(StorageLimitReport {
                        records: self.state.records.clone(),
                        skipped: self.state.skipped(),
                        projection,
                        chunks: self.state.chunks.clone(),
                        elapsed: self.state.elapsed(),
                    });
                }
            }
            Err(err) => {
                warn!(error = %err, "Run aborted");
                if let Some(handler) = &self.on_error {
                    handler(RunFailure {
                        error: err.to_string(),
                        chunks: self.state.chunks.clone(),
                        failed: self.state.failed.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-resolves exactly one chunk out of band from the main loop.
    ///
    /// Success removes the chunk from the failed list; failure re-marks it
    /// failed with the new error and returns it. No storage prediction and
    /// no inter-chunk delay: this is a standalone unit of work.
    pub async fn retry_failed_chunk(
        &mut self,
        source: &dyn RecordSource,
        credentials: &Credentials,
        index: usize,
    ) -> Result<(), FetchError> {
        let chunk_count = self.state.total_chunks();
        if index >= chunk_count {
            return Err(FetchError::InvalidChunkIndex { index, chunk_count });
        }

        info!(chunk = index, "Retrying chunk");
        self.state.begin_chunk(index);
        self.emit_progress(Some(index));
        let window = self.state.chunks[index].window();

        match self.fetch_chunk(source, credentials, window).await {
            Ok(records) => {
                self.state.complete_chunk(index, records);
                self.save_snapshot().await;
                self.emit_progress(None);
                Ok(())
            }
            Err(err) => {
                self.state.fail_chunk(index, err.to_string());
                self.emit_progress(None);
                Err(err)
            }
        }
    }

    /// Drives every chunk to a terminal status, in order.
    async fn process_chunks(
        &mut self,
        source: &dyn RecordSource,
        credentials: &Credentials,
    ) -> Result<RunEnd, FetchError> {
        let total = self.state.total_chunks();

        for index in 0..total {
            if self.control.is_cancelled() {
                return Ok(RunEnd::Cancelled);
            }
            if self.control.wait_if_paused().await.is_err() {
                return Ok(RunEnd::Cancelled);
            }

            self.state.begin_chunk(index);
            self.emit_progress(Some(index));
            let window = self.state.chunks[index].window();

            match self.fetch_chunk(source, credentials, window).await {
                Ok(records) => {
                    debug!(chunk = index, records = records.len(), "Chunk completed");
                    self.state.complete_chunk(index, records);
                    self.save_snapshot().await;

                    let projection = self.predictor.predict(&self.state.records, index, total);
                    if !projection.can_complete && index < total - 1 {
                        warn!(
                            chunk = index,
                            estimated_total_bytes = projection.estimated_total_bytes,
                            "Stopping early: projected to exceed storage budget"
                        );
                        self.state.skip_remaining(index + 1, STORAGE_LIMIT_REASON);
                        self.emit_progress(None);
                        return Ok(RunEnd::StorageLimited(projection));
                    }
                }
                Err(FetchError::Cancelled) => return Ok(RunEnd::Cancelled),
                // Bad credentials fail every chunk identically; abort the
                // run instead of recording the same failure N times.
                Err(err @ FetchError::AuthenticationFailed(_)) => {
                    self.state.fail_chunk(index, err.to_string());
                    return Err(err);
                }
                Err(err) => {
                    warn!(chunk = index, error = %err, "Chunk failed");
                    self.state.fail_chunk(index, err.to_string());
                }
            }

            self.emit_progress(None);
            if index < total - 1 {
                sleep(self.settings.chunk_delay).await;
            }
        }

        Ok(RunEnd::Completed)
    }

    /// Pages through the source for one chunk window.
    ///
    /// Pagination continues until the source reports no more pages or the
    /// per-chunk page budget runs out. Any page failure fails the whole
    /// chunk; there is no per-page retry here.
    async fn fetch_chunk(
        &self,
        source: &dyn RecordSource,
        credentials: &Credentials,
        window: DateWindow,
    ) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages: u32 = 0;

        loop {
            self.control
                .wait_if_paused()
                .await
                .map_err(|_| FetchError::Cancelled)?;
            if pages >= self.settings.max_pages_per_chunk {
                return Err(FetchError::PageBudgetExhausted { pages });
            }

            let request = PageRequest {
                credentials: credentials.clone(),
                window,
                cursor: cursor.take(),
                page_size: self.settings.page_size,
            };
            let page = source.fetch_page(&request).await?;
            pages += 1;
            records.extend(page.records);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
            sleep(self.settings.page_delay).await;
        }

        Ok(records)
    }

    // ------------------------------------------------------------------
    // Event and snapshot plumbing
    // ------------------------------------------------------------------

    fn snapshot(&self, current_chunk_index: Option<usize>) -> ProgressSnapshot {
        ProgressSnapshot {
            total_chunks: self.state.total_chunks(),
            completed_chunks: self.state.completed_count,
            current_chunk: current_chunk_index.map(|i| self.state.chunks[i].clone()),
            current_chunk_index,
            records_fetched: self.state.records.len(),
            chunks: self.state.chunks.clone(),
            elapsed: self.state.elapsed(),
        }
    }

    fn emit_progress(&self, current_chunk_index: Option<usize>) {
        if let Some(handler) = &self.on_progress {
            handler(self.snapshot(current_chunk_index));
        }
    }

    fn run_report(&self) -> RunReport {
        RunReport {
            records: self.state.records.clone(),
            total_records: self.state.records.len(),
            chunks: self.state.chunks.clone(),
            failed: self.state.failed.clone(),
            elapsed: self.state.elapsed(),
        }
    }

    /// Writes the session snapshot; failures are logged and swallowed.
    async fn save_snapshot(&self) {
        let Some(store) = &self.snapshots else {
            return;
        };
        let record = ProgressRecord::from_state(&self.state);
        if let Err(err) = store.save(&record).await {
            warn!(error = %err, "Failed to save progress snapshot");
        }
    }

    /// Clears the session snapshot; failures are logged and swallowed.
    async fn clear_snapshot(&self) {
        let Some(store) = &self.snapshots else {
            return;
        };
        if let Err(err) = store.clear().await {
            warn!(error = %err, "Failed to clear progress snapshot");
        }
    }
}

impl Default for FetchOrchestrator {
    fn default() -> Self {
        Self::new(FetchSettings::default())
    }
}
