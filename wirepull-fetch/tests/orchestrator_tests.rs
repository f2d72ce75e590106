//! End-to-end orchestrator tests against a mock record source.
//!
//! All runs use zeroed delays; nothing here depends on wall-clock pacing
//! except the pause tests, which assert a lower bound.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tokio::time::sleep;
use wirepull_core::{ChunkStatus, Credentials, Record, RecordPage};
use wirepull_fetch::{
    FetchError, FetchOrchestrator, FetchSettings, PageRequest, ProgressRecord, RecordSource,
    SnapshotError, SnapshotStore, StoragePredictor,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn credentials() -> Credentials {
    Credentials::new("proj", "token", "example.signalwire.com")
}

// ============================================================================
// Mock Source
// ============================================================================

/// Deterministic source: a fixed number of pages and records per chunk,
/// optional per-window failures, optional endless pagination.
struct MockSource {
    records_per_page: usize,
    pages_per_chunk: usize,
    endless: bool,
    fail_windows: Mutex<HashSet<NaiveDate>>,
    windows_seen: Mutex<Vec<NaiveDate>>,
}

impl MockSource {
    fn new(records_per_page: usize, pages_per_chunk: usize) -> Self {
        Self {
            records_per_page,
            pages_per_chunk,
            endless: false,
            fail_windows: Mutex::new(HashSet::new()),
            windows_seen: Mutex::new(Vec::new()),
        }
    }

    fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    fn fail_window(self, start: NaiveDate) -> Self {
        self.fail_windows.lock().unwrap().insert(start);
        self
    }

    fn heal_window(&self, start: NaiveDate) {
        self.fail_windows.lock().unwrap().remove(&start);
    }

    fn first_pages_seen(&self) -> usize {
        self.windows_seen.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RecordPage, FetchError> {
        let page: usize = request
            .cursor
            .as_deref()
            .map_or(1, |c| c.trim_start_matches("page-").parse().unwrap());
        if page == 1 {
            self.windows_seen.lock().unwrap().push(request.window.start);
        }

        if self.fail_windows.lock().unwrap().contains(&request.window.start) {
            return Err(FetchError::InvalidResponse("simulated outage".to_string()));
        }

        let records = (0..self.records_per_page)
            .map(|i| {
                Record(json!({
                    "sid": format!("{}-p{page}-r{i}", request.window.start),
                    "body": "hello",
                }))
            })
            .collect();

        let has_more = self.endless || page < self.pages_per_chunk;
        Ok(RecordPage {
            records,
            has_more,
            next_cursor: has_more.then(|| format!("page-{}", page + 1)),
        })
    }
}

// ============================================================================
// In-memory snapshot store
// ============================================================================

#[derive(Default)]
struct MemorySnapshots {
    saves: AtomicUsize,
    cleared: AtomicBool,
    last: Mutex<Option<ProgressRecord>>,
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn save(&self, record: &ProgressRecord) -> Result<(), SnapshotError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Event capture
// ============================================================================

struct Events {
    completions: Mutex<Vec<wirepull_fetch::RunReport>>,
    errors: Mutex<Vec<wirepull_fetch::RunFailure>>,
    storage_limits: Mutex<Vec<wirepull_fetch::StorageLimitReport>>,
}

impl Events {
    fn capture(orchestrator: &mut FetchOrchestrator) -> Arc<Self> {
        let events = Arc::new(Self {
            completions: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            storage_limits: Mutex::new(Vec::new()),
        });
        let sink = Arc::clone(&events);
        orchestrator.on_complete(move |report| sink.completions.lock().unwrap().push(report));
        let sink = Arc::clone(&events);
        orchestrator.on_error(move |failure| sink.errors.lock().unwrap().push(failure));
        let sink = Arc::clone(&events);
        orchestrator
            .on_storage_limit(move |report| sink.storage_limits.lock().unwrap().push(report));
        events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_completes_with_ordered_records() {
    let source = MockSource::new(50, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    let completions = events.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    let report = &completions[0];

    assert_eq!(report.total_records, 150);
    assert_eq!(report.chunks.len(), 3);
    assert!(report.failed.is_empty());
    assert!(report
        .chunks
        .iter()
        .all(|c| c.status == ChunkStatus::Completed && c.record_count == 50));

    // Accumulation order: chunk completion order, in-page order within.
    assert!(report.records[0].get_str("sid").unwrap().starts_with("2024-01-01"));
    assert!(report.records[50].get_str("sid").unwrap().starts_with("2024-01-08"));
    assert!(report.records[100].get_str("sid").unwrap().starts_with("2024-01-15"));
    assert!(events.errors.lock().unwrap().is_empty());
    assert!(events.storage_limits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_multi_page_chunk_concatenates_pages_in_order() {
    let source = MockSource::new(2, 3);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 3, 1), date(2024, 3, 5))
        .await
        .unwrap();

    let completions = events.completions.lock().unwrap();
    let report = &completions[0];
    assert_eq!(report.total_records, 6);
    let sids: Vec<_> = report
        .records
        .iter()
        .map(|r| r.get_str("sid").unwrap().to_string())
        .collect();
    assert_eq!(
        sids,
        vec![
            "2024-03-01-p1-r0",
            "2024-03-01-p1-r1",
            "2024-03-01-p2-r0",
            "2024-03-01-p2-r1",
            "2024-03-01-p3-r0",
            "2024-03-01-p3-r1",
        ]
    );
}

#[tokio::test]
async fn test_failed_chunk_is_nonfatal() {
    let source = MockSource::new(10, 1).fail_window(date(2024, 1, 8));
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    let completions = events.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    let report = &completions[0];

    assert_eq!(report.chunks[1].status, ChunkStatus::Failed);
    assert_eq!(
        report.chunks[1].error.as_deref(),
        Some("Invalid response: simulated outage")
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.total_records, 20);
    assert_eq!(
        report
            .chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Completed)
            .count(),
        2
    );
}

#[tokio::test]
async fn test_cancel_leaves_later_chunks_pending() {
    let source = MockSource::new(5, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    let control = orchestrator.control();
    orchestrator.on_progress(move |snapshot| {
        if snapshot.completed_chunks == 1 && snapshot.current_chunk.is_none() {
            control.cancel();
        }
    });

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    assert!(events.completions.lock().unwrap().is_empty());
    assert!(events.errors.lock().unwrap().is_empty());
    assert_eq!(source.first_pages_seen(), 1);

    let chunks = &orchestrator.state().chunks;
    assert_eq!(chunks[0].status, ChunkStatus::Completed);
    assert_eq!(chunks[1].status, ChunkStatus::Pending);
    assert_eq!(chunks[2].status, ChunkStatus::Pending);
}

#[tokio::test]
async fn test_cancel_before_start_processes_nothing() {
    let source = MockSource::new(5, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    // reset() inside start_fetch rearms the control handle, so cancel must
    // land after planning; the initial progress event is the first chance.
    let control = orchestrator.control();
    orchestrator.on_progress(move |snapshot| {
        if snapshot.completed_chunks == 0 {
            control.cancel();
        }
    });

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    assert_eq!(source.first_pages_seen(), 0);
    assert!(events.completions.lock().unwrap().is_empty());
    assert!(orchestrator
        .state()
        .chunks
        .iter()
        .all(|c| c.status == ChunkStatus::Pending));
}

#[tokio::test]
async fn test_storage_limit_skips_remaining_chunks() {
    // ~40-byte records, 10 per chunk: the projection after chunk 1 is well
    // past a 1 KiB budget.
    let source = MockSource::new(10, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate())
        .with_predictor(StoragePredictor::with_quota(1024));
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 28))
        .await
        .unwrap();

    let limits = events.storage_limits.lock().unwrap();
    assert_eq!(limits.len(), 1);
    let report = &limits[0];

    assert!(!report.projection.can_complete);
    assert_eq!(report.records.len(), 20);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .all(|c| c.status == ChunkStatus::Skipped
            && c.error.as_deref() == Some("Storage limit reached")));

    // No further fetches were issued and no completion fired.
    assert_eq!(source.first_pages_seen(), 2);
    assert!(events.completions.lock().unwrap().is_empty());
    assert!(orchestrator.state().storage_limited);
}

#[tokio::test]
async fn test_storage_limit_never_triggers_on_final_chunk() {
    let source = MockSource::new(10, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate())
        .with_predictor(StoragePredictor::with_quota(1));
    let events = Events::capture(&mut orchestrator);

    // Two chunks: the predictor would block after chunk 1, but it is the
    // last one, so the run completes normally.
    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 10))
        .await
        .unwrap();

    assert_eq!(events.completions.lock().unwrap().len(), 1);
    assert!(events.storage_limits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_failed_chunk_success_joins_run() {
    let source = MockSource::new(10, 1).fail_window(date(2024, 1, 8));
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();
    assert_eq!(orchestrator.state().failed.len(), 1);

    source.heal_window(date(2024, 1, 8));
    orchestrator
        .retry_failed_chunk(&source, &credentials(), 1)
        .await
        .unwrap();

    let state = orchestrator.state();
    assert!(state.failed.is_empty());
    assert_eq!(state.completed_count, 3);
    assert_eq!(state.chunks[1].status, ChunkStatus::Completed);
    assert_eq!(state.records.len(), 30);
    // Retry is out of band: the earlier completion report is unchanged.
    assert_eq!(events.completions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retry_failure_keeps_chunk_failed() {
    let source = MockSource::new(10, 1).fail_window(date(2024, 1, 8));
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let _events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    let err = orchestrator
        .retry_failed_chunk(&source, &credentials(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));

    let state = orchestrator.state();
    assert_eq!(state.chunks[1].status, ChunkStatus::Failed);
    assert_eq!(state.failed.len(), 1);
    assert_eq!(state.completed_count, 2);
}

#[tokio::test]
async fn test_retry_with_invalid_index_is_rejected() {
    let source = MockSource::new(1, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    let err = orchestrator
        .retry_failed_chunk(&source, &credentials(), 7)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::InvalidChunkIndex {
            index: 7,
            chunk_count: 3
        }
    ));
}

#[tokio::test]
async fn test_page_budget_exhaustion_fails_the_chunk() {
    let source = MockSource::new(1, 1).endless();
    let settings = FetchSettings::immediate().with_max_pages(3);
    let mut orchestrator = FetchOrchestrator::new(settings);
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 2, 1), date(2024, 2, 3))
        .await
        .unwrap();

    // Failure is chunk-scoped: the run still completes.
    let completions = events.completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    let report = &completions[0];
    assert_eq!(report.chunks[0].status, ChunkStatus::Failed);
    assert_eq!(
        report.chunks[0].error.as_deref(),
        Some("Page budget exhausted after 3 pages for one chunk")
    );
}

#[tokio::test]
async fn test_auth_failure_aborts_the_run() {
    struct RejectingSource;

    #[async_trait]
    impl RecordSource for RejectingSource {
        async fn fetch_page(&self, _request: &PageRequest) -> Result<RecordPage, FetchError> {
            Err(FetchError::AuthenticationFailed("401".to_string()))
        }
    }

    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(
            &RejectingSource,
            &credentials(),
            date(2024, 1, 1),
            date(2024, 1, 20),
        )
        .await
        .unwrap();

    let errors = events.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].error.contains("Authentication failed"));
    assert!(events.completions.lock().unwrap().is_empty());

    // Only the first chunk was attempted; the rest were never touched.
    let chunks = &orchestrator.state().chunks;
    assert_eq!(chunks[0].status, ChunkStatus::Failed);
    assert_eq!(chunks[1].status, ChunkStatus::Pending);
}

#[tokio::test]
async fn test_inverted_range_is_immediate_error() {
    let source = MockSource::new(1, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());

    let err = orchestrator
        .start_fetch(&source, &credentials(), date(2024, 2, 1), date(2024, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Core(_)));
}

#[tokio::test]
async fn test_pause_holds_run_until_resume() {
    let source = MockSource::new(5, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    let control = orchestrator.control();
    let pauser = control.clone();
    orchestrator.on_progress(move |snapshot| {
        if snapshot.completed_chunks == 1 && snapshot.current_chunk.is_none() {
            pauser.pause();
        }
    });
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        control.resume();
    });

    let started = Instant::now();
    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(events.completions.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_during_pause_ends_run() {
    let source = MockSource::new(5, 1);
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate());
    let events = Events::capture(&mut orchestrator);

    let control = orchestrator.control();
    let pauser = control.clone();
    orchestrator.on_progress(move |snapshot| {
        if snapshot.completed_chunks == 1 && snapshot.current_chunk.is_none() {
            pauser.pause();
        }
    });
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        control.cancel();
    });

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    assert!(events.completions.lock().unwrap().is_empty());
    assert_eq!(orchestrator.state().chunks[1].status, ChunkStatus::Pending);
}

#[tokio::test]
async fn test_snapshots_written_per_chunk_and_cleared_on_cancel() {
    let source = MockSource::new(5, 1);
    let snapshots = Arc::new(MemorySnapshots::default());
    let mut orchestrator = FetchOrchestrator::new(FetchSettings::immediate())
        .with_snapshot_store(Arc::clone(&snapshots) as Arc<dyn SnapshotStore>);
    let _events = Events::capture(&mut orchestrator);

    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();

    assert_eq!(snapshots.saves.load(Ordering::SeqCst), 3);
    let last = snapshots.last.lock().unwrap().clone().unwrap();
    assert_eq!(last.completed_chunks, 3);
    assert_eq!(last.total_records, 15);
    assert!(!snapshots.cleared.load(Ordering::SeqCst));

    // A cancelled run clears the snapshot once the loop observes it.
    let control = orchestrator.control();
    orchestrator.on_progress(move |snapshot| {
        if snapshot.completed_chunks == 1 && snapshot.current_chunk.is_none() {
            control.cancel();
        }
    });
    orchestrator
        .start_fetch(&source, &credentials(), date(2024, 1, 1), date(2024, 1, 20))
        .await
        .unwrap();
    assert!(snapshots.cleared.load(Ordering::SeqCst));
}
