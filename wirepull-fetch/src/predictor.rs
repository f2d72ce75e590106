//! Heuristic storage-budget prediction.
//!
//! After every completed chunk the orchestrator asks the predictor whether
//! finishing the remaining chunks would blow the session cache budget. The
//! estimate assumes uniform record size and uniform record density across
//! chunks; neither is guaranteed, so the projection is a soft signal, never
//! an exact accounting.

use wirepull_core::Record;

/// Default soft capacity budget for the session cache.
const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Fraction of the budget the projection may fill before the run stops.
const DEFAULT_SAFETY_MARGIN: f64 = 0.85;

/// How many leading records are serialized to estimate bytes per record.
const SAMPLE_LEN: usize = 100;

// ============================================================================
// Storage Projection
// ============================================================================

/// Projection of total storage needs for a run in progress.
///
/// Derived and ephemeral: recomputed after every completed chunk, never
/// persisted. The orchestrator only consumes [`can_complete`]; the rest is
/// diagnostic breakdown for display.
///
/// [`can_complete`]: StorageProjection::can_complete
#[derive(Debug, Clone, PartialEq)]
pub struct StorageProjection {
    /// Whether the remaining chunks fit within the budget.
    pub can_complete: bool,
    /// Estimated bytes for the full run (current + remaining).
    pub estimated_total_bytes: u64,
    /// Estimated bytes already accumulated.
    pub current_bytes: u64,
    /// Estimated bytes still to come.
    pub estimated_remaining_bytes: u64,
    /// Budget minus current estimate (saturating).
    pub available_bytes: u64,
    /// Estimated total as a percentage of the budget.
    pub usage_percent: f64,
    /// Estimated records still to come.
    pub estimated_remaining_records: usize,
    /// Observed records per chunk so far.
    pub avg_records_per_chunk: f64,
    /// Human-readable explanation of the verdict.
    pub reason: &'static str,
    /// Always true: the estimate assumes every chunk looks like the ones
    /// seen so far. Callers should discount the projection for highly
    /// variable payloads.
    pub assumes_uniform_records: bool,
}

// ============================================================================
// Storage Predictor
// ============================================================================

/// Predicts whether a run will fit the session cache budget.
#[derive(Debug, Clone)]
pub struct StoragePredictor {
    quota_bytes: u64,
    safety_margin: f64,
}

impl StoragePredictor {
    /// Predictor with the default 5 MiB budget.
    pub fn new() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }

    /// Predictor with a custom budget in bytes.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes,
            ..Self::new()
        }
    }

    /// The configured budget.
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Projects storage needs after chunk `chunk_index` (0-based) of
    /// `total_chunks` completed, given everything accumulated so far.
    ///
    /// Never blocks on chunk zero or an empty accumulator: one chunk is not
    /// enough signal to predict from.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn predict(
        &self,
        records: &[Record],
        chunk_index: usize,
        total_chunks: usize,
    ) -> StorageProjection {
        if chunk_index == 0 || records.is_empty() {
            return StorageProjection {
                can_complete: true,
                estimated_total_bytes: 0,
                current_bytes: 0,
                estimated_remaining_bytes: 0,
                available_bytes: self.quota_bytes,
                usage_percent: 0.0,
                estimated_remaining_records: 0,
                avg_records_per_chunk: 0.0,
                reason: "Insufficient data to predict",
                assumes_uniform_records: true,
            };
        }

        let avg_records_per_chunk = records.len() as f64 / (chunk_index + 1) as f64;
        let remaining_chunks = total_chunks.saturating_sub(chunk_index + 1);
        let estimated_remaining_records =
            (avg_records_per_chunk * remaining_chunks as f64).ceil();

        let avg_record_bytes = Self::avg_record_bytes(records);

        let current_bytes = records.len() as f64 * avg_record_bytes;
        let estimated_remaining_bytes = estimated_remaining_records * avg_record_bytes;
        let estimated_total_bytes = current_bytes + estimated_remaining_bytes;

        let quota = self.quota_bytes as f64;
        let can_complete = estimated_total_bytes < quota * self.safety_margin;

        StorageProjection {
            can_complete,
            estimated_total_bytes: estimated_total_bytes.round() as u64,
            current_bytes: current_bytes.round() as u64,
            estimated_remaining_bytes: estimated_remaining_bytes.round() as u64,
            available_bytes: self
                .quota_bytes
                .saturating_sub(current_bytes.round() as u64),
            usage_percent: estimated_total_bytes / quota * 100.0,
            estimated_remaining_records: estimated_remaining_records as usize,
            avg_records_per_chunk,
            reason: if can_complete {
                "Sufficient space"
            } else {
                "Estimated to exceed storage budget"
            },
            assumes_uniform_records: true,
        }
    }

    /// Average serialized size of one record, from a sample of up to
    /// [`SAMPLE_LEN`] leading records.
    #[allow(clippy::cast_precision_loss)]
    fn avg_record_bytes(records: &[Record]) -> f64 {
        let sample = &records[..records.len().min(SAMPLE_LEN)];
        let serialized = serde_json::to_string(sample).map_or(0, |s| s.len());
        serialized as f64 / sample.len() as f64
    }
}

impl Default for StoragePredictor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Byte Formatting
// ============================================================================

/// Renders a byte count as `512 Bytes`, `1.5 KB`, `2.25 MB`, ...
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[unit])
}
