//! Settings for fetch runs.

use std::time::Duration;

/// Default pause between chunks, pacing requests against the remote API.
const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(1);

/// Default pause between successive pages within a chunk.
const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Default records per page requested from the source.
const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Default per-chunk page budget.
const DEFAULT_MAX_PAGES_PER_CHUNK: u32 = 200;

/// Settings for fetch runs.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Delay between consecutive chunks.
    pub chunk_delay: Duration,
    /// Delay between successive page requests within one chunk.
    pub page_delay: Duration,
    /// Page size requested from the source.
    pub page_size: u32,
    /// Maximum pages fetched for one chunk before the chunk fails with
    /// [`crate::FetchError::PageBudgetExhausted`].
    pub max_pages_per_chunk: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            chunk_delay: DEFAULT_CHUNK_DELAY,
            page_delay: DEFAULT_PAGE_DELAY,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages_per_chunk: DEFAULT_MAX_PAGES_PER_CHUNK,
        }
    }
}

impl FetchSettings {
    /// Settings with all delays zeroed. Used by tests.
    pub fn immediate() -> Self {
        Self {
            chunk_delay: Duration::ZERO,
            page_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Sets the inter-chunk delay.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Sets the intra-chunk page delay.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the per-chunk page budget.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages_per_chunk = pages;
        self
    }
}
