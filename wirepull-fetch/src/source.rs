//! Record source trait.
//!
//! The orchestrator treats the remote API as a black box satisfying exactly
//! this contract: a request carries credentials, a date window, and an
//! optional page cursor; a response is one page of records plus a
//! next-page indicator.

use async_trait::async_trait;
use wirepull_core::{Credentials, DateWindow, RecordPage};

use crate::error::FetchError;

/// One page request against the remote source.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Account credentials.
    pub credentials: Credentials,
    /// Date window being fetched.
    pub window: DateWindow,
    /// Opaque cursor from the previous page, `None` for the first page.
    pub cursor: Option<String>,
    /// Requested page size.
    pub page_size: u32,
}

/// A paginated source of records.
///
/// Implementations are bound to one record kind; the orchestrator never
/// inspects what the records are. The engine does not retry page requests
/// itself: any failure fails the whole chunk.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches one page for the given window.
    async fn fetch_page(&self, request: &PageRequest) -> Result<RecordPage, FetchError>;
}
