//! HTTP client for the provider's compatibility API.
//!
//! Speaks the `/api/laml/2010-04-01/Accounts/{project}/<Resource>` dialect:
//! HTTP basic auth with project id and API token, `PageSize` plus
//! date-window query parameters, and `next_page_uri` pagination.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;
use wirepull_core::{Record, RecordKind, RecordPage};

use crate::error::FetchError;
use crate::source::{PageRequest, RecordSource};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for wirepull.
const USER_AGENT: &str = concat!("wirepull/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Compat API Client
// ============================================================================

/// [`RecordSource`] implementation for one record kind of the real API.
#[derive(Debug, Clone)]
pub struct CompatApiClient {
    inner: Client,
    kind: RecordKind,
}

impl CompatApiClient {
    /// Creates a client for `kind` with the default timeout.
    pub fn new(kind: RecordKind) -> Result<Self, FetchError> {
        Self::with_timeout(kind, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client for `kind` with a custom timeout.
    pub fn with_timeout(kind: RecordKind, timeout: Duration) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { inner, kind })
    }

    /// The record kind this client fetches.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Builds the URL for one page request.
    ///
    /// A cursor is the `next_page_uri` from the previous page: an
    /// absolute-path URI on the same host, used verbatim. The first page is
    /// built from the resource path; date filter operators (`>=`, `<=`) are
    /// part of the parameter text, so the query is assembled by hand rather
    /// than through an encoder that would escape them.
    fn page_url(&self, request: &PageRequest) -> Result<Url, FetchError> {
        let space = &request.credentials.space_url;

        if let Some(cursor) = &request.cursor {
            let url = format!("https://{space}{cursor}");
            return Url::parse(&url)
                .map_err(|e| FetchError::InvalidResponse(format!("Bad next page URI: {e}")));
        }

        let mut query = format!("PageSize={}", request.page_size);
        if let Some(field) = self.kind.date_filter_field() {
            query.push_str(&format!(
                "&{field}>={}&{field}<={}",
                request.window.start, request.window.end
            ));
        }

        let url = format!(
            "https://{space}/api/laml/2010-04-01/Accounts/{}/{}?{query}",
            request.credentials.project_id,
            self.kind.resource()
        );
        Url::parse(&url).map_err(|e| FetchError::InvalidResponse(format!("Bad request URL: {e}")))
    }

    /// Extracts the records array and pagination fields from a response
    /// body. Resources nest records under their own key; a few responses
    /// use `data` instead, so that is accepted as a fallback.
    fn parse_page(&self, body: serde_json::Value) -> Result<RecordPage, FetchError> {
        let records = body
            .get(self.kind.records_key())
            .or_else(|| body.get("data"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                FetchError::InvalidResponse(format!(
                    "Response has no '{}' array",
                    self.kind.records_key()
                ))
            })?
            .iter()
            .cloned()
            .map(Record::from)
            .collect();

        let next_cursor = body
            .get("next_page_uri")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        Ok(RecordPage {
            records,
            has_more: next_cursor.is_some(),
            next_cursor,
        })
    }
}

#[async_trait]
impl RecordSource for CompatApiClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RecordPage, FetchError> {
        let url = self.page_url(request)?;
        debug!(kind = %self.kind, url = %url, "Fetching page");

        let response = self
            .inner
            .get(url)
            .basic_auth(
                &request.credentials.project_id,
                Some(&request.credentials.api_token),
            )
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::AuthenticationFailed(format!(
                "API rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::InvalidResponse(format!(
                "API error {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let page = self.parse_page(body)?;
        debug!(
            kind = %self.kind,
            records = page.records.len(),
            has_more = page.has_more,
            "Page fetched"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wirepull_core::{Credentials, DateWindow};

    fn request(cursor: Option<&str>) -> PageRequest {
        PageRequest {
            credentials: Credentials::new("proj-1", "token", "example.signalwire.com"),
            window: DateWindow::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            ),
            cursor: cursor.map(ToString::to_string),
            page_size: 1000,
        }
    }

    #[test]
    fn test_first_page_url_carries_date_filters() {
        let client = CompatApiClient::new(RecordKind::Messages).unwrap();
        let url = client.page_url(&request(None)).unwrap();

        assert_eq!(url.host_str(), Some("example.signalwire.com"));
        assert_eq!(
            url.path(),
            "/api/laml/2010-04-01/Accounts/proj-1/Messages.json"
        );
        let query = url.query().unwrap();
        assert!(query.contains("PageSize=1000"));
        assert!(query.contains("DateSent>=2024-01-01"));
        assert!(query.contains("DateSent<=2024-01-07"));
    }

    #[test]
    fn test_cursor_is_used_verbatim() {
        let client = CompatApiClient::new(RecordKind::Messages).unwrap();
        let cursor = "/api/laml/2010-04-01/Accounts/proj-1/Messages.json?Page=1&PageToken=abc";
        let url = client.page_url(&request(Some(cursor))).unwrap();

        assert_eq!(url.host_str(), Some("example.signalwire.com"));
        assert_eq!(url.query(), Some("Page=1&PageToken=abc"));
    }

    #[test]
    fn test_undated_kinds_skip_date_filters() {
        let client = CompatApiClient::new(RecordKind::PhoneNumbers).unwrap();
        let url = client.page_url(&request(None)).unwrap();
        assert_eq!(url.query(), Some("PageSize=1000"));
    }

    #[test]
    fn test_parse_page_reads_resource_key() {
        let client = CompatApiClient::new(RecordKind::Messages).unwrap();
        let page = client
            .parse_page(json!({
                "messages": [{"sid": "SM1"}, {"sid": "SM2"}],
                "next_page_uri": "/api/laml/next",
            }))
            .unwrap();

        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.next_cursor.as_deref(), Some("/api/laml/next"));
    }

    #[test]
    fn test_parse_page_empty_next_uri_means_done() {
        let client = CompatApiClient::new(RecordKind::Calls).unwrap();
        let page = client
            .parse_page(json!({"calls": [], "next_page_uri": ""}))
            .unwrap();

        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_parse_page_without_records_array_is_an_error() {
        let client = CompatApiClient::new(RecordKind::Messages).unwrap();
        let err = client.parse_page(json!({"status": 400})).unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }
}
