//! API account credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials for the telephony provider's REST API.
///
/// The project id doubles as the basic-auth username; the API token is the
/// password. The space URL is the account-specific API host, without scheme
/// (e.g. `example.signalwire.com`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Project/account identifier.
    pub project_id: String,
    /// API auth token.
    pub api_token: String,
    /// Account-specific API hostname.
    pub space_url: String,
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(
        project_id: impl Into<String>,
        api_token: impl Into<String>,
        space_url: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            api_token: api_token.into(),
            space_url: space_url.into(),
        }
    }
}

// Manual Debug so the token never lands in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("api_token", &"<redacted>")
            .field("space_url", &self.space_url)
            .finish()
    }
}
