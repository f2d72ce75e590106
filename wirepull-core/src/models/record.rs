//! Record types.
//!
//! Records are opaque to the export engine: the orchestrator only counts and
//! concatenates them. [`RecordKind`] identifies which API resource a record
//! set came from and carries the per-kind request details.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Record Kind
// ============================================================================

/// The API resources wirepull can export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// SMS/MMS messages.
    Messages,
    /// Voice calls.
    Calls,
    /// Faxes.
    Faxes,
    /// Call recordings.
    Recordings,
    /// Provisioned phone numbers.
    PhoneNumbers,
    /// Hosted content bins.
    Bins,
}

impl RecordKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Messages => "Messages",
            Self::Calls => "Calls",
            Self::Faxes => "Faxes",
            Self::Recordings => "Recordings",
            Self::PhoneNumbers => "Phone Numbers",
            Self::Bins => "Bins",
        }
    }

    /// Returns the CLI name for this kind (lowercase, no spaces).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Calls => "calls",
            Self::Faxes => "faxes",
            Self::Recordings => "recordings",
            Self::PhoneNumbers => "numbers",
            Self::Bins => "bins",
        }
    }

    /// Returns the compatibility-API resource path segment.
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Messages => "Messages.json",
            Self::Calls => "Calls.json",
            Self::Faxes => "Faxes.json",
            Self::Recordings => "Recordings.json",
            Self::PhoneNumbers => "IncomingPhoneNumbers.json",
            Self::Bins => "LamlBins",
        }
    }

    /// Returns the record field used for date filtering, if the resource
    /// supports it. Phone numbers and bins are not date-filterable.
    pub fn date_filter_field(&self) -> Option<&'static str> {
        match self {
            Self::Messages => Some("DateSent"),
            Self::Calls => Some("StartTime"),
            Self::Faxes | Self::Recordings => Some("DateCreated"),
            Self::PhoneNumbers | Self::Bins => None,
        }
    }

    /// Returns the key under which the API nests this resource's records.
    pub fn records_key(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Calls => "calls",
            Self::Faxes => "faxes",
            Self::Recordings => "recordings",
            Self::PhoneNumbers => "incoming_phone_numbers",
            Self::Bins => "laml_bins",
        }
    }

    /// Returns all available record kinds.
    pub fn all() -> &'static [RecordKind] {
        &[
            Self::Messages,
            Self::Calls,
            Self::Faxes,
            Self::Recordings,
            Self::PhoneNumbers,
            Self::Bins,
        ]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Record
// ============================================================================

/// One opaque unit of exported data.
///
/// The engine never interprets record contents beyond counting and
/// serializing them; summary builders read individual fields by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub serde_json::Value);

impl Record {
    /// Reads a string field, if present.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|v| v.as_str())
    }

    /// Reads a numeric field, accepting both JSON numbers and numeric
    /// strings (the API returns prices as strings).
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Record {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

// ============================================================================
// Record Page
// ============================================================================

/// One page of records from the remote paginated source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    /// Records in this page, in source order.
    pub records: Vec<Record>,
    /// Whether the source reports further pages.
    pub has_more: bool,
    /// Opaque cursor for the next page, if any.
    pub next_cursor: Option<String>,
}

impl RecordPage {
    /// A page with no records and no continuation.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }
}
