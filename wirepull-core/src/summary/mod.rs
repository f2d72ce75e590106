//! Analytics summaries over exported record sets.
//!
//! Summaries are dispatched through a registry keyed by [`RecordKind`]
//! rather than a hard-coded conditional, so adding a kind means registering
//! a builder instead of growing a `match`.

use std::collections::HashMap;

use crate::models::{Record, RecordKind};

mod builders;

pub use builders::{CallsSummary, FaxesSummary, GenericSummary, MessagesSummary};

// ============================================================================
// Summary Types
// ============================================================================

/// A single headline metric (e.g. "Total Messages: 1,204").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    /// Metric label.
    pub label: String,
    /// Pre-formatted metric value.
    pub value: String,
}

impl Metric {
    /// Creates a new metric.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Counts per distinct value of one record field, sorted descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    /// Breakdown title (e.g. "Status Breakdown").
    pub title: String,
    /// `(value, count)` pairs, most frequent first.
    pub counts: Vec<(String, usize)>,
}

/// The most frequent values of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopList {
    /// List title (e.g. "Top Senders").
    pub title: String,
    /// `(value, count)` pairs, most frequent first.
    pub entries: Vec<(String, usize)>,
}

/// An analytics summary for one record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Summary title (e.g. "Messages Analytics").
    pub title: String,
    /// Headline metrics.
    pub metrics: Vec<Metric>,
    /// Field breakdowns.
    pub breakdowns: Vec<Breakdown>,
    /// Top-N value lists.
    pub top_lists: Vec<TopList>,
}

// ============================================================================
// Summary Builder Trait
// ============================================================================

/// Builds a [`Summary`] from a record set.
///
/// Builders are pure functions over opaque records; they read fields by name
/// and tolerate records missing those fields.
pub trait SummaryBuilder: Send + Sync {
    /// Builds the summary. Callers guarantee `records` is non-empty.
    fn build(&self, kind: RecordKind, records: &[Record]) -> Summary;
}

// ============================================================================
// Summary Registry
// ============================================================================

/// Registry mapping a [`RecordKind`] to its summary builder.
///
/// Kinds without a registered builder fall back to [`GenericSummary`].
pub struct SummaryRegistry {
    builders: HashMap<RecordKind, Box<dyn SummaryBuilder>>,
    fallback: Box<dyn SummaryBuilder>,
}

impl SummaryRegistry {
    /// Creates an empty registry with only the generic fallback.
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
            fallback: Box::new(GenericSummary),
        }
    }

    /// Creates a registry with builders for all kinds that have one.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RecordKind::Messages, Box::new(MessagesSummary));
        registry.register(RecordKind::Calls, Box::new(CallsSummary));
        registry.register(RecordKind::Faxes, Box::new(FaxesSummary));
        registry
    }

    /// Registers (or replaces) the builder for a kind.
    pub fn register(&mut self, kind: RecordKind, builder: Box<dyn SummaryBuilder>) {
        self.builders.insert(kind, builder);
    }

    /// Summarizes a record set. Returns `None` for an empty set.
    pub fn summarize(&self, kind: RecordKind, records: &[Record]) -> Option<Summary> {
        if records.is_empty() {
            return None;
        }
        let builder = self
            .builders
            .get(&kind)
            .map_or(self.fallback.as_ref(), Box::as_ref);
        Some(builder.build(kind, records))
    }
}

impl Default for SummaryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_set_has_no_summary() {
        let registry = SummaryRegistry::with_defaults();
        assert!(registry.summarize(RecordKind::Messages, &[]).is_none());
    }

    #[test]
    fn test_unregistered_kind_uses_fallback() {
        let registry = SummaryRegistry::with_defaults();
        let records = vec![Record(json!({"sid": "PN1"}))];

        let summary = registry.summarize(RecordKind::PhoneNumbers, &records).unwrap();
        assert_eq!(summary.title, "Phone Numbers Analytics");
    }

    #[test]
    fn test_registered_builder_wins() {
        struct Stub;
        impl SummaryBuilder for Stub {
            fn build(&self, _kind: RecordKind, _records: &[Record]) -> Summary {
                Summary {
                    title: "stub".to_string(),
                    metrics: Vec::new(),
                    breakdowns: Vec::new(),
                    top_lists: Vec::new(),
                }
            }
        }

        let mut registry = SummaryRegistry::new();
        registry.register(RecordKind::Bins, Box::new(Stub));
        let records = vec![Record(json!({}))];

        let summary = registry.summarize(RecordKind::Bins, &records).unwrap();
        assert_eq!(summary.title, "stub");
    }
}
