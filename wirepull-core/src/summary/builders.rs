//! Built-in summary builders.
//!
//! Each builder reads the raw API field names of its record kind; records
//! missing a field simply do not contribute to that metric.

use std::collections::HashMap;

use crate::models::{Record, RecordKind};

use super::{Breakdown, Metric, Summary, SummaryBuilder, TopList};

/// How many entries a top list keeps.
const TOP_LIST_LEN: usize = 5;

// ============================================================================
// Field Helpers
// ============================================================================

/// Counts records per distinct value of `field`, sorted descending.
fn field_breakdown(title: &str, records: &[Record], field: &str) -> Breakdown {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(value) = record.get_str(field) {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Breakdown {
        title: title.to_string(),
        counts,
    }
}

/// The `TOP_LIST_LEN` most frequent values of `field`.
fn top_values(title: &str, records: &[Record], field: &str) -> TopList {
    let mut breakdown = field_breakdown("", records, field);
    breakdown.counts.truncate(TOP_LIST_LEN);
    TopList {
        title: title.to_string(),
        entries: breakdown.counts,
    }
}

/// Sums the `price` field, formatted with the first seen `price_unit`.
fn total_cost(records: &[Record]) -> Metric {
    let total: f64 = records.iter().filter_map(|r| r.get_f64("price")).sum();
    let unit = records
        .iter()
        .find_map(|r| r.get_str("price_unit"))
        .unwrap_or("USD");
    // API prices are negative charges; report the absolute spend.
    Metric::new("Total Cost", format!("{:.4} {unit}", total.abs()))
}

/// Mean of a numeric field over the records that carry it.
#[allow(clippy::cast_precision_loss)]
fn average(records: &[Record], field: &str) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter_map(|r| r.get_f64(field)).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Lexicographic min/max of a date-bearing string field. The API emits
/// RFC 2822 timestamps, so this is approximate but stable for display.
fn date_range(records: &[Record], field: &str) -> Metric {
    let mut dates: Vec<&str> = records.iter().filter_map(|r| r.get_str(field)).collect();
    dates.sort_unstable();
    let value = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "unknown".to_string(),
    };
    Metric::new("Date Range", value)
}

/// Renders a second count as `1h 2m 3s` / `2m 3s` / `3s`.
fn format_duration_secs(total: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = total.max(0.0).round() as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m {}s", minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Summary builder for SMS/MMS messages.
pub struct MessagesSummary;

impl SummaryBuilder for MessagesSummary {
    fn build(&self, _kind: RecordKind, records: &[Record]) -> Summary {
        let mut metrics = vec![
            Metric::new("Total Messages", records.len().to_string()),
            date_range(records, "date_sent"),
            total_cost(records),
        ];
        if let Some(avg) = average(records, "num_segments") {
            metrics.push(Metric::new("Avg Segments", format!("{avg:.2}")));
        }

        Summary {
            title: "Messages Analytics".to_string(),
            metrics,
            breakdowns: vec![
                field_breakdown("Status Breakdown", records, "status"),
                field_breakdown("Direction Breakdown", records, "direction"),
            ],
            top_lists: vec![
                top_values("Top Senders", records, "from"),
                top_values("Top Recipients", records, "to"),
            ],
        }
    }
}

/// Summary builder for voice calls.
pub struct CallsSummary;

impl SummaryBuilder for CallsSummary {
    fn build(&self, _kind: RecordKind, records: &[Record]) -> Summary {
        let mut metrics = vec![
            Metric::new("Total Calls", records.len().to_string()),
            date_range(records, "start_time"),
            total_cost(records),
        ];
        let durations: f64 = records.iter().filter_map(|r| r.get_f64("duration")).sum();
        metrics.push(Metric::new("Total Duration", format_duration_secs(durations)));
        if let Some(avg) = average(records, "duration") {
            metrics.push(Metric::new("Avg Duration", format_duration_secs(avg)));
        }

        Summary {
            title: "Calls Analytics".to_string(),
            metrics,
            breakdowns: vec![
                field_breakdown("Status Breakdown", records, "status"),
                field_breakdown("Direction Breakdown", records, "direction"),
            ],
            top_lists: vec![
                top_values("Top Callers", records, "from"),
                top_values("Top Recipients", records, "to"),
            ],
        }
    }
}

/// Summary builder for faxes.
pub struct FaxesSummary;

impl SummaryBuilder for FaxesSummary {
    fn build(&self, _kind: RecordKind, records: &[Record]) -> Summary {
        let mut metrics = vec![
            Metric::new("Total Faxes", records.len().to_string()),
            date_range(records, "date_created"),
            total_cost(records),
        ];
        if let Some(avg) = average(records, "num_pages") {
            metrics.push(Metric::new("Avg Pages", format!("{avg:.2}")));
        }

        Summary {
            title: "Faxes Analytics".to_string(),
            metrics,
            breakdowns: vec![
                field_breakdown("Status Breakdown", records, "status"),
                field_breakdown("Direction Breakdown", records, "direction"),
            ],
            top_lists: vec![
                top_values("Top Senders", records, "from"),
                top_values("Top Recipients", records, "to"),
            ],
        }
    }
}

/// Fallback builder for kinds without a dedicated summary.
pub struct GenericSummary;

impl SummaryBuilder for GenericSummary {
    fn build(&self, kind: RecordKind, records: &[Record]) -> Summary {
        Summary {
            title: format!("{} Analytics", kind.display_name()),
            metrics: vec![Metric::new(
                format!("Total {}", kind.display_name()),
                records.len().to_string(),
            )],
            breakdowns: Vec::new(),
            top_lists: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(from: &str, status: &str, price: &str) -> Record {
        Record(json!({
            "from": from,
            "to": "+15550001111",
            "status": status,
            "direction": "outbound-api",
            "price": price,
            "price_unit": "USD",
            "num_segments": "1",
            "date_sent": "2024-01-05",
        }))
    }

    #[test]
    fn test_messages_summary_counts_and_costs() {
        let records = vec![
            message("+15551230001", "delivered", "-0.0075"),
            message("+15551230001", "delivered", "-0.0075"),
            message("+15551230002", "failed", "0"),
        ];

        let summary = MessagesSummary.build(RecordKind::Messages, &records);
        assert_eq!(summary.title, "Messages Analytics");
        assert_eq!(summary.metrics[0].value, "3");

        let status = &summary.breakdowns[0];
        assert_eq!(status.counts[0], ("delivered".to_string(), 2));
        assert_eq!(status.counts[1], ("failed".to_string(), 1));

        let senders = &summary.top_lists[0];
        assert_eq!(senders.entries[0], ("+15551230001".to_string(), 2));

        let cost = summary.metrics.iter().find(|m| m.label == "Total Cost").unwrap();
        assert_eq!(cost.value, "0.0150 USD");
    }

    #[test]
    fn test_calls_summary_durations() {
        let records = vec![
            Record(json!({"duration": "65", "status": "completed", "start_time": "a"})),
            Record(json!({"duration": "55", "status": "completed", "start_time": "b"})),
        ];

        let summary = CallsSummary.build(RecordKind::Calls, &records);
        let total = summary
            .metrics
            .iter()
            .find(|m| m.label == "Total Duration")
            .unwrap();
        assert_eq!(total.value, "2m 0s");
        let avg = summary
            .metrics
            .iter()
            .find(|m| m.label == "Avg Duration")
            .unwrap();
        assert_eq!(avg.value, "1m 0s");
    }

    #[test]
    fn test_builders_tolerate_missing_fields() {
        let records = vec![Record(json!({})), Record(json!({"status": "queued"}))];
        let summary = MessagesSummary.build(RecordKind::Messages, &records);
        assert_eq!(summary.metrics[0].value, "2");
        assert_eq!(summary.breakdowns[0].counts.len(), 1);
    }
}
