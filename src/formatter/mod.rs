mod entry;
mod record;

pub use entry::{Batch, LogEntry, Severity};
pub use record::{ContextMap, ContextValue, RawRecord, SourceLevel};

use chrono::SecondsFormat;
use serde_json::Value;
use std::collections::BTreeMap;

/// Messages longer than this are truncated, the final three characters
/// replaced by `...`.
pub const MAX_MESSAGE_LEN: usize = 8192;
/// Label values are clipped to this many characters before merging.
pub const MAX_LABEL_VALUE_LEN: usize = 64;
/// Labels beyond this count are silently dropped, defaults first in the
/// merge order.
pub const MAX_LABELS: usize = 6;

/// Context keys promoted to labels, in merge order. Extraction consumes
/// them out of the context so they do not also land in metadata.
const LABEL_KEYS: [&str; 3] = ["region", "tenant", "schema_version"];

const ELLIPSIS: &str = "...";
const OBJECT_MARKER: &str = "[OBJECT]";
const RESOURCE_MARKER: &str = "[RESOURCE]";

/// Deterministic, pure transformation from raw records to wire-ready
/// entries.
#[derive(Debug, Clone)]
pub struct LogStackFormatter {
    service_name: String,
    environment: String,
    default_labels: Vec<(String, String)>,
}

impl LogStackFormatter {
    pub fn new(
        service_name: impl Into<String>,
        environment: impl Into<String>,
        default_labels: Vec<(String, String)>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            environment: environment.into(),
            default_labels,
        }
    }

    /// Converts one raw record into its canonical entry.
    ///
    /// Label extraction consumes the recognized context keys; everything
    /// left in context plus all extra fields becomes metadata after the
    /// JSON-safety pass. Never fails: malformed values are sanitized, not
    /// raised.
    pub fn format(&self, record: RawRecord) -> LogEntry {
        let RawRecord {
            timestamp,
            level,
            message,
            mut context,
            extra,
        } = record;

        let labels = self.extract_labels(&mut context);

        context.extend(extra);
        let metadata = sanitize(context);

        LogEntry {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: Severity::from(level),
            message: limit_message(&message),
            service: self.service_name.clone(),
            env: self.environment.clone(),
            labels,
            metadata,
        }
    }

    /// Formats each record independently and wraps the sequence into one
    /// batch envelope in wire order.
    pub fn format_batch(&self, records: impl IntoIterator<Item = RawRecord>) -> Batch {
        Batch::new(records.into_iter().map(|r| self.format(r)).collect())
    }

    /// Defaults first (empty-valued defaults dropped), then the recognized
    /// keys pulled out of context in fixed order, overriding same-named
    /// defaults in place. Capped at [`MAX_LABELS`] in that merge order.
    fn extract_labels(&self, context: &mut ContextMap) -> BTreeMap<String, String> {
        let mut merged: Vec<(String, String)> = self
            .default_labels
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .cloned()
            .collect();

        for key in LABEL_KEYS {
            // Null values stay behind for metadata.
            if matches!(context.get(key), Some(ContextValue::Json(Value::Null))) {
                continue;
            }
            let Some(value) = context.remove(key) else {
                continue;
            };
            let text = truncate_chars(&label_text(&value), MAX_LABEL_VALUE_LEN);
            match merged.iter_mut().find(|(name, _)| name == key) {
                Some(slot) => slot.1 = text,
                None => merged.push((key.to_string(), text)),
            }
        }

        merged.truncate(MAX_LABELS);
        merged.into_iter().collect()
    }
}

fn label_text(value: &ContextValue) -> String {
    match value {
        ContextValue::Json(Value::String(s)) => s.clone(),
        ContextValue::Json(other) => other.to_string(),
        ContextValue::Stringable(s) => s.clone(),
        ContextValue::Object => OBJECT_MARKER.to_string(),
        ContextValue::Resource => RESOURCE_MARKER.to_string(),
    }
}

/// Replaces anything that cannot be represented in JSON with a marker
/// string; JSON-safe values pass through unchanged.
fn sanitize(values: ContextMap) -> BTreeMap<String, Value> {
    values
        .into_iter()
        .map(|(key, value)| {
            let safe = match value {
                ContextValue::Json(v) => v,
                ContextValue::Stringable(s) => Value::String(s),
                ContextValue::Object => Value::String(OBJECT_MARKER.to_string()),
                ContextValue::Resource => Value::String(RESOURCE_MARKER.to_string()),
            };
            (key, safe)
        })
        .collect()
}

fn limit_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_LEN {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_MESSAGE_LEN - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Character-boundary-safe prefix, unlike a byte slice.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn formatter() -> LogStackFormatter {
        LogStackFormatter::new("svc", "production", vec![])
    }

    #[test]
    fn timestamp_has_millisecond_precision_and_utc_suffix() {
        let when = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let entry = formatter().format(RawRecord::new(SourceLevel::Info, "hi").at(when));
        assert_eq!(entry.timestamp, "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn short_messages_are_untouched() {
        let entry = formatter().format(RawRecord::new(SourceLevel::Info, "short"));
        assert_eq!(entry.message, "short");
    }

    #[test]
    fn long_messages_truncate_to_exact_cap_with_ellipsis() {
        let entry = formatter().format(RawRecord::new(SourceLevel::Info, "x".repeat(9000)));
        assert_eq!(entry.message.chars().count(), MAX_MESSAGE_LEN);
        assert!(entry.message.ends_with("..."));
    }

    #[test]
    fn multibyte_label_values_clip_on_char_boundaries() {
        let value: String = "ü".repeat(80);
        let entry = formatter().format(
            RawRecord::new(SourceLevel::Info, "m").with_context("region", value),
        );
        assert_eq!(entry.labels["region"].chars().count(), MAX_LABEL_VALUE_LEN);
    }
}
