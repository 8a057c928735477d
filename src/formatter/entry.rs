use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::record::SourceLevel;

/// Canonical five-value severity used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl From<SourceLevel> for Severity {
    fn from(level: SourceLevel) -> Self {
        match level {
            SourceLevel::Debug => Self::Debug,
            SourceLevel::Info | SourceLevel::Notice => Self::Info,
            SourceLevel::Warning => Self::Warn,
            SourceLevel::Error | SourceLevel::Critical => Self::Error,
            SourceLevel::Alert | SourceLevel::Emergency => Self::Fatal,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

/// Canonical, wire-ready representation of one log event.
///
/// Built once by the formatter and immutable afterwards; owned by the
/// handler's buffer until flushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC, millisecond precision, ISO-8601 (`YYYY-MM-DDTHH:mm:ss.sssZ`).
    pub timestamp: String,
    pub level: Severity,
    pub message: String,
    pub service: String,
    pub env: String,
    /// Always serializes as a JSON object, `{}` when empty. Consumers key
    /// on object semantics.
    pub labels: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, Value>,
}

/// An ordered batch of entries plus the idempotency id it is delivered
/// under. Entry order is arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    id: String,
    entries: Vec<LogEntry>,
}

impl Batch {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entries,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}
