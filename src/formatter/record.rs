use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Source-side severity set, prior to the collapse onto [`Severity`].
///
/// [`Severity`]: super::Severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl SourceLevel {
    /// Parses a level name case-insensitively. Unknown names fall back to
    /// `Info`, which collapses to `INFO` on the wire.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "notice" => Self::Notice,
            "warning" | "warn" => Self::Warning,
            "error" => Self::Error,
            "critical" => Self::Critical,
            "alert" => Self::Alert,
            "emergency" => Self::Emergency,
            _ => Self::Info,
        }
    }
}

/// A context or extra value as supplied by the host application.
///
/// Values that are not JSON-safe are scrubbed by the formatter rather than
/// rejected, so a `handle`/`log` call never fails on a bad value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// Already JSON-safe: scalars, arrays, nested maps. Passes through the
    /// sanitization step unchanged.
    Json(Value),
    /// A structured value with a natural string form, pre-rendered by the
    /// caller. Serialized as its string.
    Stringable(String),
    /// A structured value with no string form. Serialized as `"[OBJECT]"`.
    Object,
    /// A process-local handle (file, socket, ...). Serialized as
    /// `"[RESOURCE]"`.
    Resource,
}

impl ContextValue {
    pub fn stringable(value: impl ToString) -> Self {
        Self::Stringable(value.to_string())
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<u64> for ContextValue {
    fn from(value: u64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

pub type ContextMap = BTreeMap<String, ContextValue>;

/// One structured log event as received from the host application.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub timestamp: DateTime<Utc>,
    pub level: SourceLevel,
    pub message: String,
    pub context: ContextMap,
    pub extra: ContextMap,
}

impl RawRecord {
    pub fn new(level: SourceLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context: ContextMap::new(),
            extra: ContextMap::new(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
