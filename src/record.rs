//! `LogRecord` and error-value serialization.

use crate::level::LogLevel;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from string keys to arbitrary JSON-compatible values. Insertion
/// order is not meaningful here, so a plain `serde_json::Map` (which is
/// `BTreeMap`-backed without the `preserve_order` feature) is sufficient.
pub type Metadata = Map<String, Value>;

/// A single structured log entry. Every field except `trace_id` and
/// (allowed-empty) `metadata` is populated by the time a record leaves the
/// client facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub service: String,
    pub level: LogLevel,
    pub message: String,
    /// ISO-8601 UTC timestamp, set by the facade when the caller leaves it empty.
    #[serde(rename = "time")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl LogRecord {
    /// Builds a record with the current UTC time as its timestamp and no
    /// metadata or trace id, the shape produced by the `debug`/`info`/...
    /// convenience helpers before enrichment.
    pub fn new(service: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            level,
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            metadata: Metadata::new(),
            trace_id: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

/// Custom `serde::Serialize`/`Deserialize` for [`LogLevel`] using its wire
/// strings, derived manually here because the enum lives outside `serde`'s
/// reach for auto-derived snake_case (the wire form has aliases on parse that
/// a plain `#[serde(rename_all)]` can't express).
impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LogLevel::parse(&s))
    }
}

/// Nested error serialization produced for the metadata key `"error"`.
///
/// Rust has no reliable runtime type name for an arbitrary `dyn Error`, so
/// `name` is a caller-supplied label rather than an introspected type. `stack`
/// is always absent: Rust errors do not carry backtraces unless the caller
/// captured one explicitly, which is out of scope here. `cause` recurses
/// through `std::error::Error::source()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorValue>>,
}

impl ErrorValue {
    /// Captures `err` under `name`, recursing through `source()` for `cause`.
    pub fn capture(name: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            name: name.into(),
            message: err.to_string(),
            stack: None,
            cause: err.source().map(|source| Box::new(ErrorValue::capture("cause", source))),
        }
    }

    /// Serializes this value to a `serde_json::Value`, for insertion under the
    /// `"error"` metadata key.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
