//! Severity levels for log records.

use std::fmt;

/// Severity of a [`crate::record::LogRecord`].
///
/// Ordered by ascending severity so callers can filter with `>=` comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    /// Wire representation used in the ingest payload and query params.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    /// Tolerant parse: case-insensitive, accepts "warning" and "fatal" as aliases,
    /// and never fails; unrecognized, empty, or absent input maps to `Info`.
    pub fn parse(input: &str) -> LogLevel {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "critical" | "fatal" => LogLevel::Critical,
            _ => LogLevel::Info,
        }
    }

    /// Same as [`LogLevel::parse`] but treats `None` as absent input.
    pub fn parse_opt(input: Option<&str>) -> LogLevel {
        match input {
            Some(s) => LogLevel::parse(s),
            None => LogLevel::Info,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}
