//! Read-only query pass-through types.

use crate::level::LogLevel;
use crate::record::LogRecord;
use serde::{Deserialize, Serialize};

/// Filter and pagination options for [`crate::Client::query`]:
/// `service`, `level`, `from`, `to`, `q`, `limit`, `offset`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    /// Range start, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Range end, ISO-8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Free-text search term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the query-string pairs for this filter, in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(service) = &self.service {
            pairs.push(("service", service.clone()));
        }
        if let Some(level) = &self.level {
            pairs.push(("level", level.as_wire_str().to_string()));
        }
        if let Some(from) = &self.from {
            pairs.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            pairs.push(("to", to.clone()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// Response to a [`crate::Client::query`] call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryResponse {
    pub logs: Vec<LogRecord>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Options for [`crate::Client::aggregated_stats`]: `from`, `to`,
/// `interval`, optional `service`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedStatsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Bucket width, e.g. `"1h"`, `"5m"`, `"1d"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl AggregatedStatsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = &self.from {
            pairs.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            pairs.push(("to", to.clone()));
        }
        if let Some(interval) = &self.interval {
            pairs.push(("interval", interval.clone()));
        }
        if let Some(service) = &self.service {
            pairs.push(("service", service.clone()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeseriesBucket {
    pub bucket: String,
    pub total: u64,
    pub by_level: std::collections::BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorCount {
    pub message: String,
    pub count: u64,
}

/// Response to a [`crate::Client::aggregated_stats`] call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregatedStatsResponse {
    pub timeseries: Vec<TimeseriesBucket>,
    pub top_services: Vec<ServiceCount>,
    pub top_errors: Vec<ErrorCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_options_omit_unset_fields() {
        let options = QueryOptions::new().to_query_pairs();
        assert!(options.is_empty());
    }

    #[test]
    fn query_options_build_expected_pairs() {
        let options = QueryOptions { service: Some("api".into()), level: Some(LogLevel::Error), limit: Some(10), ..QueryOptions::new() };
        let pairs = options.to_query_pairs();
        assert_eq!(pairs, vec![("service", "api".to_string()), ("level", "error".to_string()), ("limit", "10".to_string())]);
    }

    #[test]
    fn aggregated_stats_response_round_trips() {
        let response = AggregatedStatsResponse {
            timeseries: vec![TimeseriesBucket { bucket: "2026-07-28T00:00:00Z".into(), total: 5, by_level: Default::default() }],
            top_services: vec![ServiceCount { service: "api".into(), count: 3 }],
            top_errors: vec![ErrorCount { message: "timeout".into(), count: 2 }],
        };
        let json = serde_json::to_string(&response).unwrap();
        let parsed: AggregatedStatsResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
    }
}
