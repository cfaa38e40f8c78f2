//! `ClientConfig`: immutable-after-construction client options.

use crate::error::ClientError;
use crate::record::Metadata;

/// Configuration for a [`crate::Client`]. Construct via [`ClientConfig::new`]
/// then adjust fields with the `with_*` builder methods; `Client::new` calls
/// [`ClientConfig::validate`] before doing anything else.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub max_buffer_size: usize,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub breaker_threshold: usize,
    pub breaker_reset_ms: u64,
    pub enable_metrics: bool,
    pub debug: bool,
    pub global_metadata: Metadata,
    pub auto_trace_id: bool,
    pub http_timeout_seconds: u64,
}

impl ClientConfig {
    /// Creates a config with the documented defaults for every field besides
    /// the required `endpoint` and `api_key`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            batch_size: 100,
            flush_interval_ms: 5000,
            max_buffer_size: 10_000,
            max_retries: 3,
            retry_delay_ms: 1000,
            breaker_threshold: 5,
            breaker_reset_ms: 30_000,
            enable_metrics: true,
            debug: false,
            global_metadata: Metadata::new(),
            auto_trace_id: false,
            http_timeout_seconds: 30,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_flush_interval_ms(mut self, ms: u64) -> Self {
        self.flush_interval_ms = ms;
        self
    }

    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    pub fn with_breaker_threshold(mut self, threshold: usize) -> Self {
        self.breaker_threshold = threshold;
        self
    }

    pub fn with_breaker_reset_ms(mut self, ms: u64) -> Self {
        self.breaker_reset_ms = ms;
        self
    }

    pub fn with_enable_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = enabled;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_global_metadata(mut self, metadata: Metadata) -> Self {
        self.global_metadata = metadata;
        self
    }

    pub fn with_auto_trace_id(mut self, enabled: bool) -> Self {
        self.auto_trace_id = enabled;
        self
    }

    pub fn with_http_timeout_seconds(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    /// Validates the required fields and the numeric fields that gate loops.
    /// Does not enforce `max_buffer_size >= batch_size` (expected, not required).
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.endpoint.trim().is_empty() {
            return Err(ClientError::ConfigInvalid("endpoint must not be empty".into()));
        }
        if url::Url::parse(&self.endpoint).is_err() {
            return Err(ClientError::ConfigInvalid(format!("endpoint is not a valid URL: {}", self.endpoint)));
        }
        if self.api_key.trim().is_empty() {
            return Err(ClientError::ConfigInvalid("api_key must not be empty".into()));
        }
        if self.batch_size == 0 {
            return Err(ClientError::ConfigInvalid("batch_size must be >= 1".into()));
        }
        if self.flush_interval_ms == 0 {
            return Err(ClientError::ConfigInvalid("flush_interval_ms must be >= 1".into()));
        }
        if self.max_buffer_size == 0 {
            return Err(ClientError::ConfigInvalid("max_buffer_size must be >= 1".into()));
        }
        if self.max_retries == 0 {
            return Err(ClientError::ConfigInvalid("max_retries must be >= 1".into()));
        }
        if self.retry_delay_ms == 0 {
            return Err(ClientError::ConfigInvalid("retry_delay_ms must be >= 1".into()));
        }
        if self.breaker_threshold == 0 {
            return Err(ClientError::ConfigInvalid("breaker_threshold must be >= 1".into()));
        }
        if self.breaker_reset_ms == 0 {
            return Err(ClientError::ConfigInvalid("breaker_reset_ms must be >= 1".into()));
        }
        if self.http_timeout_seconds == 0 {
            return Err(ClientError::ConfigInvalid("http_timeout_seconds must be >= 1".into()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash stripped, used to build request paths.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ClientConfig::new("https://logs.example.com", "key");
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.flush_interval_ms, 5000);
        assert_eq!(config.max_buffer_size, 10_000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.breaker_threshold, 5);
        assert_eq!(config.breaker_reset_ms, 30_000);
        assert!(config.enable_metrics);
        assert!(!config.debug);
        assert!(!config.auto_trace_id);
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[test]
    fn rejects_empty_endpoint_or_key() {
        assert!(ClientConfig::new("", "key").validate().is_err());
        assert!(ClientConfig::new("https://logs.example.com", "").validate().is_err());
    }

    #[test]
    fn rejects_non_url_endpoint() {
        assert!(ClientConfig::new("not a url", "key").validate().is_err());
    }

    #[test]
    fn rejects_zero_gating_fields() {
        assert!(ClientConfig::new("https://logs.example.com", "key")
            .with_batch_size(0)
            .validate()
            .is_err());
        assert!(ClientConfig::new("https://logs.example.com", "key")
            .with_max_retries(0)
            .validate()
            .is_err());
    }

    #[test]
    fn accepts_a_valid_config() {
        let config = ClientConfig::new("https://logs.example.com/", "key");
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "https://logs.example.com");
    }
}
