//! HTTP transport: ingest POST and read-only query GETs.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::query::{AggregatedStatsOptions, AggregatedStatsResponse, QueryOptions, QueryResponse};
use crate::record::LogRecord;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Percent-encodes a single path segment (unreserved characters per RFC 3986
/// pass through unchanged; everything else becomes `%XX`). Used for
/// `trace_id` in `GET /api/v1/logs/trace/{trace_id}` since it is caller
/// input, not a constant route fragment.
fn percent_encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Internal outcome of a single batch-send attempt, distinct from
/// [`ClientError`]: the retry engine never surfaces this to a producer,
/// it only uses it to decide whether to retry and what to feed the breaker.
#[derive(Debug)]
pub enum SendOutcome {
    Sent,
    Failed(SendFailure),
}

#[derive(Debug)]
pub enum SendFailure {
    /// Connection, TLS, or timeout failure below the HTTP layer.
    Transport(reqwest::Error),
    /// The server responded with a non-2xx status.
    Status { status: u16, body: String },
}

impl std::fmt::Display for SendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendFailure::Transport(err) => write!(f, "transport error: {err}"),
            SendFailure::Status { status, body } => write!(f, "server returned {status}: {body}"),
        }
    }
}

/// Thin wrapper around a shared `reqwest::Client`, holding only what's needed
/// to build a request: base URL, API key, and the configured timeout.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    /// Trailing-slash-stripped base URL, e.g. `https://logs.example.com`.
    base_url: String,
    api_key: String,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        // Validate once at construction; `join` below reuses the plain string
        // so a base URL that carries its own path (e.g. `.../v2`) is preserved
        // rather than discarded, matching the spec's literal `{base}/path`
        // concatenation rather than RFC 3986 reference resolution.
        Url::parse(config.base_url())
            .map_err(|err| ClientError::ConfigInvalid(format!("endpoint is not a valid URL: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self { http, base_url: config.base_url().to_string(), api_key: config.api_key.clone() })
    }

    fn join(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| ClientError::ConfigInvalid(format!("failed to build request URL: {err}")))
    }

    /// POSTs a batch of records to the ingestion endpoint. Never returns a
    /// public error: the caller (the retry engine in `dispatcher`) decides how
    /// to account for a [`SendFailure`] itself.
    pub async fn post_batch(&self, records: &[LogRecord]) -> SendOutcome {
        let url = match self.join("/api/v1/ingest") {
            Ok(url) => url,
            Err(_) => {
                return SendOutcome::Failed(SendFailure::Status { status: 0, body: "invalid ingest URL".into() })
            }
        };

        let payload = serde_json::json!({ "logs": records });
        let result = self.http.post(url).header("X-API-Key", &self.api_key).json(&payload).send().await;

        match result {
            Ok(response) if response.status().is_success() => SendOutcome::Sent,
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                SendOutcome::Failed(SendFailure::Status { status, body })
            }
            Err(err) => SendOutcome::Failed(SendFailure::Transport(err)),
        }
    }

    /// GETs `/api/v1/logs` with `options` as a query string, racing against
    /// `cancel` if provided.
    pub async fn get_query(
        &self,
        options: &QueryOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<QueryResponse, ClientError> {
        let mut url = self.join("/api/v1/logs")?;
        url.query_pairs_mut().extend_pairs(options.to_query_pairs());
        self.get_json(url, cancel).await
    }

    /// GETs `/api/v1/logs/trace/{trace_id}`, racing against `cancel` if
    /// provided. `trace_id` is percent-encoded as a path segment rather than
    /// interpolated directly.
    pub async fn get_by_trace_id(
        &self,
        trace_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<QueryResponse, ClientError> {
        let url = self.join(&format!("/api/v1/logs/trace/{}", percent_encode_path_segment(trace_id)))?;
        self.get_json(url, cancel).await
    }

    /// GETs `/api/v1/logs/aggregated` with `options` as a query string.
    pub async fn get_aggregated_stats(
        &self,
        options: &AggregatedStatsOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<AggregatedStatsResponse, ClientError> {
        let mut url = self.join("/api/v1/logs/aggregated")?;
        url.query_pairs_mut().extend_pairs(options.to_query_pairs());
        self.get_json(url, cancel).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ClientError> {
        let request = self.http.get(url).header("X-API-Key", &self.api_key).send();

        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ClientError::Cancelled),
                result = request => result?,
            },
            None => request.await?,
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError { status, body });
        }

        response.json::<T>().await.map_err(ClientError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(uri: &str) -> ClientConfig {
        ClientConfig::new(uri, "test-key")
    }

    #[tokio::test]
    async fn post_batch_reports_success_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ingest"))
            .and(header("X-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let records = vec![LogRecord::new("svc", LogLevel::Info, "hi")];
        assert!(matches!(transport.post_batch(&records).await, SendOutcome::Sent));
    }

    #[tokio::test]
    async fn post_batch_reports_failure_on_5xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/api/v1/ingest")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let records = vec![LogRecord::new("svc", LogLevel::Info, "hi")];
        match transport.post_batch(&records).await {
            SendOutcome::Failed(SendFailure::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected Status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_query_returns_parsed_response() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "logs": [], "total": 0, "limit": 50, "offset": 0 });
        Mock::given(method("GET")).and(path("/api/v1/logs")).respond_with(ResponseTemplate::new(200).set_body_json(body)).mount(&server).await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let response = transport.get_query(&QueryOptions::new(), None).await.unwrap();
        assert_eq!(response.total, 0);
    }

    #[tokio::test]
    async fn get_query_maps_non_2xx_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/api/v1/logs")).respond_with(ResponseTemplate::new(500).set_body_string("boom")).mount(&server).await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let err = transport.get_query(&QueryOptions::new(), None).await.unwrap_err();
        assert!(err.is_api_error());
    }

    #[tokio::test]
    async fn get_query_honors_pre_cancelled_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path("/api/v1/logs")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = transport.get_query(&QueryOptions::new(), Some(&token)).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn get_by_trace_id_hits_the_path_encoded_route() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "logs": [], "total": 0, "limit": 0, "offset": 0 });
        Mock::given(method("GET"))
            .and(path("/api/v1/logs/trace/abc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let transport = Transport::new(&config_for(&server.uri())).unwrap();
        let response = transport.get_by_trace_id("abc-123", None).await.unwrap();
        assert_eq!(response.total, 0);
    }

    #[test]
    fn percent_encode_path_segment_escapes_reserved_bytes() {
        assert_eq!(percent_encode_path_segment("abc-123_ABC.~"), "abc-123_ABC.~");
        assert_eq!(percent_encode_path_segment("a/b c"), "a%2Fb%20c");
    }

    #[tokio::test]
    async fn a_base_url_with_its_own_subpath_is_preserved_not_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/tenant-x/api/v1/ingest")).respond_with(ResponseTemplate::new(202)).mount(&server).await;

        let config = config_for(&format!("{}/tenant-x", server.uri()));
        let transport = Transport::new(&config).unwrap();
        let records = vec![LogRecord::new("svc", LogLevel::Info, "hi")];
        assert!(matches!(transport.post_batch(&records).await, SendOutcome::Sent));
    }
}
