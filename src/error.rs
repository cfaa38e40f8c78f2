//! Public error taxonomy.
//!
//! Only the kinds that are ever surfaced synchronously to a caller live here.
//! `BreakerOpen` and internal transport-failure bookkeeping are private to the
//! retry engine (`crate::dispatcher`) and never escape it: the background
//! pipeline never propagates send failures to producers.

use thiserror::Error;

/// Errors surfaced directly to callers of the public API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Construction-time validation failure: missing endpoint or API key, or
    /// an endpoint that does not parse as a URL.
    #[error("invalid client configuration: {0}")]
    ConfigInvalid(String),

    /// The buffer was already at `max_buffer_size`; the offending record was
    /// dropped and not stored.
    #[error("log buffer is full")]
    BufferFull,

    /// The server responded with a non-2xx status to a query or explicit flush.
    #[error("ingestion API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    /// A cancellation token fired while a query or explicit flush was in flight.
    #[error("operation was cancelled")]
    Cancelled,

    /// A transport-level failure (connection refused, timeout, TLS error, ...)
    /// on an explicit `flush()` or query call. The background retry loop only
    /// counts transport failures via `Metrics::errors`; it never surfaces this.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_config_invalid(&self) -> bool {
        matches!(self, Self::ConfigInvalid(_))
    }

    pub fn is_buffer_full(&self) -> bool {
        matches!(self, Self::BufferFull)
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::ApiError { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
