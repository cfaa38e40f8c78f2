//! Convenient re-exports for common Log Courier types.
pub use crate::{
    Breaker, CircuitState, Client, ClientConfig, ClientError, LogLevel, LogRecord, Metadata,
    Metrics, MetricsRegistry, QueryOptions, QueryResponse, TraceContext,
};
