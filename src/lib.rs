#![forbid(unsafe_code)]

//! # Log Courier
//!
//! Client-side log shipping: callers push structured log records into a
//! bounded in-memory buffer; a background scheduler drains it on a size or
//! time trigger and ships the batch to a remote ingestion endpoint over HTTP,
//! retrying transient failures with exponential backoff behind a circuit
//! breaker. A read-only query API passes through to the same endpoint for
//! retrieving previously shipped logs.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use logcourier::{Client, ClientConfig, LogLevel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://logs.example.com", "api-key")
//!         .with_batch_size(50)
//!         .with_flush_interval_ms(2000);
//!     let client = Client::new(config)?;
//!
//!     client.log("checkout-service", LogLevel::Info, "order placed")?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

mod backoff;
mod breaker;
mod buffer;
mod client;
mod config;
mod dispatcher;
mod error;
mod level;
mod metrics;
mod query;
mod record;
mod sleeper;
mod trace;
mod transport;

pub use breaker::{Breaker, CircuitState, Clock, MonotonicClock};
pub use buffer::{Buffer, PushOutcome};
pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
pub use level::LogLevel;
pub use metrics::{Metrics, MetricsRegistry};
pub use query::{
    AggregatedStatsOptions, AggregatedStatsResponse, ErrorCount, QueryOptions, QueryResponse,
    ServiceCount, TimeseriesBucket,
};
pub use record::{ErrorValue, LogRecord, Metadata};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use trace::{TraceContext, TraceIdGuard};

pub mod prelude;
