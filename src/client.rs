//! Public facade: buffering, enrichment, explicit flush/close, and the
//! read-only query pass-through.

use crate::breaker::Breaker;
use crate::buffer::{Buffer, PushOutcome};
use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::level::LogLevel;
use crate::metrics::{Metrics, MetricsRegistry};
use crate::query::{AggregatedStatsOptions, AggregatedStatsResponse, QueryOptions, QueryResponse};
use crate::record::{ErrorValue, LogRecord, Metadata};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::trace::TraceContext;
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Inner {
    config: ClientConfig,
    buffer: Arc<Buffer>,
    transport: Arc<Transport>,
    breaker: Arc<Breaker>,
    metrics: Arc<MetricsRegistry>,
    dispatcher: Arc<Dispatcher>,
    trace_context: TraceContext,
    periodic_task: tokio::task::JoinHandle<()>,
    disposed: AtomicBool,
}

/// Entry point for this crate. Cheaply `Clone`-able: every clone shares the
/// same buffer, breaker, metrics register, and background flush task.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Validates `config`, then starts the background flush scheduler.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let buffer = Arc::new(Buffer::new(config.max_buffer_size));
        let transport = Arc::new(Transport::new(&config)?);
        let breaker = Arc::new(Breaker::new(config.breaker_threshold, Duration::from_millis(config.breaker_reset_ms)));
        let metrics = Arc::new(MetricsRegistry::new(config.enable_metrics));
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&buffer),
            Arc::clone(&transport),
            Arc::clone(&breaker),
            Arc::clone(&metrics),
            sleeper,
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        ));

        let periodic_task = dispatcher.spawn_periodic(Duration::from_millis(config.flush_interval_ms));

        let inner = Inner {
            config,
            buffer,
            transport,
            breaker,
            metrics,
            dispatcher,
            trace_context: TraceContext::new(),
            periodic_task,
            disposed: AtomicBool::new(false),
        };

        Ok(Self { inner: Arc::new(inner) })
    }

    /// Enriches and buffers `record`. Global metadata is merged in without
    /// overwriting any key the caller already set; a trace id is attached
    /// from an explicit override, else the current scoped trace context,
    /// else a freshly generated id if `auto_trace_id` is enabled. Returns
    /// [`ClientError::BufferFull`] if the buffer was already at capacity,
    /// after counting the drop.
    pub fn log(&self, service: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Result<(), ClientError> {
        self.log_with_metadata(service, level, message, Metadata::new())
    }

    pub fn log_with_metadata(
        &self,
        service: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Result<(), ClientError> {
        let record = self.enrich(LogRecord::new(service, level, message).with_metadata(metadata));
        self.enqueue(record)
    }

    pub fn debug(&self, service: impl Into<String>, message: impl Into<String>) -> Result<(), ClientError> {
        self.log(service, LogLevel::Debug, message)
    }

    pub fn info(&self, service: impl Into<String>, message: impl Into<String>) -> Result<(), ClientError> {
        self.log(service, LogLevel::Info, message)
    }

    pub fn warn(&self, service: impl Into<String>, message: impl Into<String>) -> Result<(), ClientError> {
        self.log(service, LogLevel::Warn, message)
    }

    /// Logs at `Error` level, capturing `err` under the `"error"` metadata key.
    pub fn error(&self, service: impl Into<String>, message: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Result<(), ClientError> {
        self.log_with_error(service, LogLevel::Error, message, err)
    }

    pub fn critical(&self, service: impl Into<String>, message: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Result<(), ClientError> {
        self.log_with_error(service, LogLevel::Critical, message, err)
    }

    fn log_with_error(
        &self,
        service: impl Into<String>,
        level: LogLevel,
        message: impl Into<String>,
        err: &(dyn std::error::Error + 'static),
    ) -> Result<(), ClientError> {
        let mut metadata = Metadata::new();
        metadata.insert("error".into(), ErrorValue::capture(level.as_wire_str(), err).to_value());
        self.log_with_metadata(service, level, message, metadata)
    }

    fn enrich(&self, mut record: LogRecord) -> LogRecord {
        for (key, value) in &self.inner.config.global_metadata {
            record.metadata.entry(key.clone()).or_insert_with(|| value.clone());
        }

        if record.trace_id.is_none() {
            record.trace_id = self.inner.trace_context.get().or_else(|| {
                if self.inner.config.auto_trace_id {
                    Some(uuid::Uuid::new_v4().to_string())
                } else {
                    None
                }
            });
        }

        if self.inner.config.debug {
            tracing::trace!(service = %record.service, level = %record.level, trace_id = ?record.trace_id, "enriched log record");
        }

        record
    }

    fn enqueue(&self, record: LogRecord) -> Result<(), ClientError> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Ok(());
        }
        match self.inner.buffer.push(record, self.inner.config.batch_size) {
            PushOutcome::Full => {
                self.inner.metrics.record_dropped(1);
                Err(ClientError::BufferFull)
            }
            PushOutcome::AcceptedAtThreshold => {
                let dispatcher = Arc::clone(&self.inner.dispatcher);
                tokio::spawn(async move {
                    dispatcher.flush_now().await;
                });
                Ok(())
            }
            PushOutcome::Accepted => Ok(()),
        }
    }

    /// Drains the buffer and attempts delivery synchronously, racing against
    /// `cancel` if provided. Unlike the background path, a fully-retried
    /// failure here is still only reflected in metrics (the retry engine
    /// never surfaces send failures), but cancellation short-circuits
    /// before the retry loop even starts.
    pub async fn flush(&self, cancel: Option<&CancellationToken>) -> Result<(), ClientError> {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Cancelled),
                _ = self.inner.dispatcher.flush_now() => Ok(()),
            }
        } else {
            self.inner.dispatcher.flush_now().await;
            Ok(())
        }
    }

    /// Idempotent shutdown: marks the client disposed so subsequent `log`
    /// calls become silent no-ops, stops the periodic flush task, and
    /// performs one final flush of whatever remains buffered. Safe to call
    /// more than once; later calls are no-ops.
    pub async fn close(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.periodic_task.abort();
        self.inner.dispatcher.flush_now().await;
    }

    pub async fn query(&self, options: &QueryOptions, cancel: Option<&CancellationToken>) -> Result<QueryResponse, ClientError> {
        self.inner.transport.get_query(options, cancel).await
    }

    pub async fn get_by_trace_id(&self, trace_id: &str, cancel: Option<&CancellationToken>) -> Result<QueryResponse, ClientError> {
        self.inner.transport.get_by_trace_id(trace_id, cancel).await
    }

    pub async fn aggregated_stats(
        &self,
        options: &AggregatedStatsOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<AggregatedStatsResponse, ClientError> {
        self.inner.transport.get_aggregated_stats(options, cancel).await
    }

    pub fn trace_context(&self) -> &TraceContext {
        &self.inner.trace_context
    }

    pub fn metrics(&self) -> Metrics {
        self.inner.metrics.snapshot()
    }

    /// Replaces the live counters with zeros and clears the latency window.
    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }

    pub fn buffered_len(&self) -> usize {
        self.inner.buffer.len()
    }
}
