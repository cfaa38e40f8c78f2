//! Flush scheduler and retry engine.

use crate::backoff::ExponentialBackoff;
use crate::breaker::Breaker;
use crate::buffer::Buffer;
use crate::metrics::MetricsRegistry;
use crate::record::LogRecord;
use crate::sleeper::Sleeper;
use crate::transport::{SendOutcome, Transport};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns the periodic flush timer and the retry loop that drains the buffer.
/// Every field it touches (`buffer`, `breaker`, `metrics`) is independently
/// synchronized, so a `Dispatcher` never needs a lock of its own.
pub struct Dispatcher {
    buffer: Arc<Buffer>,
    transport: Arc<Transport>,
    breaker: Arc<Breaker>,
    metrics: Arc<MetricsRegistry>,
    sleeper: Arc<dyn Sleeper>,
    max_retries: usize,
    retry_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        buffer: Arc<Buffer>,
        transport: Arc<Transport>,
        breaker: Arc<Breaker>,
        metrics: Arc<MetricsRegistry>,
        sleeper: Arc<dyn Sleeper>,
        max_retries: usize,
        retry_delay: Duration,
    ) -> Self {
        Self { buffer, transport, breaker, metrics, sleeper, max_retries, retry_delay }
    }

    /// Spawns the periodic flush task, firing every `interval` until `handle`
    /// is aborted. Each tick's flush runs fire-and-forget in its own task so a
    /// slow send never delays the next tick.
    pub fn spawn_periodic(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher.flush_now().await;
                });
            }
        })
    }

    /// Drains the buffer and attempts to deliver the batch, retrying with
    /// exponential backoff through the circuit breaker. A no-op if the
    /// buffer is empty.
    pub async fn flush_now(&self) {
        let Some(records) = self.buffer.snapshot_and_clear() else {
            return;
        };
        self.send_with_retry(records).await;
    }

    /// The retry loop proper, shared by the periodic path, the size-threshold
    /// path, and explicit `Client::flush` calls.
    async fn send_with_retry(&self, records: Vec<LogRecord>) {
        let mut backoff = ExponentialBackoff::new(self.retry_delay);

        for attempt in 0..=self.max_retries {
            if !self.breaker.can_attempt() {
                self.metrics.record_breaker_trip();
                self.metrics.record_dropped(records.len() as u64);
                tracing::warn!(batch_size = records.len(), "circuit breaker open, dropping batch");
                return;
            }

            let started = Instant::now();
            match self.transport.post_batch(&records).await {
                SendOutcome::Sent => {
                    self.breaker.record_success();
                    self.metrics.record_sent(records.len() as u64);
                    self.metrics.record_latency(started.elapsed());
                    return;
                }
                SendOutcome::Failed(failure) => {
                    self.breaker.record_failure();
                    self.metrics.record_error();
                    tracing::warn!(attempt, error = %failure, "log batch send failed");

                    if attempt == self.max_retries {
                        // Mirrors the breaker-open short-circuit above: if the
                        // last failure itself tripped the breaker, this counts
                        // a second trip for what is logically one outage. Kept
                        // as specified rather than deduplicated.
                        if self.breaker.state() == crate::breaker::CircuitState::Open {
                            self.metrics.record_breaker_trip();
                        }
                        self.metrics.record_dropped(records.len() as u64);
                        tracing::error!(batch_size = records.len(), "log batch exhausted retries, dropping");
                        return;
                    }

                    self.metrics.record_retry();
                    self.sleeper.sleep(backoff.next()).await;
                }
            }
        }
    }
}
