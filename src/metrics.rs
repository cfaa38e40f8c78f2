//! Thread-safe counters and a capped rolling latency window.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Maximum number of recent send latencies kept for the rolling average.
const LATENCY_WINDOW: usize = 100;

/// Point-in-time, independent copy of the live counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    pub logs_sent: u64,
    pub logs_dropped: u64,
    pub errors: u64,
    pub retries: u64,
    pub breaker_trips: u64,
    pub avg_latency_ms: f64,
}

struct Inner {
    logs_sent: u64,
    logs_dropped: u64,
    errors: u64,
    retries: u64,
    breaker_trips: u64,
    latencies: VecDeque<f64>,
    latency_sum: f64,
}

impl Inner {
    fn new() -> Self {
        Self {
            logs_sent: 0,
            logs_dropped: 0,
            errors: 0,
            retries: 0,
            breaker_trips: 0,
            latencies: VecDeque::with_capacity(LATENCY_WINDOW),
            latency_sum: 0.0,
        }
    }

    fn avg_latency_ms(&self) -> f64 {
        if self.latencies.is_empty() {
            0.0
        } else {
            self.latency_sum / self.latencies.len() as f64
        }
    }
}

/// Metrics register. When `enabled` is `false` every recording method is a no-op
/// and `snapshot()` always returns zeros, per `ClientConfig::enable_metrics`.
pub struct MetricsRegistry {
    inner: Mutex<Inner>,
    enabled: bool,
}

impl MetricsRegistry {
    pub fn new(enabled: bool) -> Self {
        Self { inner: Mutex::new(Inner::new()), enabled }
    }

    pub fn record_sent(&self, count: u64) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.logs_sent += count;
    }

    pub fn record_dropped(&self, count: u64) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.logs_dropped += count;
    }

    pub fn record_error(&self) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.errors += 1;
    }

    pub fn record_retry(&self) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.retries += 1;
    }

    pub fn record_breaker_trip(&self) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.breaker_trips += 1;
    }

    /// Pushes a successful-send latency into the rolling window, evicting the
    /// oldest sample once the window is full.
    pub fn record_latency(&self, latency: Duration) {
        if !self.enabled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let ms = latency.as_secs_f64() * 1000.0;
        if inner.latencies.len() >= LATENCY_WINDOW {
            if let Some(oldest) = inner.latencies.pop_front() {
                inner.latency_sum -= oldest;
            }
        }
        inner.latencies.push_back(ms);
        inner.latency_sum += ms;
    }

    /// Returns an independent copy of the current counters.
    pub fn snapshot(&self) -> Metrics {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Metrics {
            logs_sent: inner.logs_sent,
            logs_dropped: inner.logs_dropped,
            errors: inner.errors,
            retries: inner.retries,
            breaker_trips: inner.breaker_trips,
            avg_latency_ms: inner.avg_latency_ms(),
        }
    }

    /// Replaces the live counters with zeros and clears the latency window.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        *inner = Inner::new();
    }
}
