//! Circuit breaker guarding outbound delivery attempts.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Clock abstraction so breaker timing can be faked in tests
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_millis(&self) -> u64;
}

/// Monotonic clock backed by `Instant::now()`
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    failure_count: usize,
    last_failure_at_millis: Option<u64>,
}

/// Failure-counting state machine that guards the retry engine's send attempts.
///
/// All mutations are serialized under a single mutex: `can_attempt`,
/// `record_success`, `record_failure`, and `state` each take the lock for the
/// duration of one O(1) update, never across an `.await`.
pub struct Breaker {
    inner: Mutex<Inner>,
    threshold: usize,
    reset: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Breaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Breaker")
            .field("threshold", &self.threshold)
            .field("reset", &self.reset)
            .finish()
    }
}

impl Breaker {
    pub fn new(threshold: usize, reset: Duration) -> Self {
        Self::with_clock(threshold, reset, Arc::new(MonotonicClock::default()))
    }

    pub fn with_clock(threshold: usize, reset: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner { state: CircuitState::Closed, failure_count: 0, last_failure_at_millis: None }),
            threshold,
            reset,
            clock,
        }
    }

    /// Lazily advances Open → HalfOpen once the reset timeout has elapsed, then
    /// reports whether a send attempt is currently admitted.
    pub fn can_attempt(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        self.maybe_half_open(&mut inner);
        inner.state != CircuitState::Open
    }

    /// Current state, after the same lazy Open → HalfOpen check as `can_attempt`.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        self.maybe_half_open(&mut inner);
        inner.state
    }

    /// Resets the failure count and closes the breaker unconditionally.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let was_open = inner.state != CircuitState::Closed;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.last_failure_at_millis = None;
        if was_open {
            tracing::info!("circuit breaker closed");
        }
    }

    /// Increments the failure count and opens the breaker once the threshold is
    /// reached. A single failure while HalfOpen reopens immediately regardless
    /// of the threshold, since HalfOpen admits only one trial call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.failure_count += 1;
        inner.last_failure_at_millis = Some(self.clock.now_millis());

        let should_open = inner.state == CircuitState::HalfOpen || inner.failure_count >= self.threshold;
        if should_open && inner.state != CircuitState::Open {
            inner.state = CircuitState::Open;
            tracing::warn!(failures = inner.failure_count, threshold = self.threshold, "circuit breaker opened");
        }
    }

    pub fn failure_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).failure_count
    }

    fn maybe_half_open(&self, inner: &mut Inner) {
        if inner.state != CircuitState::Open {
            return;
        }
        let Some(last_failure) = inner.last_failure_at_millis else { return };
        let now = self.clock.now_millis();
        let elapsed = now.saturating_sub(last_failure);
        if elapsed >= self.reset.as_millis() as u64 {
            inner.state = CircuitState::HalfOpen;
            tracing::info!("circuit breaker half-open");
        }
    }
}
