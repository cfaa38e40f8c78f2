//! Client-scoped current trace identifier with a scoped-override guard.
//!
//! The context is a single field shared by every caller of one [`crate::Client`]
//! instance, not a thread-local or task-local, so concurrent scoped overrides
//! race each other. This is not fixed here; callers that need per-request
//! isolation should carry their trace id explicitly, the way
//! `demos/http_middleware_adapter.rs` does.

use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct TraceContext {
    current: Arc<Mutex<Option<String>>>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn set(&self, id: Option<String>) {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = id;
    }

    /// Installs `id` and returns a guard that restores the prior value when
    /// dropped, including when dropped during an unwinding panic.
    pub fn scoped(&self, id: impl Into<String>) -> TraceIdGuard {
        let previous = self.get();
        self.set(Some(id.into()));
        TraceIdGuard { ctx: self.clone(), previous: Some(previous) }
    }

    /// Runs `block` with `id` installed, restoring the prior value on return
    /// (including an early return via `?` or a panic inside `block`).
    pub fn with_trace_id<R>(&self, id: impl Into<String>, block: impl FnOnce() -> R) -> R {
        let _guard = self.scoped(id);
        block()
    }

    /// Async counterpart of [`TraceContext::with_trace_id`]: the guard's
    /// lifetime spans the awaited future, so the prior value is restored only
    /// once `fut` completes (successfully, by early return, or by panic).
    pub async fn with_trace_id_async<Fut, R>(&self, id: impl Into<String>, fut: Fut) -> R
    where
        Fut: std::future::Future<Output = R>,
    {
        let _guard = self.scoped(id);
        fut.await
    }

    /// Generates a fresh UUID-v4 trace id and delegates to `with_trace_id`.
    pub fn with_new_trace_id<R>(&self, block: impl FnOnce() -> R) -> R {
        self.with_trace_id(uuid::Uuid::new_v4().to_string(), block)
    }

    /// Async counterpart of [`TraceContext::with_new_trace_id`].
    pub async fn with_new_trace_id_async<Fut, R>(&self, fut: Fut) -> R
    where
        Fut: std::future::Future<Output = R>,
    {
        self.with_trace_id_async(uuid::Uuid::new_v4().to_string(), fut).await
    }
}

/// Restores the trace context's prior value when dropped.
pub struct TraceIdGuard {
    ctx: TraceContext,
    previous: Option<Option<String>>,
}

impl Drop for TraceIdGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.ctx.set(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_override_restores_prior_value() {
        let ctx = TraceContext::new();
        ctx.set(Some("A".into()));

        ctx.with_trace_id("B", || {
            assert_eq!(ctx.get(), Some("B".to_string()));
        });

        assert_eq!(ctx.get(), Some("A".to_string()));
    }

    #[test]
    fn scoped_override_restores_none() {
        let ctx = TraceContext::new();
        assert_eq!(ctx.get(), None);

        ctx.with_trace_id("B", || {
            assert_eq!(ctx.get(), Some("B".to_string()));
        });

        assert_eq!(ctx.get(), None);
    }

    #[test]
    fn restores_even_if_block_panics() {
        let ctx = TraceContext::new();
        ctx.set(Some("A".into()));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.with_trace_id("B", || {
                panic!("boom");
            });
        }));

        assert!(result.is_err());
        assert_eq!(ctx.get(), Some("A".to_string()));
    }

    #[test]
    fn with_new_trace_id_exposes_a_parseable_uuid() {
        let ctx = TraceContext::new();
        let mut seen = String::new();
        ctx.with_new_trace_id(|| {
            seen = ctx.get().expect("trace id installed");
        });
        assert!(uuid::Uuid::parse_str(&seen).is_ok());
        assert_eq!(ctx.get(), None);
    }

    #[tokio::test]
    async fn async_scoped_override_restores_after_await() {
        let ctx = TraceContext::new();
        ctx.set(Some("A".into()));

        ctx.with_trace_id_async("B", async {
            tokio::task::yield_now().await;
            assert_eq!(ctx.get(), Some("B".to_string()));
        })
        .await;

        assert_eq!(ctx.get(), Some("A".to_string()));
    }
}
