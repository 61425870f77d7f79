use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::WrappingMiddleware;
use crate::dispatcher::{DispatchError, Next};
use crate::pipeline::{Context, RouterRequest, RouterResponse};

/// Passive request metrics, registered as a wrapping middleware so the
/// latency measurement brackets the whole downstream call.
///
/// Tracks total request count, summed latency, and per-path hit counts.
/// All counters use atomic operations (relaxed ordering) or a lock-free map,
/// so collection never blocks a request; metrics are eventually consistent.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    path_hits: DashMap<String, u64>,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            path_hits: DashMap::new(),
        }
    }
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests that reached this middleware.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean downstream latency across all requests; zero before the first
    /// request completes.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Hit count for one request path as observed at this middleware's
    /// position in the chain (before any downstream rewrite).
    pub fn path_hits(&self, path: &str) -> u64 {
        self.path_hits.get(path).map(|v| *v).unwrap_or(0)
    }
}

impl WrappingMiddleware for MetricsMiddleware {
    fn call(
        &self,
        req: &mut RouterRequest,
        ctx: &mut Context,
        next: Next<'_>,
    ) -> Result<RouterResponse, DispatchError> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if let Some(path) = req.path() {
            *self.path_hits.entry(path).or_insert(0) += 1;
        }

        let start = Instant::now();
        let result = next.run(req, ctx);
        self.total_latency_ns
            .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
        result
    }
}
