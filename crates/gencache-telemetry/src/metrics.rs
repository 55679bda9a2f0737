//! Counters for cache traffic

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for generation traffic
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    adaptive_served: AtomicU64,
    external_calls: AtomicU64,
    external_failures: AtomicU64,
    config_errors: AtomicU64,
    external_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                cache_hits: AtomicU64::new(0),
                adaptive_served: AtomicU64::new(0),
                external_calls: AtomicU64::new(0),
                external_failures: AtomicU64::new(0),
                config_errors: AtomicU64::new(0),
                external_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a request
    pub fn record_request(&self) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a result served from the memoized result cache
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a result served by the adaptive generator
    pub fn record_adaptive(&self) {
        self.inner.adaptive_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful external generator call and its latency
    pub fn record_external(&self, latency_us: u64) {
        self.inner.external_calls.fetch_add(1, Ordering::Relaxed);
        self.inner
            .external_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
    }

    /// Record a failed external generator call
    pub fn record_external_failure(&self) {
        self.inner.external_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request rejected because no path was permitted
    pub fn record_config_error(&self) {
        self.inner.config_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            adaptive_served: self.inner.adaptive_served.load(Ordering::Relaxed),
            external_calls: self.inner.external_calls.load(Ordering::Relaxed),
            external_failures: self.inner.external_failures.load(Ordering::Relaxed),
            config_errors: self.inner.config_errors.load(Ordering::Relaxed),
            external_latency_us: self.inner.external_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub adaptive_served: u64,
    pub external_calls: u64,
    pub external_failures: u64,
    pub config_errors: u64,
    pub external_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average latency of successful external calls
    pub fn avg_external_latency_us(&self) -> u64 {
        if self.external_calls == 0 {
            0
        } else {
            self.external_latency_us / self.external_calls
        }
    }

    /// Share of requests answered without calling the external generator
    pub fn independence_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.cache_hits + self.adaptive_served) as f64 / self.total_requests as f64
        }
    }
}
