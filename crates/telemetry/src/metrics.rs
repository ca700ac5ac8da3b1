//! Process-local metrics for the analytics service.
//!
//! Values live in atomics and are reported to the log by the worker; nothing
//! is exported to an external system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value that is overwritten on each observation.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Upper bounds: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 30s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    // Aggregation over a remote store can take the full store timeout.
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 30000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds. Values past the last bound land in it.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            count => self.sum() as f64 / count as f64,
        }
    }

    /// `(upper bound, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// All metrics recorded by the service.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingest
    pub events_tracked: Counter,
    pub track_rejected: Counter,
    pub track_failures: Counter,
    pub visitor_markers_written: Counter,

    // Aggregation
    pub stats_requests: Counter,
    pub stats_failures: Counter,
    pub stored_events_skipped: Counter,
    pub last_scan_event_count: Gauge,

    // Store maintenance
    pub entries_swept: Counter,

    pub ingest_latency_ms: Histogram,
    pub aggregation_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_tracked: self.events_tracked.get(),
            track_rejected: self.track_rejected.get(),
            track_failures: self.track_failures.get(),
            visitor_markers_written: self.visitor_markers_written.get(),
            stats_requests: self.stats_requests.get(),
            stats_failures: self.stats_failures.get(),
            stored_events_skipped: self.stored_events_skipped.get(),
            last_scan_event_count: self.last_scan_event_count.get(),
            entries_swept: self.entries_swept.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            aggregation_latency_mean_ms: self.aggregation_latency_ms.mean(),
        }
    }
}

/// A point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_tracked: u64,
    pub track_rejected: u64,
    pub track_failures: u64,
    pub visitor_markers_written: u64,
    pub stats_requests: u64,
    pub stats_failures: u64,
    pub stored_events_skipped: u64,
    pub last_scan_event_count: u64,
    pub entries_swept: u64,
    pub ingest_latency_mean_ms: f64,
    pub aggregation_latency_mean_ms: f64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
