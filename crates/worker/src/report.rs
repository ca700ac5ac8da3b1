//! Periodic metrics report.

use parking_lot::Mutex;
use telemetry::{metrics, MetricsSnapshot};
use tracing::info;

/// Logs the process metrics snapshot along with the delta since the last report.
#[derive(Debug, Default)]
pub struct MetricsReporter {
    last: Mutex<Option<MetricsSnapshot>>,
}

impl MetricsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the current snapshot and return it.
    pub fn report(&self) -> MetricsSnapshot {
        let snapshot = metrics().snapshot();
        let previous = self.last.lock().replace(snapshot.clone());
        let tracked_since_last = previous
            .map(|p| snapshot.events_tracked.saturating_sub(p.events_tracked))
            .unwrap_or(snapshot.events_tracked);

        info!(
            events_tracked = snapshot.events_tracked,
            tracked_since_last,
            track_rejected = snapshot.track_rejected,
            track_failures = snapshot.track_failures,
            visitor_markers_written = snapshot.visitor_markers_written,
            stats_requests = snapshot.stats_requests,
            stats_failures = snapshot.stats_failures,
            stored_events_skipped = snapshot.stored_events_skipped,
            last_scan_event_count = snapshot.last_scan_event_count,
            entries_swept = snapshot.entries_swept,
            ingest_latency_mean_ms = snapshot.ingest_latency_mean_ms,
            aggregation_latency_mean_ms = snapshot.aggregation_latency_mean_ms,
            "Metrics report"
        );

        snapshot
    }
}
