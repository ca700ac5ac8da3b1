//! Dashboard statistics handler.

use std::time::Instant;

use axum::{extract::State, Json};
use engine_core::StatsSnapshot;
use kv_store::collect_stats;
use telemetry::metrics;
use tracing::{error, info};

use crate::response::ApiError;
use crate::state::AppState;

/// GET /stats - aggregate every stored counter and event.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, ApiError> {
    let start = Instant::now();
    metrics().stats_requests.inc();

    let (snapshot, summary) = collect_stats(state.store.clone(), state.read_concurrency)
        .await
        .map_err(|e| {
            metrics().stats_failures.inc();
            error!(error = %e, "Failed to aggregate stats");
            ApiError::stats(&e)
        })?;

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().aggregation_latency_ms.observe(latency_ms);

    info!(
        counters = summary.counters,
        events = summary.events,
        skipped = summary.skipped,
        vanished = summary.vanished,
        visitors = summary.visitors,
        latency_ms,
        "Stats aggregated"
    );

    Ok(Json(snapshot))
}
