//! Ingest endpoint handler.
//!
//! Accepts a single JSON object with at least an `event` string. Any other
//! fields are stored with the record as scalars.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use engine_core::{
    limits::MAX_TRACK_BODY_BYTES, Error, EventFields, TrackRequest, ValidationErrorCode,
};
use kv_store::track_event;
use telemetry::metrics;
use tracing::{debug, error, warn};

use crate::extractors::ClientContext;
use crate::response::{ApiError, TrackResponse};
use crate::state::AppState;

fn rejected(err: Error) -> ApiError {
    metrics().track_rejected.inc();
    warn!(error = %err, "Rejected track request");
    ApiError::track(&err)
}

/// POST /track - record one usage event.
pub async fn track_handler(
    State(state): State<AppState>,
    ClientContext(ctx): ClientContext,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TrackResponse>, ApiError> {
    let start = Instant::now();

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            rejected(Error::validation_code(
                ValidationErrorCode::PayloadTooLarge,
                format!("Payload exceeds {}KB limit", MAX_TRACK_BODY_BYTES / 1024),
            ))
        } else {
            rejected(Error::validation_code(
                ValidationErrorCode::InvalidJson,
                rejection.body_text(),
            ))
        }
    })?;

    let fields = EventFields::parse(&body).map_err(rejected)?;
    let request = TrackRequest::from_fields(&fields).map_err(rejected)?;

    let outcome = track_event(state.store.as_ref(), fields, &request, &ctx, Utc::now())
        .await
        .map_err(|e| {
            metrics().track_failures.inc();
            error!(event = %request.event, error = %e, "Failed to track event");
            ApiError::track(&e)
        })?;

    let latency_ms = start.elapsed().as_millis() as u64;
    metrics().events_tracked.inc();
    metrics().ingest_latency_ms.observe(latency_ms);

    debug!(
        key = %outcome.key,
        event = %request.event,
        version = request.version.as_deref().unwrap_or("all"),
        counter = outcome.counter,
        latency_ms,
        "Track request handled"
    );

    Ok(Json(TrackResponse::ok()))
}
