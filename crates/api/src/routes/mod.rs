//! API routes.

pub mod banner;
pub mod stats;
pub mod track;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use engine_core::limits::MAX_TRACK_BODY_BYTES;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors::cors_headers;
use crate::state::AppState;

/// Creates the API router.
///
/// Anything that is not `POST /track` or `GET /stats` gets the banner.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/track",
            post(track::track_handler).fallback(banner::banner_handler),
        )
        .route(
            "/stats",
            get(stats::stats_handler).fallback(banner::banner_handler),
        )
        .fallback(banner::banner_handler)
        .layer(DefaultBodyLimit::max(MAX_TRACK_BODY_BYTES))
        .layer(from_fn_with_state(state.clone(), cors_headers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
