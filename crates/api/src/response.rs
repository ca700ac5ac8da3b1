//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response for `/track`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub success: bool,
}

impl TrackResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            error: error.into(),
            code: code.map(str::to_string),
        }
    }
}

/// API error with an HTTP status.
///
/// Status depends on the endpoint, not the error: every `/track` failure is a
/// 400 and every `/stats` failure is a 500.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: Option<&str>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    fn from_error(status: StatusCode, err: &engine_core::Error) -> Self {
        Self::with_code(status, err.error_code(), err.to_string())
    }

    /// A failed ingest.
    pub fn track(err: &engine_core::Error) -> Self {
        Self::from_error(StatusCode::BAD_REQUEST, err)
    }

    /// A failed aggregation.
    pub fn stats(err: &engine_core::Error) -> Self {
        Self::from_error(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}
