//! Plaintext banner for unknown routes.

use axum::extract::State;

use crate::state::AppState;

pub async fn banner_handler(State(state): State<AppState>) -> String {
    state.banner.to_string()
}
