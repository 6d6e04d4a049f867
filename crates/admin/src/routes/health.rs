//! Health check endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::state::AppState;

/// Liveness check. Reports whether the backend handle is established but
/// always answers 200 so a slow backend never restarts the panel.
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = if state.connection().is_ready() {
        "ready"
    } else {
        "connecting"
    };
    (StatusCode::OK, format!("ok (backend {backend})"))
}
