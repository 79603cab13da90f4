use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::server::AppState;

/// Liveness plus a storage round trip, so a dead backend fails the check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.status().await {
        Ok(_) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::warn!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    }
}
