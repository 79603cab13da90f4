use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::{AppState, errors::AppError};

#[derive(Debug, Deserialize)]
pub struct RecordRevocationRequest {
    pub serial: String,
    #[serde(default)]
    pub reason: String,
    /// Absent means "now".
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordRevocationResponse {
    pub success: bool,
    pub message: String,
    pub serial: String,
    pub revoked_at: DateTime<Utc>,
}

/// Records a revocation; recording a known serial again replaces its record.
pub async fn record_revocation(
    State(state): State<AppState>,
    payload: Result<Json<RecordRevocationRequest>, JsonRejection>,
) -> Result<Json<RecordRevocationResponse>, AppError> {
    let Json(request) = payload?;
    info!(
        serial = %request.serial,
        reason = %request.reason,
        "Received revocation request"
    );

    let entry = state
        .service
        .record_revocation(&request.serial, &request.reason, request.revoked_at)
        .await?;

    Ok(Json(RecordRevocationResponse {
        success: true,
        message: "revocation added successfully".to_string(),
        serial: entry.serial,
        revoked_at: entry.revoked_at,
    }))
}
