use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::{AppState, errors::AppError};

const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentCrlResponse {
    pub document: String,
    pub entry_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub document: String,
    pub last_published: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    pub byte_length: usize,
    pub entry_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub stale: bool,
    pub last_published: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
}

/// Returns the current revocation list with its entry and skip counts.
pub async fn get_crl(State(state): State<AppState>) -> Result<Json<CurrentCrlResponse>, AppError> {
    let document = state.service.current_document().await?;
    info!("CRL retrieved with {} entries", document.entry_count());

    Ok(Json(CurrentCrlResponse {
        entry_count: document.entry_count(),
        skipped_count: document.skipped(),
        document: document.into_string(),
    }))
}

/// Returns the current revocation list as a bare document.
pub async fn get_crl_pem(State(state): State<AppState>) -> Result<Response, AppError> {
    let document = state.service.current_document().await?;
    Ok(([(header::CONTENT_TYPE, PEM_CONTENT_TYPE)], document.into_string()).into_response())
}

/// Renders a fresh revocation list and advances the publication window.
pub async fn publish_crl(State(state): State<AppState>) -> Result<Json<PublishResponse>, AppError> {
    let publication = state.service.publish().await?;
    let document = publication.document;

    Ok(Json(PublishResponse {
        last_published: publication.window.last_published(),
        next_update: publication.window.next_update(),
        byte_length: document.byte_len(),
        entry_count: document.entry_count(),
        skipped_count: document.skipped(),
        document: document.into_string(),
    }))
}

pub async fn crl_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let status = state.service.status().await?;

    Ok(Json(StatusResponse {
        stale: status.stale,
        last_published: status.window.map(|window| window.last_published()),
        next_update: status.window.map(|window| window.next_update()),
    }))
}
