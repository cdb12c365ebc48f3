//! Single-item verification API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use shelfcheck_core::verifier::ExplainReport;
use shelfcheck_core::VerificationRecord;

use super::handlers::error_response;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
}

const NO_TRACKER: &str = "No tracker configured. Add a [tracker] section to enable verification.";

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/verify
///
/// Look one title/author pair up on the tracker. Nothing is persisted.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerificationRecord>, impl IntoResponse> {
    let Some(verifier) = state.verifier() else {
        return Err(error_response(StatusCode::SERVICE_UNAVAILABLE, NO_TRACKER));
    };

    let record = verifier
        .verify_item(&request.title, request.author.as_deref())
        .await;
    Ok(Json(record))
}

/// POST /api/v1/verify/explain
///
/// Like `verify`, but reports the verdict for every candidate group.
pub async fn explain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<ExplainReport>, impl IntoResponse> {
    let Some(verifier) = state.verifier() else {
        return Err(error_response(StatusCode::SERVICE_UNAVAILABLE, NO_TRACKER));
    };

    let report = verifier
        .explain(&request.title, request.author.as_deref())
        .await;
    Ok(Json(report))
}
