//! Batch verification run API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use shelfcheck_core::{RunOptions, VerifierError, VerifierStatus};

use super::handlers::error_response;
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RunStartedResponse {
    pub run_id: String,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    /// Whether runs can be started (a tracker is configured)
    pub available: bool,
    #[serde(flatten)]
    pub status: VerifierStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/runs
///
/// Start a background verification run over the catalog.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    options: Option<Json<RunOptions>>,
) -> impl IntoResponse {
    let Some(verifier) = state.verifier() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "No tracker configured. Add a [tracker] section to enable runs.",
        )
        .into_response();
    };

    let options = options.map(|Json(o)| o).unwrap_or_default();
    match verifier.start_run(options) {
        Ok(run_id) => (StatusCode::ACCEPTED, Json(RunStartedResponse { run_id })).into_response(),
        Err(VerifierError::AlreadyRunning) => {
            error_response(StatusCode::CONFLICT, VerifierError::AlreadyRunning.to_string())
                .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /api/v1/runs/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunStatusResponse> {
    match state.verifier() {
        Some(verifier) => Json(RunStatusResponse {
            available: true,
            status: verifier.status().await,
        }),
        None => Json(RunStatusResponse {
            available: false,
            status: VerifierStatus::default(),
        }),
    }
}
