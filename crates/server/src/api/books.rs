//! Book catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shelfcheck_core::{
    export_csv, BookFilter, CatalogStats, ExportKind, ImportSummary, LocalBook, StoredBook,
};
use tracing::info;

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<StoredBook>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/books
///
/// Import local books. Known books keep their verification.
pub async fn import_books(
    State(state): State<Arc<AppState>>,
    Json(books): Json<Vec<LocalBook>>,
) -> Result<Json<ImportSummary>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().upsert_books(&books) {
        Ok(summary) => {
            info!(
                imported = summary.imported,
                updated = summary.updated,
                skipped = summary.skipped,
                "Imported books"
            );
            Ok(Json(summary))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// GET /api/v1/books
///
/// List stored books, optionally filtered.
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BookFilter>,
) -> Result<Json<BookListResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().list(&filter) {
        Ok(books) => {
            let total = books.len();
            Ok(Json(BookListResponse { books, total }))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// GET /api/v1/books/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, (StatusCode, Json<ErrorResponse>)> {
    state
        .store()
        .stats()
        .map(Json)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/v1/books/export?kind=candidates|matches|ambiguous|all
///
/// Download stored results as CSV. Defaults to `all`.
pub async fn export_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let kind = match params.kind.as_deref() {
        None => ExportKind::All,
        Some(raw) => raw
            .parse::<ExportKind>()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?,
    };

    let mut body = Vec::new();
    export_csv(state.store(), kind, &mut body)
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let disposition = format!("attachment; filename=\"{}.csv\"", kind);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// DELETE /api/v1/books/verifications
///
/// Forget every stored verification so the next run checks all books again.
pub async fn clear_verifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().clear_verifications() {
        Ok(cleared) => {
            info!(cleared, "Cleared verification results");
            Ok(Json(ClearResponse { cleared }))
        }
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}
