use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{books, handlers, middleware::metrics_middleware, runs, verify};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Single-item lookups
        .route("/verify", post(verify::verify))
        .route("/verify/explain", post(verify::explain))
        // Book catalog
        .route("/books", post(books::import_books))
        .route("/books", get(books::list_books))
        .route("/books/stats", get(books::get_stats))
        .route("/books/export", get(books::export_books))
        .route("/books/verifications", delete(books::clear_verifications))
        // Batch runs
        .route("/runs", post(runs::start_run))
        .route("/runs/status", get(runs::get_status));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
