//! Router construction

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::middleware::logging::log_request;
use crate::server::handlers::{self, AppState};

/// Build the application router: the JSON API under `/api`, with the static
/// UI in `static_dir` as the fallback for every other path.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/list", get(handlers::list))
        .route("/api/download", get(handlers::download))
        .route("/api/upload", post(handlers::upload))
        .route("/api/mkdir", post(handlers::mkdir))
        .route("/api/rename", post(handlers::rename))
        .route("/api/delete", post(handlers::delete))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
