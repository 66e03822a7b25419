//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{delete_file, download_file, list_files, upload_file, AppState};
use super::middleware::{basic_auth, create_cors_layer};

/// Create the file API router.
///
/// Every `/files` route sits behind Basic authentication.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let file_routes = Router::new()
        .route("/files", post(upload_file).get(list_files))
        .route("/files/:id", get(download_file).delete(delete_file))
        .layer(DefaultBodyLimit::max(app_state.max_upload_size))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            basic_auth,
        ));

    Router::new()
        .merge(file_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
