//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    assign_folder, delete_file, download_file, get_file, list_my_files, list_public_files,
    upload_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Headroom for multipart framing and the non-file fields.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let file_routes = Router::new()
        .route("/", get(list_public_files).post(upload_file))
        .route("/mine", get(list_my_files))
        .route("/:id", get(get_file).delete(delete_file))
        .route("/:id/download", get(download_file))
        .route("/:id/folder", put(assign_folder));

    let api_routes = Router::new().nest("/files", file_routes);

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
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
