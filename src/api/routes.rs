use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Ratings exports of several thousand titles exceed axum's 2 MB default
const MAX_HISTORY_BYTES: usize = 16 * 1024 * 1024;

/// Creates the application router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/history",
            post(handlers::import_history).layer(DefaultBodyLimit::max(MAX_HISTORY_BYTES)),
        )
        .route("/recommendations", get(handlers::get_recommendations))
        .route("/recommendations/regenerate", post(handlers::regenerate))
        .route(
            "/recommendations/filter",
            post(handlers::apply_filter).delete(handlers::clear_filter),
        )
        .route("/recommendations/export", get(handlers::export_csv))
        .route("/preferences", get(handlers::get_preferences))
}
