use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main router: health check plus the versioned API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Filter selectors
        .route("/categories", get(handlers::get_categories))
        .route("/time-buckets", get(handlers::get_time_buckets))
        // Stateless filter
        .route("/recommendations", post(handlers::recommend))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/messages", post(handlers::post_message))
        .route(
            "/sessions/:id/recommendations",
            post(handlers::recommend_for_session),
        )
        .route("/sessions/:id/place-search", post(handlers::search_place))
}
