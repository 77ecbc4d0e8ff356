//! Router configuration

use super::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/score", post(handlers::score_product))
        .route("/api/v1/products", post(handlers::create_product))
        .route("/api/v1/products/:id", get(handlers::get_product))
        .route(
            "/api/v1/products/:id/report",
            post(handlers::generate_report).get(handlers::get_report),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
