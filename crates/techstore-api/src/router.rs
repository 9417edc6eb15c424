//! Axum router wiring.

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::{app_state::AppState, handlers, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::store::root))
        .route("/api/products", get(handlers::store::products))
        .route("/api/products/:id", get(handlers::store::product))
        .route("/api/server-info", get(handlers::server_info::server_info))
        .route("/api/health", get(handlers::store::health))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::request_log::track_requests,
        ))
        // Browser demo front-ends poll from another origin.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
