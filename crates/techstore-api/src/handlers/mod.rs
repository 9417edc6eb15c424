//! JSON route handlers. Every body embeds the instance identity, resolved
//! once per request.

pub mod server_info;
pub mod store;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use techstore_core::InstanceIdentity;

use crate::app_state::AppState;

/// Advertised in the 404 body.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET / - Service info",
    "GET /api/products - Shop products",
    "GET /api/products/:id - Single product",
    "GET /api/server-info - Load balancing demo",
    "GET /api/health - Health check",
    "GET /metrics - Prometheus metrics",
];

#[derive(Debug, Serialize)]
pub struct NotFound {
    pub error: &'static str,
    pub available_endpoints: &'static [&'static str],
    #[serde(flatten)]
    pub identity: InstanceIdentity,
}

pub async fn not_found(State(state): State<AppState>) -> (StatusCode, Json<NotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            error: "Endpoint not found",
            available_endpoints: AVAILABLE_ENDPOINTS,
            identity: state.identity().resolve(),
        }),
    )
}
