//! Per-request logging + request counter middleware.
//!
//! The `route` label is the matched path template (`/api/products/:id`), or
//! `unmatched` for fallback hits, so label cardinality stays bounded.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app_state::AppState;
use crate::obs::HTTP_REQUESTS;

pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let resp = next.run(req).await;
    let status = resp.status();

    state.metrics().increment_with(
        HTTP_REQUESTS,
        &[("method", method.as_str()), ("route", route.as_str()), ("status", status.as_str())],
    );

    tracing::info!(%method, %path, status = status.as_u16(), "request");
    resp
}
