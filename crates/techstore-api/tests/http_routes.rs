//! Router-level tests: identity in bodies, metrics accounting, fallbacks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use techstore_api::app_state::AppState;
use techstore_api::config::AppConfig;
use techstore_api::ops;
use techstore_api::router::build_router;
use techstore_core::IdentityProvider;

fn test_state() -> AppState {
    let identity = IdentityProvider::from_lookup("team-backend", |k| match k {
        "HOSTNAME_OVERRIDE" => Some("pod-a".into()),
        "ADDRESS_OVERRIDE" => Some("10.244.0.12".into()),
        "NODE_OVERRIDE" => Some("worker-1".into()),
        "GROUP_OVERRIDE" => Some("team-x".into()),
        _ => None,
    });
    AppState::with_identity(AppConfig::default(), identity).unwrap()
}

async fn get(router: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, bytes) = get(router, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_identity(v: &Value) {
    assert_eq!(v["host_label"], "pod-a");
    assert_eq!(v["address"], "10.244.0.12");
    assert_eq!(v["node_label"], "worker-1");
    assert_eq!(v["group_label"], "team-x");
    assert!(v["resolved_at"].as_str().is_some());
}

#[tokio::test]
async fn server_info_names_the_pod() {
    let router = build_router(test_state());

    let (status, v) = get_json(&router, "/api/server-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_identity(&v);
    assert_eq!(v["load_balancing_demo"]["current_pod"], "pod-a");
    assert_eq!(v["request_id"].as_str().unwrap().len(), 9);
    assert!(v["uptime"].as_u64().is_some());
    assert!(v["message"].as_str().unwrap().ends_with("pod-a"));
}

#[tokio::test]
async fn products_embed_identity_in_metadata() {
    let router = build_router(test_state());

    let (status, v) = get_json(&router, "/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["products"].as_array().unwrap().len(), 8);
    assert_eq!(v["metadata"]["total"], 8);
    assert_eq!(v["metadata"]["currency"], "USD");
    assert_eq!(v["metadata"]["message"], "Products served by pod: pod-a");
    assert_identity(&v["metadata"]);
}

#[tokio::test]
async fn product_by_id_and_errors() {
    let router = build_router(test_state());

    let (status, v) = get_json(&router, "/api/products/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["product"]["name"], "MacBook Air M3");
    assert_identity(&v);

    let (status, v) = get_json(&router, "/api/products/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "NOT_FOUND");
    assert_identity(&v);

    let (status, v) = get_json(&router, "/api/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn root_and_health() {
    let router = build_router(test_state());

    let (status, v) = get_json(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["service"], "TechStore API");
    assert_eq!(v["team"], "backend");
    assert_identity(&v);

    let (status, v) = get_json(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["service"], "techstore-api");
    assert_identity(&v);
}

#[tokio::test]
async fn unknown_route_lists_endpoints() {
    let router = build_router(test_state());

    let (status, v) = get_json(&router, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "Endpoint not found");
    assert!(!v["available_endpoints"].as_array().unwrap().is_empty());
    assert_identity(&v);
}

#[tokio::test]
async fn responses_allow_cross_origin() {
    let router = build_router(test_state());
    let req = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let router = build_router(test_state());
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/server-info")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();

    assert!(resp.status().is_success(), "status {}", resp.status());
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert!(resp.headers().contains_key("access-control-allow-methods"));
    assert!(resp.headers().contains_key("access-control-allow-headers"));
}

#[tokio::test]
async fn failed_product_lookups_are_not_counted_as_served() {
    let state = test_state();
    let router = build_router(state.clone());

    get(&router, "/api/products").await;
    get(&router, "/api/products/3").await;
    get(&router, "/api/products/404").await;
    get(&router, "/api/products/xyz").await;

    let m = state.metrics();
    assert_eq!(m.counter_value("products_served_total", &[("endpoint", "list")]), Some(1));
    assert_eq!(m.counter_value("products_served_total", &[("endpoint", "item")]), Some(1));
}

#[tokio::test]
async fn metrics_count_requests_by_route_template() {
    let state = test_state();
    let router = build_router(state.clone());

    for _ in 0..3 {
        get(&router, "/api/server-info").await;
    }
    get(&router, "/api/products/1").await;
    get(&router, "/api/products/7").await;
    get(&router, "/missing").await;

    let (status, headers, bytes) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/plain"));

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains(
        "techstore_http_requests_total{method=\"GET\",route=\"/api/server-info\",status=\"200\"} 3\n"
    ));
    assert!(text.contains(
        "techstore_http_requests_total{method=\"GET\",route=\"/api/products/:id\",status=\"200\"} 2\n"
    ));
    assert!(text.contains(
        "techstore_http_requests_total{method=\"GET\",route=\"unmatched\",status=\"404\"} 1\n"
    ));
    assert!(text.contains("techstore_server_info_requests_total{host=\"pod-a\"} 3\n"));
    assert!(text.contains("techstore_products_served_total{endpoint=\"item\"} 2\n"));
    assert!(text.contains("# TYPE techstore_uptime_seconds gauge\n"));
    assert!(text.contains("techstore_draining 0\n"));

    assert_eq!(
        state.metrics().counter_value(
            "http_requests_total",
            &[("method", "GET"), ("route", "/api/server-info"), ("status", "200")]
        ),
        Some(3)
    );
}

#[tokio::test]
async fn readiness_flips_when_draining() {
    let state = test_state();
    let router = build_router(state.clone());

    let (status, _, _) = get(&router, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get(&router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    state.set_draining();
    let (status, _, body) = get(&router, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, b"draining");
}

#[tokio::test]
async fn readiness_reports_draining_during_grace_period() {
    let state = test_state();
    let router = build_router(state.clone());

    let drainer = {
        let state = state.clone();
        tokio::spawn(async move { ops::drain(&state, Duration::from_millis(200)).await })
    };
    tokio::task::yield_now().await;
    while !state.is_draining() {
        tokio::task::yield_now().await;
    }

    // Listener is still up; readiness reports 503 until the grace elapses.
    let (status, _, _) = get(&router, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!drainer.is_finished());

    drainer.await.unwrap();
    let (_, _, body) = get(&router, "/metrics").await;
    assert!(String::from_utf8(body).unwrap().contains("techstore_draining 1\n"));
}
