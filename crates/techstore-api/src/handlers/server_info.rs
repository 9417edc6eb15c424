//! Load-balancing demo endpoint.
//!
//! Front-ends poll this repeatedly; the `host_label` in each response shows
//! which replica the Service routed the request to.

use axum::{extract::State, Json};
use serde::Serialize;

use techstore_core::InstanceIdentity;

use crate::app_state::AppState;
use crate::obs::SERVER_INFO_REQUESTS;

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    #[serde(flatten)]
    pub identity: InstanceIdentity,
    pub message: String,
    pub request_id: String,
    /// Seconds since process start.
    pub uptime: u64,
    pub load_balancing_demo: LoadBalancingDemo,
}

#[derive(Debug, Serialize)]
pub struct LoadBalancingDemo {
    pub instruction: &'static str,
    pub current_pod: String,
    pub technology: &'static str,
}

pub async fn server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    let identity = state.identity().resolve();
    let request_id = state.next_request_id();

    state
        .metrics()
        .increment_with(SERVER_INFO_REQUESTS, &[("host", identity.host_label.as_str())]);
    tracing::debug!(host = %identity.host_label, %request_id, "server-info");

    Json(ServerInfo {
        message: format!(
            "Load balancing demo - request handled by {}",
            identity.host_label
        ),
        request_id,
        uptime: state.uptime().as_secs(),
        load_balancing_demo: LoadBalancingDemo {
            instruction: "Click multiple times to see different pod hostnames",
            current_pod: identity.host_label.clone(),
            technology: "Kubernetes Service + Calico CNI",
        },
        identity,
    })
}
