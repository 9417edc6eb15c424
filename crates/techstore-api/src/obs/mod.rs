//! Lightweight in-process metrics and request logging.
//!
//! The registry is owned by `AppState` and rendered by the `/metrics`
//! handler. Names below are unprefixed; the configured prefix is applied
//! at render time.

pub mod metrics;
pub mod request_log;

use techstore_core::IdentityProvider;

pub use metrics::CounterRegistry;

pub const HTTP_REQUESTS: &str = "http_requests_total";
pub const SERVER_INFO_REQUESTS: &str = "server_info_requests_total";
pub const PRODUCTS_SERVED: &str = "products_served_total";
pub const DRAINING: &str = "draining";
pub const INSTANCE_INFO: &str = "instance_info";

/// Declare the service metric families and record static instance labels.
pub fn install(registry: &CounterRegistry, identity: &IdentityProvider) {
    registry.register_counter(HTTP_REQUESTS, "HTTP requests handled, by method, route and status.");
    registry.register_counter(SERVER_INFO_REQUESTS, "Server-info requests answered by this instance.");
    registry.register_counter(
        PRODUCTS_SERVED,
        "Successful catalog responses, by endpoint (list or item).",
    );
    registry.register_gauge(DRAINING, "1 while the instance is shutting down.");
    registry.register_gauge(INSTANCE_INFO, "Identity labels of this instance; always 1.");

    registry.set_gauge(DRAINING, 0.0);
    registry.set_gauge_with(
        INSTANCE_INFO,
        &[
            ("host", identity.host_label()),
            ("address", identity.address()),
            ("node", identity.node_label()),
            ("group", identity.group_label()),
        ],
        1.0,
    );
}
