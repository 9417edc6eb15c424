//! TechStore API library entry.
//!
//! Wires config, instance identity, the metrics registry, and the JSON route
//! handlers into one axum router. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
