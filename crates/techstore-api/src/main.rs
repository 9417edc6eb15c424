//! TechStore API
//!
//! Product catalog + load-balancing demo backend. Every response names the
//! replica that served it; `/metrics` exposes per-instance counters.

use tracing_subscriber::{fmt, EnvFilter};

use techstore_core::error::{Result, TechStoreError};
use techstore_api::{app_state, config, ops, router};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let path = std::env::var("TECHSTORE_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.into());
    let mut cfg = config::load_or_default(&path)?;
    cfg.apply_env_overrides(|k| std::env::var(k).ok())?;
    let listen = cfg.server.listen_addr()?;
    let grace = cfg.server.drain_grace();

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    let identity = state.identity().resolve();
    tracing::info!(
        %listen,
        host = %identity.host_label,
        address = %identity.address,
        group = %identity.group_label,
        "techstore-api starting"
    );

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TechStoreError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(ops::shutdown_signal(state, grace))
        .await
        .map_err(|e| TechStoreError::Internal(format!("server failed: {e}")))?;

    tracing::info!("techstore-api stopped");
    Ok(())
}
