//! Service config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use techstore_core::error::{Result, TechStoreError};

pub use schema::{AppConfig, IdentitySection, MetricsSection, ServerSection};

/// Config file read when `TECHSTORE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "techstore.yaml";

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TechStoreError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)
        .map_err(|e| TechStoreError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise use built-in defaults.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    if Path::new(path).exists() {
        return load_from_file(path);
    }
    tracing::info!(%path, "config file not found, using defaults");
    let cfg = AppConfig::default();
    cfg.validate()?;
    Ok(cfg)
}
