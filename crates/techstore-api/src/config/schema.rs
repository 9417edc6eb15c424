use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use techstore_core::error::{Result, TechStoreError};
use techstore_core::identity::DEFAULT_GROUP;

use crate::obs::metrics::is_valid_metric_name;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub identity: IdentitySection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            identity: IdentitySection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TechStoreError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }

    /// Apply environment overrides (`PORT`) and re-validate.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.is_empty()) {
            let port: u16 = port
                .parse()
                .map_err(|e| TechStoreError::BadRequest(format!("PORT must be a port number: {e}")))?;
            let mut addr = self.server.listen_addr()?;
            addr.set_port(port);
            self.server.listen = addr.to_string();
        }
        self.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Machine-readable service name (health payloads).
    #[serde(default = "default_service")]
    pub service: String,

    /// Human-readable name (root payload).
    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default = "default_team")]
    pub team: String,

    /// How long `/readyz` reports 503 after a shutdown signal before the
    /// listener stops accepting connections.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            service: default_service(),
            display_name: default_display_name(),
            team: default_team(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.service.is_empty() {
            return Err(TechStoreError::BadRequest("server.service must not be empty".into()));
        }
        if self.display_name.is_empty() {
            return Err(TechStoreError::BadRequest(
                "server.display_name must not be empty".into(),
            ));
        }
        if self.team.is_empty() {
            return Err(TechStoreError::BadRequest("server.team must not be empty".into()));
        }
        if self.drain_grace_ms > 60_000 {
            return Err(TechStoreError::BadRequest(
                "server.drain_grace_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            TechStoreError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_service() -> String {
    "techstore-api".into()
}
fn default_display_name() -> String {
    "TechStore API".into()
}
fn default_team() -> String {
    "backend".into()
}
fn default_drain_grace_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    /// Group label used when no override is present.
    #[serde(default = "default_group")]
    pub default_group: String,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            default_group: default_group(),
        }
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_metric_name(&self.prefix) {
            return Err(TechStoreError::BadRequest(format!(
                "metrics.prefix is not a valid metric name: {:?}",
                self.prefix
            )));
        }
        Ok(())
    }
}

fn default_prefix() -> String {
    "techstore".into()
}
