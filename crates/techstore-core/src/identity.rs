//! Instance identity: which pod is answering this request.
//!
//! Labels are resolved once per provider from environment-style lookups,
//! falling back to local system queries and fixed defaults. Resolution never
//! fails. Every `resolve()` stamps a fresh `resolved_at`.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Explicit host label override.
pub const HOSTNAME_OVERRIDE: &str = "HOSTNAME_OVERRIDE";
/// Explicit network address override.
pub const ADDRESS_OVERRIDE: &str = "ADDRESS_OVERRIDE";
/// Explicit node (host machine) label override.
pub const NODE_OVERRIDE: &str = "NODE_OVERRIDE";
/// Explicit group (tenant/namespace) label override.
pub const GROUP_OVERRIDE: &str = "GROUP_OVERRIDE";

/// Lookup keys per field, highest priority first. The second key of each pair
/// is the name the Kubernetes downward API conventionally injects.
const HOST_KEYS: &[&str] = &[HOSTNAME_OVERRIDE, "HOSTNAME"];
const ADDRESS_KEYS: &[&str] = &[ADDRESS_OVERRIDE, "POD_IP"];
const NODE_KEYS: &[&str] = &[NODE_OVERRIDE, "NODE_NAME"];
const GROUP_KEYS: &[&str] = &[GROUP_OVERRIDE, "NAMESPACE"];

/// Address reported when no address is assigned.
pub const LOCAL_ADDRESS: &str = "localhost";
/// Group reported when neither an override nor a configured default exists.
pub const DEFAULT_GROUP: &str = "team-backend";

/// Identity snapshot embedded into response bodies.
///
/// Field names are a stable contract with API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceIdentity {
    pub host_label: String,
    pub address: String,
    pub node_label: String,
    pub group_label: String,
    pub resolved_at: DateTime<Utc>,
}

impl InstanceIdentity {
    /// True when both snapshots describe the same instance, ignoring time.
    pub fn same_instance(&self, other: &InstanceIdentity) -> bool {
        self.host_label == other.host_label
            && self.address == other.address
            && self.node_label == other.node_label
            && self.group_label == other.group_label
    }
}

/// Resolves identity labels once and hands out timestamped snapshots.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    host_label: String,
    address: String,
    node_label: String,
    group_label: String,
}

static GLOBAL: OnceLock<IdentityProvider> = OnceLock::new();

impl IdentityProvider {
    /// Build from the process environment with the built-in default group.
    ///
    /// Besides the four `*_OVERRIDE` keys this also reads `HOSTNAME`, `POD_IP`,
    /// `NODE_NAME` and `NAMESPACE` as second choices. A pod that exports
    /// `POD_IP` therefore reports that address instead of `localhost` even
    /// without `ADDRESS_OVERRIDE`. Use `from_lookup` to restrict the keys.
    pub fn from_env() -> Self {
        Self::from_lookup(DEFAULT_GROUP, |key| std::env::var(key).ok())
    }

    /// Build from the process environment with a configured default group.
    pub fn with_default_group(default_group: &str) -> Self {
        Self::from_lookup(default_group, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as absent.
    pub fn from_lookup<F>(default_group: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|&k| lookup(k))
                .find(|v| !v.is_empty())
        };

        let system = system_hostname();
        let group_fallback = if default_group.is_empty() {
            DEFAULT_GROUP
        } else {
            default_group
        };

        Self {
            host_label: first(HOST_KEYS).unwrap_or_else(|| system.clone()),
            address: first(ADDRESS_KEYS).unwrap_or_else(|| LOCAL_ADDRESS.to_string()),
            node_label: first(NODE_KEYS).unwrap_or(system),
            group_label: first(GROUP_KEYS).unwrap_or_else(|| group_fallback.to_string()),
        }
    }

    /// Process-wide provider, built from the environment on first access.
    pub fn global() -> &'static IdentityProvider {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Snapshot the identity, stamped with the current wall-clock time.
    pub fn resolve(&self) -> InstanceIdentity {
        InstanceIdentity {
            host_label: self.host_label.clone(),
            address: self.address.clone(),
            node_label: self.node_label.clone(),
            group_label: self.group_label.clone(),
            resolved_at: Utc::now(),
        }
    }

    pub fn host_label(&self) -> &str {
        &self.host_label
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn node_label(&self) -> &str {
        &self.node_label
    }

    pub fn group_label(&self) -> &str {
        &self.group_label
    }
}

/// Resolve the identity through the process-wide provider.
pub fn resolve() -> InstanceIdentity {
    IdentityProvider::global().resolve()
}

/// Locally queried system hostname. Never empty.
pub fn system_hostname() -> String {
    if let Ok(s) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        let s = s.trim();
        if !s.is_empty() {
            return s.to_string();
        }
    }

    #[cfg(unix)]
    {
        if let Ok(output) = std::process::Command::new("hostname").output() {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let s = stdout.trim();
                if !s.is_empty() {
                    return s.to_string();
                }
            }
        }
    }

    tracing::debug!("system hostname unavailable, using localhost");
    LOCAL_ADDRESS.to_string()
}
