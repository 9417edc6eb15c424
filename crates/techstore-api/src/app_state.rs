//! Shared application state for the TechStore API.
//!
//! Holds the validated config, the instance identity provider, and the metrics
//! registry. Constructed once in `main` and cloned into every handler.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use techstore_core::error::Result;
use techstore_core::IdentityProvider;

use crate::config::AppConfig;
use crate::obs::{self, CounterRegistry};

/// Length of generated request ids.
const REQUEST_ID_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<CounterRegistry>,
}

struct AppStateInner {
    cfg: AppConfig,
    identity: IdentityProvider,
    draining: AtomicBool,
    request_seq: AtomicU64,
}

impl AppState {
    /// Build state with identity taken from the process environment.
    pub fn new(cfg: AppConfig) -> Result<Self> {
        let identity = IdentityProvider::with_default_group(&cfg.identity.default_group);
        Self::with_identity(cfg, identity)
    }

    /// Build state around an explicit identity provider.
    pub fn with_identity(cfg: AppConfig, identity: IdentityProvider) -> Result<Self> {
        cfg.validate()?;

        let metrics = CounterRegistry::new(&cfg.metrics.prefix);
        obs::install(&metrics, &identity);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                identity,
                draining: AtomicBool::new(false),
                request_seq: AtomicU64::new(0),
            }),
            metrics: Arc::new(metrics),
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn identity(&self) -> &IdentityProvider {
        &self.inner.identity
    }

    pub fn metrics(&self) -> &CounterRegistry {
        &self.metrics
    }

    /// Process uptime as tracked by the metrics registry.
    pub fn uptime(&self) -> Duration {
        self.metrics.uptime()
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
        self.metrics.set_gauge(obs::DRAINING, 1.0);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }

    /// Short random-looking request id (9 base36 chars).
    pub fn next_request_id(&self) -> String {
        let seq = self.inner.request_seq.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        // splitmix64 finalizer over (time, seq)
        let mut x = nanos ^ seq.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^= x >> 31;

        let mut id = String::with_capacity(REQUEST_ID_LEN);
        for _ in 0..REQUEST_ID_LEN {
            id.push(BASE36[(x % 36) as usize] as char);
            x /= 36;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let identity = IdentityProvider::from_lookup("team-backend", |_| None);
        AppState::with_identity(AppConfig::default(), identity).unwrap()
    }

    #[test]
    fn request_ids_are_base36_and_distinct() {
        let s = state();
        let a = s.next_request_id();
        let b = s.next_request_id();
        assert_eq!(a.len(), 9);
        assert!(a.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(a, b);
    }

    #[test]
    fn draining_flips_flag_and_gauge() {
        let s = state();
        assert!(!s.is_draining());
        assert_eq!(s.metrics().gauge_value(obs::DRAINING, &[]), Some(0.0));

        s.set_draining();
        assert!(s.is_draining());
        assert!(s.metrics().render().contains("techstore_draining 1\n"));
    }

    #[test]
    fn instance_info_carries_identity_labels() {
        let s = state();
        let host = s.identity().host_label().to_string();
        let out = s.metrics().render();
        assert!(out.contains(&format!("host=\"{host}\"")));
        assert!(out.contains("address=\"localhost\""));
        assert!(out.contains("group=\"team-backend\""));
    }
}
