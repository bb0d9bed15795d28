//! Core configuration types.
//!
//! [`Config`] holds the discovery and caching tunables. The server builds it
//! from YAML, environment and CLI overrides; tests build it directly.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::protocol_constants::BLUOS_DEFAULT_PORT;

/// Configuration for player discovery.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How long an mDNS sweep collects answers (milliseconds).
    pub sweep_duration_ms: u64,

    /// Per-device probe timeout (milliseconds).
    pub probe_timeout_ms: u64,

    /// Upper bound on concurrent probes during sweeps and fast refreshes.
    pub max_concurrent_probes: usize,

    /// How long a cached player list counts as fresh (seconds).
    pub cache_ttl_secs: u64,

    /// Control port assumed for known devices without a recorded port.
    pub default_port: u16,

    /// Run one background discovery at startup to warm the cache.
    pub warm_up_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_duration_ms: 3000,
            probe_timeout_ms: 2000,
            max_concurrent_probes: 8,
            cache_ttl_secs: 30,
            default_port: BLUOS_DEFAULT_PORT,
            warm_up_on_start: true,
        }
    }
}

impl Config {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_duration_ms == 0 {
            return Err("sweep_duration_ms must be >= 1".to_string());
        }
        if self.probe_timeout_ms == 0 {
            return Err("probe_timeout_ms must be >= 1".to_string());
        }
        if self.max_concurrent_probes == 0 {
            return Err("max_concurrent_probes must be >= 1".to_string());
        }
        if self.default_port == 0 {
            return Err("default_port must be a valid port".to_string());
        }
        Ok(())
    }

    pub fn sweep_duration(&self) -> Duration {
        Duration::from_millis(self.sweep_duration_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
