//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port to bind the HTTP server to.
    /// Override: `BLUROOM_BIND_PORT`
    #[serde(alias = "bind_port")]
    pub bind_port: u16,

    /// How long a full multicast sweep listens, in milliseconds.
    /// Override: `BLUROOM_SWEEP_DURATION_MS`
    #[serde(alias = "sweep_duration_ms")]
    pub sweep_duration_ms: u64,

    /// Per-device probe timeout in milliseconds.
    /// Override: `BLUROOM_PROBE_TIMEOUT_MS`
    #[serde(alias = "probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Maximum number of devices probed at once.
    #[serde(alias = "max_concurrent_probes")]
    pub max_concurrent_probes: usize,

    /// How long discovered players are served from memory, in seconds.
    /// Override: `BLUROOM_CACHE_TTL_SECS`
    #[serde(alias = "cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Port assumed for known devices recorded without one.
    #[serde(alias = "default_port")]
    pub default_port: u16,

    /// Run one discovery in the background at startup.
    #[serde(alias = "warm_up_on_start")]
    pub warm_up_on_start: bool,

    /// Directory for persistent data (known devices).
    /// Override: `BLUROOM_DATA_DIR`
    #[serde(alias = "data_dir")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let core = bluroom_core::Config::default();
        Self {
            bind_port: 49410,
            sweep_duration_ms: core.sweep_duration_ms,
            probe_timeout_ms: core.probe_timeout_ms,
            max_concurrent_probes: core.max_concurrent_probes,
            cache_ttl_secs: core.cache_ttl_secs,
            default_port: core.default_port,
            warm_up_on_start: core.warm_up_on_start,
            data_dir: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies overrides from `lookup` (the process environment outside tests).
    ///
    /// Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("BLUROOM_BIND_PORT").and_then(|v| v.parse().ok()) {
            self.bind_port = port;
        }

        if let Some(ms) = lookup("BLUROOM_SWEEP_DURATION_MS").and_then(|v| v.parse().ok()) {
            self.sweep_duration_ms = ms;
        }

        if let Some(ms) = lookup("BLUROOM_PROBE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.probe_timeout_ms = ms;
        }

        if let Some(secs) = lookup("BLUROOM_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.cache_ttl_secs = secs;
        }

        // Note: BLUROOM_DATA_DIR is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to bluroom-core's Config type.
    pub fn to_core_config(&self) -> bluroom_core::Config {
        bluroom_core::Config {
            sweep_duration_ms: self.sweep_duration_ms,
            probe_timeout_ms: self.probe_timeout_ms,
            max_concurrent_probes: self.max_concurrent_probes,
            cache_ttl_secs: self.cache_ttl_secs,
            default_port: self.default_port,
            warm_up_on_start: self.warm_up_on_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_core() {
        let config = ServerConfig::default();
        assert_eq!(config.to_core_config(), bluroom_core::Config::default());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn yaml_accepts_both_key_styles() {
        let config = ServerConfig::from_yaml(
            "bindPort: 8080\nprobe_timeout_ms: 500\ncacheTtlSecs: 5\ndataDir: /var/lib/bluroom\n",
        )
        .unwrap();

        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.probe_timeout_ms, 500);
        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/bluroom")));
        assert_eq!(config.sweep_duration_ms, 3000);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = ServerConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.bind_port, ServerConfig::default().bind_port);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(ServerConfig::from_yaml("bindPort: [not a port").is_err());
    }

    #[test]
    fn overrides_replace_parsed_values() {
        let env: HashMap<&str, &str> = [
            ("BLUROOM_BIND_PORT", "9000"),
            ("BLUROOM_SWEEP_DURATION_MS", "1500"),
            ("BLUROOM_PROBE_TIMEOUT_MS", "abc"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.sweep_duration_ms, 1500);
        assert_eq!(config.probe_timeout_ms, 2000);
    }
}
