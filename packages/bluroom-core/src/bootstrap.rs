//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root - the single place where all
//! services are instantiated and wired together.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::bluos::{
    BluosClient, BluosClientImpl, BluosStatus, CandidateSource, MdnsBrowser, NetworkProber,
};
use crate::error::{BluroomError, BluroomResult};
use crate::protocol_constants::CONTROL_TIMEOUT_SECS;
use crate::services::{
    DiscoveryService, KnownDeviceRegistry, KnownDeviceStore, PlayerCache, PlayerController,
};
use crate::state::Config;

/// Container for all bootstrapped services.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Discovery orchestrator (cache, fast refresh, sweeps).
    pub discovery_service: Arc<DiscoveryService>,
    /// Status and control passthroughs.
    pub player_controller: Arc<PlayerController>,
    /// mDNS browser, kept for shutdown.
    mdns: Arc<MdnsBrowser>,
    /// Validated configuration the services were built with.
    pub config: Config,
}

impl BootstrappedServices {
    /// Spawns one background discovery so the first UI request hits the cache.
    pub fn spawn_warm_up(&self) {
        let discovery = Arc::clone(&self.discovery_service);
        tokio::spawn(async move {
            let players = discovery.discover(false, false).await;
            log::info!("[Bootstrap] Warm-up discovered {} player(s)", players.len());
        });
    }

    /// Stops background network activity.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] Shutting down mDNS browser");
        self.mdns.shutdown();
    }
}

/// Creates the shared HTTP client for all player communication.
///
/// Using a shared client enables connection pooling for better performance.
fn create_http_client() -> BluroomResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(CONTROL_TIMEOUT_SECS))
        .build()
        .map_err(|e| BluroomError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps all application services with their dependencies.
///
/// Services are created in dependency order:
///
/// 1. Shared HTTP client and BluOS client
/// 2. mDNS browser and network prober
/// 3. Known-device store (file-backed when `data_dir` is set) and memory cache
/// 4. Discovery service, then player controller
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the store cannot be opened.
pub fn bootstrap_services(
    config: &Config,
    data_dir: Option<&Path>,
) -> BluroomResult<BootstrappedServices> {
    config.validate().map_err(BluroomError::Configuration)?;

    let store: Arc<dyn KnownDeviceStore> = match data_dir {
        Some(dir) => {
            log::info!("[Bootstrap] Using data directory: {}", dir.display());
            Arc::new(KnownDeviceRegistry::open(dir)?)
        }
        None => {
            log::info!("[Bootstrap] No data directory configured - known devices will not persist");
            Arc::new(KnownDeviceRegistry::in_memory())
        }
    };

    bootstrap_with_store(config, store)
}

/// Bootstraps services around an existing known-device store.
pub fn bootstrap_with_store(
    config: &Config,
    store: Arc<dyn KnownDeviceStore>,
) -> BluroomResult<BootstrappedServices> {
    config.validate().map_err(BluroomError::Configuration)?;

    let http_client = create_http_client()?;
    let bluos_impl = Arc::new(BluosClientImpl::new(http_client));
    let mdns = Arc::new(MdnsBrowser::new());

    let prober = Arc::new(NetworkProber::new(
        Arc::clone(&bluos_impl) as Arc<dyn BluosStatus>,
        Arc::clone(&mdns) as Arc<dyn CandidateSource>,
        config.probe_timeout(),
        config.max_concurrent_probes,
    ));

    let discovery_service = Arc::new(DiscoveryService::new(
        prober,
        store,
        Arc::new(PlayerCache::new()),
        config.clone(),
    ));

    let player_controller = Arc::new(PlayerController::new(
        bluos_impl as Arc<dyn BluosClient>,
        Arc::clone(&discovery_service),
    ));

    Ok(BootstrappedServices {
        discovery_service,
        player_controller,
        mdns,
        config: config.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn http_client_is_created() {
        let client = create_http_client().unwrap();
        assert!(client.get("http://192.168.1.10:11000/Status").build().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = Config {
            max_concurrent_probes: 0,
            ..Config::default()
        };
        let err = bootstrap_services(&config, None).err().unwrap();
        assert!(matches!(err, BluroomError::Configuration(_)));
    }

    #[tokio::test]
    async fn file_store_is_used_with_data_dir() {
        let dir = TempDir::new().unwrap();
        let services = bootstrap_services(&Config::default(), Some(dir.path())).unwrap();

        services
            .discovery_service
            .store()
            .upsert_from_players(&[crate::bluos::types::test_support::player(
                "192.168.1.30",
                "Office",
            )])
            .await
            .unwrap();

        assert!(dir
            .path()
            .join(crate::protocol_constants::KNOWN_DEVICES_FILE)
            .exists());
    }
}
