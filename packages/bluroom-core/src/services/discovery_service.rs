//! Discovery orchestrator.
//!
//! Decides per request between three sources of players:
//!
//! - the memory cache, when it is fresh and the caller allows it
//! - a fast refresh, probing every known address directly (one round-trip)
//! - a full mDNS sweep (seconds of settle time)
//!
//! Discovery never fails from the caller's point of view. Sweep failures
//! return whatever is cached; store failures during a fast refresh fall back
//! to a full sweep.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

use crate::bluos::topology::organize_into_groups;
use crate::bluos::traits::PlayerProber;
use crate::bluos::types::{Player, PlayerGroup};
use crate::services::known_devices::{KnownDeviceStore, StoreResult};
use crate::services::player_cache::PlayerCache;
use crate::state::Config;

/// Service that produces the current player list and room view.
pub struct DiscoveryService {
    prober: Arc<dyn PlayerProber>,
    store: Arc<dyn KnownDeviceStore>,
    cache: Arc<PlayerCache>,
    config: Config,
    /// Serializes full sweeps so concurrent callers share one scan.
    sweep_lock: tokio::sync::Mutex<()>,
}

impl DiscoveryService {
    /// Creates a new DiscoveryService.
    ///
    /// # Arguments
    /// * `prober` - Probes single players and runs network sweeps
    /// * `store` - Durable known-device table
    /// * `cache` - Short-lived memory cache of the last result
    /// * `config` - Timeouts, concurrency and cache TTL
    pub fn new(
        prober: Arc<dyn PlayerProber>,
        store: Arc<dyn KnownDeviceStore>,
        cache: Arc<PlayerCache>,
        config: Config,
    ) -> Self {
        Self {
            prober,
            store,
            cache,
            config,
            sweep_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns a reference to the known-device store.
    pub fn store(&self) -> &Arc<dyn KnownDeviceStore> {
        &self.store
    }

    /// Returns a reference to the memory cache.
    pub fn cache(&self) -> &Arc<PlayerCache> {
        &self.cache
    }

    /// Returns the current players.
    ///
    /// # Arguments
    /// * `force_refresh` - Always run a full sweep
    /// * `skip_cache` - Ignore the memory cache even when fresh
    pub async fn discover(&self, force_refresh: bool, skip_cache: bool) -> Vec<Player> {
        if force_refresh {
            log::info!("[Discovery] Forced refresh, running full sweep");
            return self.full_sweep(true).await;
        }

        if !skip_cache {
            if let Some(players) = self.cache.get_if_fresh(self.config.cache_ttl()) {
                log::debug!("[Discovery] Serving {} cached player(s)", players.len());
                return players;
            }
        }

        match self.store.has_any().await {
            Ok(true) => self.fast_refresh().await,
            Ok(false) => {
                log::info!("[Discovery] No known devices, running full sweep");
                self.full_sweep(false).await
            }
            Err(e) => {
                log::warn!("[Discovery] Known-device store unavailable: {}", e);
                self.full_sweep(false).await
            }
        }
    }

    /// Re-probes known devices without a multicast sweep.
    ///
    /// Used after user actions that change topology. Degrades to a full sweep
    /// when nothing has been discovered yet.
    pub async fn refresh_known(&self) -> Vec<Player> {
        if self.cache.get().is_empty() {
            log::info!("[Discovery] Nothing cached yet, refresh runs a full sweep");
            return self.full_sweep(false).await;
        }
        self.fast_refresh().await
    }

    /// [`discover`](Self::discover) followed by topology resolution.
    pub async fn discover_groups(&self, force_refresh: bool, skip_cache: bool) -> Vec<PlayerGroup> {
        organize_into_groups(&self.discover(force_refresh, skip_cache).await)
    }

    /// [`refresh_known`](Self::refresh_known) followed by topology resolution.
    pub async fn refresh_known_groups(&self) -> Vec<PlayerGroup> {
        organize_into_groups(&self.refresh_known().await)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strategies
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs a full sweep, persisting and caching the result.
    ///
    /// A caller that had to wait for another sweep reuses its result when
    /// the cache is fresh, unless `forced`.
    async fn full_sweep(&self, forced: bool) -> Vec<Player> {
        let _guard = match self.sweep_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::debug!("[Discovery] Sweep in progress, waiting for it");
                let guard = self.sweep_lock.lock().await;
                if !forced {
                    if let Some(players) = self.cache.get_if_fresh(self.config.cache_ttl()) {
                        return players;
                    }
                }
                guard
            }
        };

        let players = match self.prober.sweep(self.config.sweep_duration()).await {
            Ok(players) => players,
            Err(e) => {
                log::warn!("[Discovery] Sweep failed, serving cached players: {}", e);
                return self.cache.get();
            }
        };

        if let Err(e) = self.store.upsert_from_players(&players).await {
            log::warn!("[Discovery] Failed to record swept players: {}", e);
        }
        self.cache.set(players.clone());

        log::info!("[Discovery] Full sweep found {} player(s)", players.len());
        players
    }

    /// Fast refresh with fallback to a full sweep on failure or total miss.
    async fn fast_refresh(&self) -> Vec<Player> {
        match self.probe_known().await {
            Ok(players) if !players.is_empty() => players,
            Ok(_) => {
                log::info!("[Discovery] No known device answered, running full sweep");
                self.full_sweep(false).await
            }
            Err(e) => {
                log::warn!("[Discovery] Fast refresh failed, running full sweep: {}", e);
                self.full_sweep(false).await
            }
        }
    }

    /// Probes every known address in parallel, then writes back sequentially.
    async fn probe_known(&self) -> StoreResult<Vec<Player>> {
        let known = self.store.get_all().await?;

        let mut seen = HashSet::new();
        let targets: Vec<(String, u16)> = known
            .into_iter()
            .filter(|device| seen.insert(device.address.clone()))
            .map(|device| {
                let port = if device.port == 0 {
                    self.config.default_port
                } else {
                    device.port
                };
                (device.address, port)
            })
            .collect();

        if targets.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("[Discovery] Fast refresh of {} known device(s)", targets.len());

        let timeout = self.config.probe_timeout();
        let outcomes: Vec<_> = stream::iter(targets)
            .map(|(address, port)| async move {
                let result = self.prober.probe(&address, port, timeout).await;
                (address, result)
            })
            .buffered(self.config.max_concurrent_probes.max(1))
            .collect()
            .await;

        let mut answered = Vec::new();
        let mut silent = Vec::new();
        for (address, result) in outcomes {
            match result {
                Ok(player) => answered.push(player),
                Err(e) => {
                    log::debug!("[Discovery] Known device offline: {}", e);
                    silent.push(address);
                }
            }
        }

        self.store.upsert_from_players(&answered).await?;
        for address in &silent {
            self.store.mark_offline(address).await?;
        }

        if !answered.is_empty() {
            self.cache.set(answered.clone());
        }

        log::info!(
            "[Discovery] Fast refresh: {} online, {} offline",
            answered.len(),
            silent.len()
        );
        Ok(answered)
    }
}
