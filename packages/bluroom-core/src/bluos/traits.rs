//! Trait abstractions for BluOS operations.
//!
//! These traits enable dependency injection for testability and modularity.
//! Services depend on traits rather than concrete implementations.

use std::time::Duration;

use async_trait::async_trait;

use crate::bluos::client::ClientResult;
use crate::bluos::discovery::DiscoveryResult;
use crate::bluos::playback::ControlAction;
use crate::bluos::prober::ProbeResult;
use crate::bluos::types::{DiscoveredCandidate, Player};

/// Trait for the local-network multicast discovery mechanism.
///
/// Used by `NetworkProber` to find candidate addresses without prior knowledge.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Scans the local network for `duration` and returns candidate endpoints.
    async fn discover_candidates(
        &self,
        duration: Duration,
    ) -> DiscoveryResult<Vec<DiscoveredCandidate>>;
}

/// Trait for fetching raw status payloads from a player.
///
/// Payloads are returned undecoded; see [`crate::bluos::decoder`].
#[async_trait]
pub trait BluosStatus: Send + Sync {
    /// Fetches the `/SyncStatus` topology/volume payload.
    ///
    /// # Arguments
    /// * `address` - IP address of the player
    /// * `port` - HTTP control port of the player
    /// * `timeout` - Upper bound for the whole round-trip
    async fn fetch_sync_status(
        &self,
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> ClientResult<String>;

    /// Fetches the `/Status` now-playing payload.
    async fn fetch_status(&self, address: &str, port: u16) -> ClientResult<String>;
}

/// Trait for sending control actions to a player.
#[async_trait]
pub trait BluosControl: Send + Sync {
    /// Sends one control action to the player at `address:port`.
    async fn send_action(&self, address: &str, port: u16, action: &ControlAction)
        -> ClientResult<()>;
}

/// Trait for turning network addresses into [`Player`] snapshots.
///
/// Used by `DiscoveryService` for both full sweeps and fast refreshes.
#[async_trait]
pub trait PlayerProber: Send + Sync {
    /// Probes a single address, bounded by `timeout`.
    async fn probe(&self, address: &str, port: u16, timeout: Duration) -> ProbeResult<Player>;

    /// Runs a multicast sweep for `duration`, then probes every candidate.
    ///
    /// Candidates that fail to answer are omitted; only a failure of the
    /// discovery mechanism itself is an error.
    async fn sweep(&self, duration: Duration) -> DiscoveryResult<Vec<Player>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for all device HTTP operations.
///
/// Used by `PlayerController` which needs both status and control calls.
#[async_trait]
pub trait BluosClient: BluosStatus + BluosControl {}

/// Blanket implementation for any type implementing both traits.
impl<T: BluosStatus + BluosControl> BluosClient for T {}
