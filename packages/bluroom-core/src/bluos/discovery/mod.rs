//! Local-network discovery of BluOS players.
//!
//! BluOS players advertise `_musc._tcp.local.` over mDNS. The browser below
//! owns a lazily started daemon and hands out `(address, port)` candidates;
//! turning candidates into players is the prober's job.

pub mod mdns;
pub mod types;

pub use types::{DiscoveryError, DiscoveryResult};

use async_trait::async_trait;
use mdns_sd::ServiceDaemon;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::bluos::traits::CandidateSource;
use crate::bluos::types::DiscoveredCandidate;

/// mDNS-backed [`CandidateSource`].
///
/// The daemon is created on the first sweep and reused afterwards.
#[derive(Default)]
pub struct MdnsBrowser {
    daemon: OnceLock<Arc<ServiceDaemon>>,
}

impl MdnsBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets or creates the mDNS daemon.
    fn get_daemon(&self) -> DiscoveryResult<&Arc<ServiceDaemon>> {
        // OnceLock doesn't have get_or_try_init in stable, so we handle errors differently
        if let Some(daemon) = self.daemon.get() {
            return Ok(daemon);
        }

        let daemon = mdns::create_daemon()?;

        // May fail if another caller set it first, which is fine
        let _ = self.daemon.set(Arc::new(daemon));

        self.daemon.get().ok_or_else(|| {
            DiscoveryError::MdnsDaemon("failed to initialize mDNS daemon".to_string())
        })
    }

    /// Shuts down the daemon thread if it was started.
    pub fn shutdown(&self) {
        if let Some(daemon) = self.daemon.get() {
            if let Err(e) = daemon.shutdown() {
                log::debug!("[mDNS] Daemon shutdown failed: {:?}", e);
            }
        }
    }
}

#[async_trait]
impl CandidateSource for MdnsBrowser {
    async fn discover_candidates(
        &self,
        duration: Duration,
    ) -> DiscoveryResult<Vec<DiscoveredCandidate>> {
        let daemon = self.get_daemon()?;
        mdns::discover_mdns(daemon, duration).await
    }
}
