//! Network prober: turns addresses into [`Player`] snapshots.
//!
//! A probe is one `/SyncStatus` round-trip plus a decode. A sweep is a
//! multicast scan followed by a bounded parallel probe of every candidate.
//! Per-candidate failures are logged and dropped, never surfaced.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::bluos::client::ClientError;
use crate::bluos::decoder::{decode_sync_status, DecodeError};
use crate::bluos::discovery::DiscoveryResult;
use crate::bluos::traits::{BluosStatus, CandidateSource, PlayerProber};
use crate::bluos::types::Player;

/// Why a single probe produced no player.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No usable response within the timeout; the device counts as offline.
    #[error("{address}:{port} unreachable: {source}")]
    Unreachable {
        address: String,
        port: u16,
        #[source]
        source: ClientError,
    },

    /// The device answered with a payload that could not be decoded.
    #[error("{address}:{port} sent an undecodable status: {source}")]
    Decode {
        address: String,
        port: u16,
        #[source]
        source: DecodeError,
    },
}

/// Convenient Result alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    pub fn address(&self) -> &str {
        match self {
            Self::Unreachable { address, .. } | Self::Decode { address, .. } => address,
        }
    }
}

/// Default [`PlayerProber`] backed by a status client and a candidate source.
pub struct NetworkProber {
    status: Arc<dyn BluosStatus>,
    candidates: Arc<dyn CandidateSource>,
    probe_timeout: Duration,
    max_concurrent_probes: usize,
}

impl NetworkProber {
    /// Creates a prober.
    ///
    /// # Arguments
    /// * `status` - Fetches raw status payloads from players
    /// * `candidates` - Multicast discovery mechanism used by `sweep`
    /// * `probe_timeout` - Per-device timeout for sweep probes
    /// * `max_concurrent_probes` - Upper bound on in-flight probes (min 1)
    pub fn new(
        status: Arc<dyn BluosStatus>,
        candidates: Arc<dyn CandidateSource>,
        probe_timeout: Duration,
        max_concurrent_probes: usize,
    ) -> Self {
        Self {
            status,
            candidates,
            probe_timeout,
            max_concurrent_probes: max_concurrent_probes.max(1),
        }
    }
}

#[async_trait]
impl PlayerProber for NetworkProber {
    async fn probe(&self, address: &str, port: u16, timeout: Duration) -> ProbeResult<Player> {
        let xml = self
            .status
            .fetch_sync_status(address, port, timeout)
            .await
            .map_err(|source| ProbeError::Unreachable {
                address: address.to_string(),
                port,
                source,
            })?;

        decode_sync_status(&xml, address, port).map_err(|source| ProbeError::Decode {
            address: address.to_string(),
            port,
            source,
        })
    }

    async fn sweep(&self, duration: Duration) -> DiscoveryResult<Vec<Player>> {
        let candidates = self.candidates.discover_candidates(duration).await?;
        log::info!(
            "[Prober] Sweep found {} candidate(s), probing with concurrency {}",
            candidates.len(),
            self.max_concurrent_probes
        );

        let timeout = self.probe_timeout;
        let results: Vec<ProbeResult<Player>> = stream::iter(candidates)
            .map(|candidate| async move {
                self.probe(&candidate.address, candidate.port, timeout)
                    .await
            })
            .buffer_unordered(self.max_concurrent_probes)
            .collect()
            .await;

        let mut seen = HashSet::new();
        let mut players = Vec::new();
        for result in results {
            match result {
                // A device reachable on two interfaces resolves to one id
                Ok(player) => {
                    if seen.insert(player.id.clone()) {
                        players.push(player);
                    }
                }
                Err(e) => log::debug!("[Prober] Dropping candidate: {}", e),
            }
        }

        players.sort_by(|a, b| (&a.address, a.port).cmp(&(&b.address, b.port)));
        log::info!("[Prober] Sweep complete: {} player(s)", players.len());
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluos::client::ClientResult;
    use crate::bluos::discovery::DiscoveryError;
    use crate::bluos::test_fixtures::{SYNC_STATUS_MASTER, SYNC_STATUS_STANDALONE};
    use crate::bluos::types::DiscoveredCandidate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned payloads per address; missing addresses time out.
    struct FakeStatus {
        payloads: HashMap<String, &'static str>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeStatus {
        fn new(payloads: &[(&str, &'static str)]) -> Self {
            Self {
                payloads: payloads
                    .iter()
                    .map(|(a, p)| (a.to_string(), *p))
                    .collect(),
                delay: Duration::from_millis(50),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BluosStatus for FakeStatus {
        async fn fetch_sync_status(
            &self,
            address: &str,
            _port: u16,
            timeout: Duration,
        ) -> ClientResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let result = match self.payloads.get(address) {
                Some(payload) => {
                    tokio::time::sleep(self.delay).await;
                    Ok(payload.to_string())
                }
                None => {
                    tokio::time::sleep(timeout).await;
                    Err(ClientError::Timeout {
                        url: address.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn fetch_status(&self, _address: &str, _port: u16) -> ClientResult<String> {
            unreachable!("prober never fetches playback status")
        }
    }

    struct FakeCandidates {
        result: Option<Vec<DiscoveredCandidate>>,
    }

    #[async_trait]
    impl CandidateSource for FakeCandidates {
        async fn discover_candidates(
            &self,
            _duration: Duration,
        ) -> DiscoveryResult<Vec<DiscoveredCandidate>> {
            self.result
                .clone()
                .ok_or_else(|| DiscoveryError::MdnsDaemon("socket closed".into()))
        }
    }

    fn prober(
        status: Arc<FakeStatus>,
        candidates: Option<Vec<DiscoveredCandidate>>,
        concurrency: usize,
    ) -> NetworkProber {
        NetworkProber::new(
            status,
            Arc::new(FakeCandidates { result: candidates }),
            Duration::from_millis(500),
            concurrency,
        )
    }

    #[tokio::test]
    async fn probe_decodes_player() {
        let status = Arc::new(FakeStatus::new(&[("192.168.1.30", SYNC_STATUS_STANDALONE)]));
        let prober = prober(status, Some(vec![]), 4);

        let player = prober
            .probe("192.168.1.30", 11000, Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(player.name, "Office");
        assert_eq!(player.address, "192.168.1.30");
    }

    #[tokio::test(start_paused = true)]
    async fn probe_reports_unreachable() {
        let status = Arc::new(FakeStatus::new(&[]));
        let prober = prober(status, Some(vec![]), 4);

        let err = prober
            .probe("192.168.1.99", 11000, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Unreachable { .. }));
        assert_eq!(err.address(), "192.168.1.99");
    }

    #[tokio::test]
    async fn probe_reports_decode_failure() {
        let status = Arc::new(FakeStatus::new(&[("192.168.1.30", "<html>nope</html>")]));
        let prober = prober(status, Some(vec![]), 4);

        let err = prober
            .probe("192.168.1.30", 11000, Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Decode { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_omits_unreachable_candidates() {
        let status = Arc::new(FakeStatus::new(&[
            ("192.168.1.30", SYNC_STATUS_STANDALONE),
            ("192.168.1.10", SYNC_STATUS_MASTER),
        ]));
        let candidates = vec![
            DiscoveredCandidate::new("192.168.1.30", 11000),
            DiscoveredCandidate::new("192.168.1.99", 11000),
            DiscoveredCandidate::new("192.168.1.10", 11000),
        ];
        let prober = prober(status, Some(candidates), 4);

        let players = prober.sweep(Duration::from_millis(10)).await.unwrap();
        let addresses: Vec<_> = players.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, vec!["192.168.1.10", "192.168.1.30"]);
    }

    #[tokio::test]
    async fn sweep_with_no_candidates_is_empty_not_error() {
        let status = Arc::new(FakeStatus::new(&[]));
        let prober = prober(status, Some(vec![]), 4);

        assert!(prober.sweep(Duration::from_millis(10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweep_surfaces_discovery_failure() {
        let status = Arc::new(FakeStatus::new(&[]));
        let prober = prober(status, None, 4);

        assert!(prober.sweep(Duration::from_millis(10)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_respects_concurrency_bound() {
        let payloads: Vec<(String, &'static str)> = (1..=6)
            .map(|i| (format!("192.168.1.{}", i), SYNC_STATUS_STANDALONE))
            .collect();
        let refs: Vec<(&str, &'static str)> =
            payloads.iter().map(|(a, p)| (a.as_str(), *p)).collect();
        let status = Arc::new(FakeStatus::new(&refs));
        let candidates = payloads
            .iter()
            .map(|(a, _)| DiscoveredCandidate::new(a.clone(), 11000))
            .collect();
        let prober = prober(Arc::clone(&status), Some(candidates), 2);

        prober.sweep(Duration::from_millis(10)).await.unwrap();
        assert_eq!(status.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn sweep_deduplicates_same_device() {
        let status = Arc::new(FakeStatus::new(&[
            ("192.168.1.30", SYNC_STATUS_STANDALONE),
            ("10.0.0.30", SYNC_STATUS_STANDALONE),
        ]));
        let candidates = vec![
            DiscoveredCandidate::new("192.168.1.30", 11000),
            DiscoveredCandidate::new("10.0.0.30", 11000),
        ];
        let prober = prober(status, Some(candidates), 4);

        // Same MAC on both interfaces
        assert_eq!(prober.sweep(Duration::from_millis(10)).await.unwrap().len(), 1);
    }
}
