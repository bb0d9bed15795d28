//! mDNS/Bonjour-based BluOS player discovery.
//!
//! Uses DNS-SD to browse for `_musc._tcp.local.` services.
//!
//! # Key Design Points
//!
//! - Uses resolved record data (IP from SRV/A answers), not instance-name parsing
//! - Calls `stop_browse()` after the scan window to avoid accumulating daemon work
//! - Isolated in this module for forward compatibility (mdns-sd may deprecate `ServiceResolved`)

use mdns_sd::{ResolvedService, ScopedIp, ServiceDaemon, ServiceEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::types::{DiscoveryError, DiscoveryResult};
use crate::bluos::types::DiscoveredCandidate;
use crate::protocol_constants::{BLUOS_DEFAULT_PORT, BLUOS_SERVICE_TYPE};

/// Browses for BluOS players for `browse_duration`.
///
/// # Arguments
///
/// * `daemon` - Shared mDNS service daemon (reused across sweeps)
/// * `browse_duration` - How long to collect resolved services
///
/// # Returns
///
/// Unique `(address, port)` candidates. Zero candidates is a valid result.
pub async fn discover_mdns(
    daemon: &Arc<ServiceDaemon>,
    browse_duration: Duration,
) -> DiscoveryResult<Vec<DiscoveredCandidate>> {
    log::debug!(
        "[mDNS] Starting discovery, browse window: {}ms",
        browse_duration.as_millis()
    );

    let receiver = daemon
        .browse(BLUOS_SERVICE_TYPE)
        .map_err(|e| DiscoveryError::Browse {
            service_type: BLUOS_SERVICE_TYPE,
            reason: e.to_string(),
        })?;

    let mut discovered: HashMap<String, DiscoveredCandidate> = HashMap::new();

    let start = std::time::Instant::now();
    while start.elapsed() < browse_duration {
        let remaining = browse_duration.saturating_sub(start.elapsed());

        match timeout(remaining, async { receiver.recv_async().await }).await {
            Ok(Ok(event)) => {
                if let ServiceEvent::ServiceResolved(info) = event {
                    log::trace!("[mDNS] Service resolved: {:?}", info.fullname);

                    if let Some(candidate) = parse_mdns_service(&info) {
                        let key = format!("{}:{}", candidate.address, candidate.port);
                        log::debug!(
                            "[mDNS] Discovered candidate: {} ({})",
                            key,
                            info.fullname
                        );
                        discovered.insert(key, candidate);
                    }
                }
            }
            Ok(Err(e)) => {
                log::debug!("[mDNS] Receiver channel closed: {:?}", e);
                break;
            }
            Err(_) => {
                // Scan window elapsed
                break;
            }
        }
    }

    if let Err(e) = daemon.stop_browse(BLUOS_SERVICE_TYPE) {
        log::warn!("[mDNS] Failed to stop browse: {:?}", e);
    }

    let mut candidates: Vec<_> = discovered.into_values().collect();
    candidates.sort_by(|a, b| (&a.address, a.port).cmp(&(&b.address, b.port)));
    log::debug!(
        "[mDNS] Discovery complete: {} candidate(s) found",
        candidates.len()
    );

    Ok(candidates)
}

/// Extracts an IPv4 candidate from a resolved service.
fn parse_mdns_service(info: &ResolvedService) -> Option<DiscoveredCandidate> {
    let address = info.addresses.iter().find_map(|addr| match addr {
        ScopedIp::V4(v4) => Some(v4.addr().to_string()),
        ScopedIp::V6(_) | _ => None,
    })?;

    Some(DiscoveredCandidate::new(address, candidate_port(info.port)))
}

/// Uses the advertised port, or the BluOS default when none is advertised.
fn candidate_port(advertised: u16) -> u16 {
    if advertised > 0 {
        advertised
    } else {
        BLUOS_DEFAULT_PORT
    }
}

/// Creates a new mDNS service daemon.
///
/// This should be called once and the daemon reused across sweeps.
/// The daemon spawns a background thread for mDNS operations.
pub fn create_daemon() -> DiscoveryResult<ServiceDaemon> {
    ServiceDaemon::new().map_err(|e| DiscoveryError::MdnsDaemon(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertised_port_is_kept() {
        assert_eq!(candidate_port(11010), 11010);
    }

    #[test]
    fn missing_port_uses_default() {
        assert_eq!(candidate_port(0), BLUOS_DEFAULT_PORT);
    }
}
