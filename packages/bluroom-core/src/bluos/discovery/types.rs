//! Shared types for BluOS multicast discovery.

use thiserror::Error;

/// Errors that can occur during a multicast discovery sweep.
///
/// These are sweep-level failures of the discovery mechanism itself.
/// Individual devices failing to answer are never reported here.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to start or talk to the mDNS daemon.
    #[error("mDNS daemon error: {0}")]
    MdnsDaemon(String),

    /// Failed to start browsing for the service type.
    #[error("mDNS browse failed for {service_type}: {reason}")]
    Browse {
        service_type: &'static str,
        reason: String,
    },
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
