//! General utilities shared across the application.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{SystemTime, UNIX_EPOCH};

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch (shouldn't happen in practice).
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Address Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Reasons an address cannot be a BluOS player on the local network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpValidationError {
    Ipv6NotSupported,
    Loopback,
    Unspecified,
    Broadcast,
    Multicast,
}

impl IpValidationError {
    /// Human-readable message for API responses.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Ipv6NotSupported => "IPv6 addresses are not supported",
            Self::Loopback => "Loopback addresses are not allowed",
            Self::Unspecified => "Unspecified address (0.0.0.0) is not allowed",
            Self::Broadcast => "Broadcast address is not allowed",
            Self::Multicast => "Multicast addresses are not allowed",
        }
    }
}

/// Validates that an IP address can address a player on the LAN.
///
/// Returns the IPv4 address on success.
pub fn validate_player_ip(ip: &IpAddr) -> Result<Ipv4Addr, IpValidationError> {
    let IpAddr::V4(v4) = ip else {
        return Err(IpValidationError::Ipv6NotSupported);
    };

    if v4.is_loopback() {
        return Err(IpValidationError::Loopback);
    }
    if v4.is_unspecified() {
        return Err(IpValidationError::Unspecified);
    }
    if v4.is_broadcast() {
        return Err(IpValidationError::Broadcast);
    }
    if v4.is_multicast() {
        return Err(IpValidationError::Multicast);
    }

    Ok(*v4)
}
