//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the BluOS control protocol and its mDNS
//! advertisement, and changing them would break compatibility with players.

// ─────────────────────────────────────────────────────────────────────────────
// BluOS HTTP Control Protocol
// ─────────────────────────────────────────────────────────────────────────────

/// Default HTTP control port of a BluOS player.
pub const BLUOS_DEFAULT_PORT: u16 = 11000;

/// Path of the topology/volume payload (`<SyncStatus>` root).
pub const SYNC_STATUS_PATH: &str = "/SyncStatus";

/// Path of the now-playing payload (`<status>` root).
pub const STATUS_PATH: &str = "/Status";

/// Reported volume values below zero mean the output level is fixed
/// (controlled by an external amplifier).
pub const FIXED_VOLUME_THRESHOLD: i32 = 0;

/// Maximum volume accepted by `/Volume?level=`.
pub const MAX_VOLUME: u8 = 100;

// ─────────────────────────────────────────────────────────────────────────────
// mDNS
// ─────────────────────────────────────────────────────────────────────────────

/// BluOS player mDNS service type (note: trailing dot is required by mdns-sd).
pub const BLUOS_SERVICE_TYPE: &str = "_musc._tcp.local.";

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

/// File name of the known-device registry inside the data directory.
pub const KNOWN_DEVICES_FILE: &str = "known_devices.json";

/// Temporary file used for atomic registry writes.
pub const KNOWN_DEVICES_TEMP_FILE: &str = "known_devices.json.tmp";

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "bluroom-server";

/// Default timeout for control requests (seconds).
///
/// 10 seconds is reasonable for LAN operations.
pub const CONTROL_TIMEOUT_SECS: u64 = 10;
