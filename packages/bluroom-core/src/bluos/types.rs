//! Domain types for BluOS players, playback status, and resolved rooms.

use serde::{Deserialize, Serialize};

/// One physical (or, for stereo-pair controllers, logical) BluOS endpoint.
///
/// A `Player` is an immutable snapshot produced by one `/SyncStatus` probe.
/// A later probe yields a new value that replaces this one in caches and
/// stores; nothing mutates a player in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier: the hardware address when reported, else `address:port`.
    pub id: String,
    /// IP address the player answered on.
    pub address: String,
    /// HTTP control port.
    pub port: u16,
    /// User-configured room name.
    pub name: String,
    pub model_name: Option<String>,
    pub brand: Option<String>,
    /// MAC address, used to reconcile identity across IP changes.
    pub hardware_address: Option<String>,
    /// Normalized volume (0-100). Always 0 when `is_fixed_volume` is set.
    pub volume: u8,
    /// True when the device reports a negative volume (external level control).
    pub is_fixed_volume: bool,
    /// True when the device belongs to a multi-room group (as master or slave).
    pub is_grouped: bool,
    /// True when the device leads a multi-room group.
    pub is_master: bool,
    /// Set on a slave: address of its group master.
    pub master_address: Option<String>,
    /// Set on a master: addresses of its slaves.
    pub slave_addresses: Vec<String>,
    /// Group name reported by a grouped device (e.g. `Kitchen+Patio`).
    pub group_name: Option<String>,
    /// True when the device is one half of a stereo pair.
    pub is_stereo_paired: bool,
    /// Channel assignment reported by the device (`left`, `right`, `stereo`, ...).
    pub channel_mode: Option<String>,
    /// Zone name of a stereo pair.
    pub zone_name: Option<String>,
    /// True only for the silent half of a stereo pair; never rendered as a room.
    pub is_secondary_stereo_pair_speaker: bool,
}

impl Player {
    /// Builds the fallback identity used when no hardware address is reported.
    #[must_use]
    pub fn composite_id(address: &str, port: u16) -> String {
        format!("{}:{}", address, port)
    }

    /// Returns true if this player may surface as a room of its own.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.is_secondary_stereo_pair_speaker
    }

    /// Name to show for the room this player represents.
    ///
    /// Stereo pairs prefer the zone name shared by both halves.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.is_stereo_paired {
            if let Some(zone) = self.zone_name.as_deref().filter(|z| !z.is_empty()) {
                return zone;
            }
        }
        &self.name
    }
}

/// Transport state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    Streaming,
}

impl PlaybackState {
    /// Parses a BluOS `<state>` value.
    ///
    /// `connecting` is reported while a stream buffers and maps to `Streaming`.
    /// Unknown values map to `Stopped`.
    #[must_use]
    pub fn from_bluos(raw: &str) -> Self {
        match raw.trim() {
            "play" => Self::Playing,
            "pause" => Self::Paused,
            "stream" | "connecting" => Self::Streaming,
            _ => Self::Stopped,
        }
    }
}

/// Ephemeral now-playing snapshot fetched on demand from `/Status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub image_url: Option<String>,
    /// Elapsed seconds, never greater than `total_seconds` when both are known.
    pub current_seconds: Option<u32>,
    pub total_seconds: Option<u32>,
    pub service_name: Option<String>,
}

/// Classification of a resolved room.
///
/// The declaration order is the sort order of resolved groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupType {
    Single,
    StereoPair,
    MultiRoom,
}

/// A resolved, UI-facing room made of one or more players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGroup {
    /// Identifier of the master (or sole) player.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    /// The player that represents and controls the room.
    pub master: Player,
    /// Additional players of a multi-room group, empty otherwise.
    pub members: Vec<Player>,
}

impl PlayerGroup {
    /// Iterates over the master followed by all members.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.master).chain(self.members.iter())
    }
}

/// A device address produced by multicast discovery, before probing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredCandidate {
    pub address: String,
    pub port: u16,
}

impl DiscoveredCandidate {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// Durable record of a previously seen player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownDevice {
    pub address: String,
    pub port: u16,
    pub hardware_address: Option<String>,
    pub name: String,
    pub model_name: Option<String>,
    pub brand: Option<String>,
    /// Unix milliseconds of the first successful discovery.
    pub discovered_at: u64,
    /// Unix milliseconds of the latest successful probe.
    pub last_seen_at: u64,
    pub is_online: bool,
}

impl KnownDevice {
    /// Creates a record from a freshly probed player.
    pub fn from_player(player: &Player, now: u64) -> Self {
        Self {
            address: player.address.clone(),
            port: player.port,
            hardware_address: player.hardware_address.clone(),
            name: player.name.clone(),
            model_name: player.model_name.clone(),
            brand: player.brand.clone(),
            discovered_at: now,
            last_seen_at: now,
            is_online: true,
        }
    }

    /// Refreshes this record from a newer probe of the same device.
    pub fn refresh_from(&mut self, player: &Player, now: u64) {
        self.address = player.address.clone();
        self.port = player.port;
        if player.hardware_address.is_some() {
            self.hardware_address = player.hardware_address.clone();
        }
        self.name = player.name.clone();
        self.model_name = player.model_name.clone();
        self.brand = player.brand.clone();
        self.last_seen_at = now;
        self.is_online = true;
    }
}
