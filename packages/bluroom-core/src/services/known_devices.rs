//! Known-device store: durable record of every player seen so far.
//!
//! The discovery service uses it to skip slow multicast sweeps by probing
//! known addresses directly. Records are matched by hardware address first
//! and IP address second, so a player that moved to a new DHCP lease keeps
//! its record. Going offline never deletes a record; only [`remove`] does.
//!
//! [`remove`]: KnownDeviceStore::remove

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bluos::types::{KnownDevice, Player};
use crate::protocol_constants::{KNOWN_DEVICES_FILE, KNOWN_DEVICES_TEMP_FILE};
use crate::utils::now_millis;

/// Errors from the known-device store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("known-device store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The records could not be serialized.
    #[error("known-device store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blocking write task panicked or was cancelled.
    #[error("known-device store write task failed: {0}")]
    WriteTask(#[from] tokio::task::JoinError),
}

/// Convenient Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for the durable known-device table.
///
/// Each method is atomic with respect to concurrent callers.
#[async_trait]
pub trait KnownDeviceStore: Send + Sync {
    /// Returns every record, online or not.
    async fn get_all(&self) -> StoreResult<Vec<KnownDevice>>;

    /// Returns true if at least one record exists.
    async fn has_any(&self) -> StoreResult<bool>;

    /// Inserts or refreshes one record per player, marking each online.
    async fn upsert_from_players(&self, players: &[Player]) -> StoreResult<()>;

    /// Marks the record(s) at `address` online. No-op if unknown.
    async fn mark_online(&self, address: &str) -> StoreResult<()>;

    /// Marks the record(s) at `address` offline. No-op if unknown.
    async fn mark_offline(&self, address: &str) -> StoreResult<()>;

    /// Deletes the record(s) at `address`. Returns false if nothing matched.
    async fn remove(&self, address: &str) -> StoreResult<bool>;
}

/// [`KnownDeviceStore`] kept in memory, optionally mirrored to a JSON file.
///
/// Writes build an updated copy of the table, persist it, and only then
/// replace the in-memory table, so a failed write leaves memory matching disk.
pub struct KnownDeviceRegistry {
    devices: Mutex<Vec<KnownDevice>>,
    /// Serializes update-then-persist cycles.
    write_lock: tokio::sync::Mutex<()>,
    /// Directory holding `known_devices.json`; `None` keeps records in memory only.
    data_dir: Option<PathBuf>,
}

impl KnownDeviceRegistry {
    /// Creates an empty store that is never persisted.
    pub fn in_memory() -> Self {
        Self::from_devices(Vec::new())
    }

    /// Creates a non-persistent store seeded with `devices`.
    pub fn from_devices(devices: Vec<KnownDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            write_lock: tokio::sync::Mutex::new(()),
            data_dir: None,
        }
    }

    /// Opens (or creates) the file-backed store in `data_dir`.
    ///
    /// A missing file starts an empty store. An unreadable file is logged and
    /// also starts empty; it is overwritten on the next write.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let path = data_dir.join(KNOWN_DEVICES_FILE);
        let devices = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(devices) => devices,
                Err(e) => {
                    log::warn!(
                        "[Store] Ignoring unreadable {}: {}",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        log::info!(
            "[Store] Loaded {} known device(s) from {}",
            devices.len(),
            path.display()
        );

        Ok(Self {
            devices: Mutex::new(devices),
            write_lock: tokio::sync::Mutex::new(()),
            data_dir: Some(data_dir.to_path_buf()),
        })
    }

    /// Writes `devices` to disk if this store is file-backed.
    ///
    /// Uses atomic write (temp file + rename) to prevent corruption on crash.
    /// File I/O runs on the blocking pool.
    async fn persist(&self, devices: &[KnownDevice]) -> StoreResult<()> {
        let Some(dir) = self.data_dir.clone() else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(devices)?;

        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let path = dir.join(KNOWN_DEVICES_FILE);
            let temp_path = dir.join(KNOWN_DEVICES_TEMP_FILE);
            std::fs::write(&temp_path, contents)?;
            std::fs::rename(&temp_path, &path)?;
            Ok(())
        })
        .await?
    }

    /// Applies `update` to a copy of the table and commits it.
    ///
    /// `update` returns its result and whether anything changed. Unchanged
    /// tables are not written. The in-memory table is replaced only after the
    /// write succeeded.
    async fn modify<R, F>(&self, update: F) -> StoreResult<R>
    where
        R: Send,
        F: FnOnce(&mut Vec<KnownDevice>) -> (R, bool) + Send,
    {
        let _write = self.write_lock.lock().await;

        let mut updated = self.devices.lock().clone();
        let (result, changed) = update(&mut updated);

        if changed {
            self.persist(&updated).await?;
            *self.devices.lock() = updated;
        }
        Ok(result)
    }

    /// Sets `is_online` for every record at `address`, persisting on change.
    async fn set_online(&self, address: &str, online: bool) -> StoreResult<()> {
        let now = now_millis();
        self.modify(|devices| {
            let mut changed = false;
            for device in devices.iter_mut().filter(|d| d.address == address) {
                if device.is_online != online {
                    device.is_online = online;
                    changed = true;
                }
                if online {
                    device.last_seen_at = now;
                    changed = true;
                }
            }
            ((), changed)
        })
        .await
    }
}

/// Finds the record for `player`: hardware address first, then IP address.
///
/// The address fallback never matches a record holding a different hardware
/// address; that address now belongs to another device and the old record
/// stays as it is.
fn find_match(devices: &[KnownDevice], player: &Player) -> Option<usize> {
    let mac = player.hardware_address.as_deref();
    if let Some(mac) = mac {
        let by_mac = devices.iter().position(|d| {
            d.hardware_address
                .as_deref()
                .is_some_and(|known| known.eq_ignore_ascii_case(mac))
        });
        if by_mac.is_some() {
            return by_mac;
        }
    }
    devices.iter().position(|d| {
        d.address == player.address && (d.hardware_address.is_none() || mac.is_none())
    })
}

#[async_trait]
impl KnownDeviceStore for KnownDeviceRegistry {
    async fn get_all(&self) -> StoreResult<Vec<KnownDevice>> {
        Ok(self.devices.lock().clone())
    }

    async fn has_any(&self) -> StoreResult<bool> {
        Ok(!self.devices.lock().is_empty())
    }

    async fn upsert_from_players(&self, players: &[Player]) -> StoreResult<()> {
        if players.is_empty() {
            return Ok(());
        }

        let now = now_millis();
        let inserted = self
            .modify(|devices| {
                let mut inserted = 0;
                for player in players {
                    match find_match(devices, player) {
                        Some(index) => devices[index].refresh_from(player, now),
                        None => {
                            devices.push(KnownDevice::from_player(player, now));
                            inserted += 1;
                        }
                    }
                }
                (inserted, true)
            })
            .await?;

        log::debug!(
            "[Store] Upserted {} player(s), {} new",
            players.len(),
            inserted
        );
        Ok(())
    }

    async fn mark_online(&self, address: &str) -> StoreResult<()> {
        self.set_online(address, true).await
    }

    async fn mark_offline(&self, address: &str) -> StoreResult<()> {
        self.set_online(address, false).await
    }

    async fn remove(&self, address: &str) -> StoreResult<bool> {
        let removed = self
            .modify(|devices| {
                let before = devices.len();
                devices.retain(|d| d.address != address);
                let removed = devices.len() != before;
                (removed, removed)
            })
            .await?;

        if removed {
            log::info!("[Store] Removed known device {}", address);
        }
        Ok(removed)
    }
}
