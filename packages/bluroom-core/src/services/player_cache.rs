//! Short-lived in-process cache of the last discovery result.
//!
//! Absorbs bursts of UI requests. The list and its timestamp live under one
//! lock so a reader never sees a list paired with another list's timestamp.
//! Writes replace the whole list; there is no merging.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::bluos::types::Player;

#[derive(Default)]
struct CacheEntry {
    players: Vec<Player>,
    stamped_at: Option<Instant>,
}

/// Memory cache of the latest player list.
#[derive(Default)]
pub struct PlayerCache {
    entry: Mutex<CacheEntry>,
}

impl PlayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached players, empty if nothing is cached.
    pub fn get(&self) -> Vec<Player> {
        self.entry.lock().players.clone()
    }

    /// Replaces the cached list wholesale and stamps the current time.
    pub fn set(&self, players: Vec<Player>) {
        let mut entry = self.entry.lock();
        log::debug!("[Cache] Storing {} player(s)", players.len());
        entry.players = players;
        entry.stamped_at = Some(Instant::now());
    }

    /// True iff the cache is non-empty and younger than `max_age`.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        let entry = self.entry.lock();
        match entry.stamped_at {
            Some(stamped_at) if !entry.players.is_empty() => stamped_at.elapsed() < max_age,
            _ => false,
        }
    }

    /// Returns the cached players if fresh, in one lock acquisition.
    pub fn get_if_fresh(&self, max_age: Duration) -> Option<Vec<Player>> {
        let entry = self.entry.lock();
        match entry.stamped_at {
            Some(stamped_at) if !entry.players.is_empty() && stamped_at.elapsed() < max_age => {
                Some(entry.players.clone())
            }
            _ => None,
        }
    }

    /// Empties the cache.
    pub fn clear(&self) {
        let mut entry = self.entry.lock();
        entry.players.clear();
        entry.stamped_at = None;
    }
}
