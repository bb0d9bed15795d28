//! Application services layer.
//!
//! This module contains the business logic services that orchestrate
//! between the API layer and the BluOS infrastructure (bluos/).

pub mod credential_cache;
pub mod discovery_service;
pub mod known_devices;
pub mod player_cache;
pub mod player_control;

pub use credential_cache::{CredentialCache, CredentialSource};
pub use discovery_service::DiscoveryService;
pub use known_devices::{KnownDeviceRegistry, KnownDeviceStore, StoreError};
pub use player_cache::PlayerCache;
pub use player_control::PlayerController;
