//! Bluroom Core - BluOS player discovery and room topology.
//!
//! This crate finds Bluesound/BluOS players on the local network, keeps a
//! durable record of every player it has seen, and resolves the players'
//! self-reported grouping into rooms (standalone players, stereo pairs and
//! multi-room groups). It also exposes thin playback-control passthroughs and
//! an HTTP API used by the standalone server.
//!
//! # Architecture
//!
//! - [`bluos`]: Device protocol: decoding, mDNS discovery, probing, control, topology
//! - [`services`]: Known-device store, memory cache, discovery orchestration, control
//! - [`api`]: Axum HTTP surface
//! - [`bootstrap`]: Composition root
//! - [`state`]: Configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Services depend on traits so tests can swap the network out:
//!
//! - [`PlayerProber`](bluos::PlayerProber): single probes and full sweeps
//! - [`CandidateSource`](bluos::CandidateSource): multicast discovery
//! - [`BluosClient`](bluos::BluosClient): raw status and control requests
//! - [`KnownDeviceStore`](services::KnownDeviceStore): durable device table

#![warn(clippy::all)]

pub mod api;
pub mod bluos;
pub mod bootstrap;
pub mod error;
pub mod protocol_constants;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{BluroomError, BluroomResult, ErrorCode};
pub use state::Config;
pub use utils::{now_millis, validate_player_ip, IpValidationError};

// Re-export BluOS types
pub use bluos::types::{
    DiscoveredCandidate, GroupType, KnownDevice, PlaybackState, PlaybackStatus, Player,
    PlayerGroup,
};
pub use bluos::{
    organize_into_groups, BluosClient, BluosClientImpl, CandidateSource, ControlAction,
    NetworkProber, PlayerProber,
};

// Re-export service types
pub use services::{
    CredentialCache, CredentialSource, DiscoveryService, KnownDeviceRegistry, KnownDeviceStore,
    PlayerCache, PlayerController,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, bootstrap_with_store, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
