//! BluOS player discovery, status decoding, and control.
//!
//! This module talks to Bluesound/BluOS players over their XML-over-HTTP
//! control protocol and finds them on the local network via mDNS.
//!
//! # Module Structure
//!
//! - `types` - Domain types for players, rooms, and known devices
//! - `decoder` - `/SyncStatus` and `/Status` payload decoding
//! - `discovery` - mDNS browsing for `_musc._tcp.local.`
//! - `client` - `BluosClientImpl` HTTP transport
//! - `traits` - Trait abstractions for testability
//! - `prober` - Single-device probes and full network sweeps
//! - `playback` - Control actions and their endpoints
//! - `topology` - Grouping players into rooms
//! - `utils` - Shared XML and URL helpers

pub mod client;
pub mod decoder;
pub mod discovery;
pub mod playback;
pub mod prober;
pub mod topology;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export trait abstractions
pub use traits::{BluosClient, BluosControl, BluosStatus, CandidateSource, PlayerProber};

// Re-export concrete implementations
pub use client::BluosClientImpl;
pub use discovery::MdnsBrowser;
pub use prober::NetworkProber;

pub use playback::ControlAction;
pub use topology::organize_into_groups;
