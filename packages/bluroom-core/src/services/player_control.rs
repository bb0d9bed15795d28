//! Playback passthroughs to individual players.
//!
//! Unlike discovery, these calls can fail outright and report the failure of
//! the one action. Group-changing actions re-probe the known devices so the
//! caller gets the updated room view back.

use std::net::IpAddr;
use std::sync::Arc;

use crate::bluos::decoder::decode_playback_status;
use crate::bluos::playback::ControlAction;
use crate::bluos::traits::BluosClient;
use crate::bluos::types::{PlaybackStatus, PlayerGroup};
use crate::error::{BluroomError, BluroomResult};
use crate::services::discovery_service::DiscoveryService;
use crate::utils::validate_player_ip;

/// Service for status fetches and control actions by address.
pub struct PlayerController {
    client: Arc<dyn BluosClient>,
    discovery: Arc<DiscoveryService>,
}

impl PlayerController {
    pub fn new(client: Arc<dyn BluosClient>, discovery: Arc<DiscoveryService>) -> Self {
        Self { client, discovery }
    }

    /// Fetches and decodes the now-playing status of a player.
    pub async fn status(&self, address: &str, port: u16) -> BluroomResult<PlaybackStatus> {
        validate_address(address)?;

        let xml = self.client.fetch_status(address, port).await?;
        let status = decode_playback_status(&xml, address, port)?;

        log::debug!(
            "[Control] {}:{} is {:?}",
            address,
            port,
            status.state
        );
        Ok(status)
    }

    /// Sends a control action to a player.
    ///
    /// Returns the refreshed rooms when the action changed grouping,
    /// `None` otherwise.
    pub async fn control(
        &self,
        address: &str,
        port: u16,
        action: &ControlAction,
    ) -> BluroomResult<Option<Vec<PlayerGroup>>> {
        validate_address(address)?;
        if let Some(target) = action.target_address() {
            validate_address(target)?;
            if target == address {
                return Err(BluroomError::InvalidRequest(
                    "a player cannot be grouped with itself".to_string(),
                ));
            }
        }

        self.client.send_action(address, port, action).await?;
        log::info!("[Control] {} sent to {}:{}", action.name(), address, port);

        if action.changes_grouping() {
            return Ok(Some(self.discovery.refresh_known_groups().await));
        }
        Ok(None)
    }
}

/// Parses and validates a player address from a request.
fn validate_address(address: &str) -> BluroomResult<()> {
    let ip: IpAddr = address
        .parse()
        .map_err(|_| BluroomError::InvalidIp(format!("'{}' is not an IP address", address)))?;
    validate_player_ip(&ip)?;
    Ok(())
}
