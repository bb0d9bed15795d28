//! Playback control commands for BluOS players.
//!
//! Control requests are plain HTTP GETs against the player's control port.
//! Actions are a closed enumeration decided at the API boundary; each maps to
//! exactly one endpoint. Idempotent actions are retried on transient errors.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bluos::client::{get_text, ClientResult};
use crate::bluos::utils::build_player_url;
use crate::protocol_constants::{BLUOS_DEFAULT_PORT, CONTROL_TIMEOUT_SECS, MAX_VOLUME};

/// Retry delays for transient control errors (exponential backoff).
const RETRY_DELAYS_MS: [u64; 3] = [200, 500, 1000];

fn default_port() -> u16 {
    BLUOS_DEFAULT_PORT
}

/// A control action that can be sent to a player.
///
/// Serialized as `{"action": "setVolume", "level": 30}` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlAction {
    Play,
    Pause,
    Stop,
    /// Skip to the next track.
    Next,
    /// Go back to the previous track.
    Previous,
    /// Set absolute volume (clamped to 0-100).
    SetVolume { level: u8 },
    Mute { mute: bool },
    /// Play a stored preset by number.
    PlayPreset { id: u32 },
    /// Add another player to this player's group (this player becomes master).
    AddSlave {
        address: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    /// Remove a player from this player's group.
    RemoveSlave {
        address: String,
        #[serde(default = "default_port")]
        port: u16,
    },
}

impl ControlAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::SetVolume { .. } => "SetVolume",
            Self::Mute { .. } => "Mute",
            Self::PlayPreset { .. } => "PlayPreset",
            Self::AddSlave { .. } => "AddSlave",
            Self::RemoveSlave { .. } => "RemoveSlave",
        }
    }

    /// Path and query of the BluOS endpoint for this action.
    ///
    /// Query values are numeric or validated IPv4 addresses, so no
    /// percent-encoding is needed.
    pub fn request_path(&self) -> String {
        match self {
            Self::Play => "/Play".to_string(),
            Self::Pause => "/Pause".to_string(),
            Self::Stop => "/Stop".to_string(),
            Self::Next => "/Skip".to_string(),
            Self::Previous => "/Back".to_string(),
            Self::SetVolume { level } => format!("/Volume?level={}", (*level).min(MAX_VOLUME)),
            Self::Mute { mute } => format!("/Volume?mute={}", u8::from(*mute)),
            Self::PlayPreset { id } => format!("/Preset?id={}", id),
            Self::AddSlave { address, port } => {
                format!("/AddSlave?slave={}&port={}", address, port)
            }
            Self::RemoveSlave { address, port } => {
                format!("/RemoveSlave?slave={}&port={}", address, port)
            }
        }
    }

    /// Whether sending the action twice has the same effect as sending it once.
    pub fn is_idempotent(&self) -> bool {
        !matches!(
            self,
            Self::Next | Self::Previous | Self::AddSlave { .. } | Self::RemoveSlave { .. }
        )
    }

    /// Whether the action changes group topology.
    pub fn changes_grouping(&self) -> bool {
        matches!(self, Self::AddSlave { .. } | Self::RemoveSlave { .. })
    }

    /// Address of the other player named by a group action, if any.
    pub fn target_address(&self) -> Option<&str> {
        match self {
            Self::AddSlave { address, .. } | Self::RemoveSlave { address, .. } => {
                Some(address.as_str())
            }
            _ => None,
        }
    }
}

/// Executes a control request with retry logic for transient errors.
///
/// Retries on timeouts and connection errors with exponential backoff
/// (200ms, 500ms, 1000ms).
///
/// # Arguments
/// * `action` - Action name for logging
/// * `operation` - Closure that performs the request
pub(crate) async fn with_retry<F, Fut>(action: &str, mut operation: F) -> ClientResult<String>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ClientResult<String>>,
{
    let mut last_error = None;
    for (attempt, &delay_ms) in std::iter::once(&0)
        .chain(RETRY_DELAYS_MS.iter())
        .enumerate()
    {
        if attempt > 0 {
            log::info!(
                "[BluOS] Retrying {} (attempt {}/{}) after {}ms",
                action,
                attempt + 1,
                RETRY_DELAYS_MS.len() + 1,
                delay_ms
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        match operation().await {
            Ok(r) => return Ok(r),
            Err(e) if e.is_transient() => {
                log::warn!("[BluOS] {} transient error: {}", action, e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => operation().await,
    }
}

/// Sends a control action to a player.
///
/// Idempotent actions are retried on transient errors; others are sent once.
pub async fn send_action(
    client: &Client,
    address: &str,
    port: u16,
    action: &ControlAction,
) -> ClientResult<()> {
    let url = build_player_url(address, port, &action.request_path());
    let timeout = Duration::from_secs(CONTROL_TIMEOUT_SECS);

    log::info!("[BluOS] {} -> {}", action.name(), url);

    if action.is_idempotent() {
        with_retry(action.name(), || get_text(client, &url, timeout)).await?;
    } else {
        get_text(client, &url, timeout).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluos::client::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn actions_map_to_endpoints() {
        assert_eq!(ControlAction::Next.request_path(), "/Skip");
        assert_eq!(ControlAction::Previous.request_path(), "/Back");
        assert_eq!(
            ControlAction::SetVolume { level: 30 }.request_path(),
            "/Volume?level=30"
        );
        assert_eq!(
            ControlAction::Mute { mute: true }.request_path(),
            "/Volume?mute=1"
        );
        assert_eq!(
            ControlAction::PlayPreset { id: 4 }.request_path(),
            "/Preset?id=4"
        );
        assert_eq!(
            ControlAction::AddSlave {
                address: "192.168.1.11".into(),
                port: 11000
            }
            .request_path(),
            "/AddSlave?slave=192.168.1.11&port=11000"
        );
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(
            ControlAction::SetVolume { level: 250 }.request_path(),
            "/Volume?level=100"
        );
    }

    #[test]
    fn deserializes_tagged_json() {
        let action: ControlAction =
            serde_json::from_str(r#"{"action":"setVolume","level":42}"#).unwrap();
        assert_eq!(action, ControlAction::SetVolume { level: 42 });

        let action: ControlAction =
            serde_json::from_str(r#"{"action":"addSlave","address":"192.168.1.11"}"#).unwrap();
        assert_eq!(
            action,
            ControlAction::AddSlave {
                address: "192.168.1.11".into(),
                port: BLUOS_DEFAULT_PORT
            }
        );

        assert!(serde_json::from_str::<ControlAction>(r#"{"action":"play_id_5"}"#).is_err());
    }

    #[test]
    fn skip_and_group_changes_are_not_idempotent() {
        assert!(ControlAction::Play.is_idempotent());
        assert!(ControlAction::SetVolume { level: 1 }.is_idempotent());
        assert!(!ControlAction::Next.is_idempotent());
        let add = ControlAction::AddSlave {
            address: "192.168.1.11".into(),
            port: 11000,
        };
        assert!(!add.is_idempotent());
        assert!(add.changes_grouping());
        assert_eq!(add.target_address(), Some("192.168.1.11"));
        assert!(!ControlAction::Pause.changes_grouping());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("Play", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ClientError::Timeout {
                        url: "http://192.168.1.10:11000/Play".into(),
                        timeout_ms: 10,
                    })
                } else {
                    Ok("ok".to_string())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_permanent_errors() {
        let calls = AtomicUsize::new(0);
        let result = with_retry("Play", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<String, _>(ClientError::HttpStatus(404, "not found".into())) }
        })
        .await;

        assert!(matches!(result, Err(ClientError::HttpStatus(404, _))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
