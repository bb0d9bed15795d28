//! HTTP transport to BluOS players.
//!
//! Every BluOS endpoint is an HTTP GET on the player's control port that
//! answers with XML. This module fetches the raw bodies; decoding lives in
//! [`crate::bluos::decoder`].

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::bluos::playback::{self, ControlAction};
use crate::bluos::traits::{BluosControl, BluosStatus};
use crate::bluos::utils::build_player_url;
use crate::protocol_constants::{CONTROL_TIMEOUT_SECS, STATUS_PATH, SYNC_STATUS_PATH};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur talking HTTP to a BluOS player.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request to the player failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Player returned a non-success HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// No complete response within the allowed time.
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

/// Convenient Result alias for device HTTP operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Returns true if this error is transient and the operation should be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Timeout { .. } => true,
            ClientError::Http(e) => e.is_timeout() || e.is_connect(),
            ClientError::HttpStatus(status, _) => *status >= 500,
        }
    }
}

/// GETs `url` and returns the body, bounded by `timeout` end to end.
pub(crate) async fn get_text(client: &Client, url: &str, timeout: Duration) -> ClientResult<String> {
    let request = async {
        let res = client.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ClientError::HttpStatus(status.as_u16(), body));
        }
        Ok(body)
    };

    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete implementation of the BluOS client traits.
#[derive(Clone)]
pub struct BluosClientImpl {
    /// HTTP client for player communication.
    client: Client,
}

impl std::fmt::Debug for BluosClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BluosClientImpl")
            .field("client", &"Client")
            .finish()
    }
}

impl BluosClientImpl {
    /// Creates a new BluosClientImpl with the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BluosStatus for BluosClientImpl {
    async fn fetch_sync_status(
        &self,
        address: &str,
        port: u16,
        timeout: Duration,
    ) -> ClientResult<String> {
        let url = build_player_url(address, port, SYNC_STATUS_PATH);
        log::trace!("[BluOS] GET {}", url);
        get_text(&self.client, &url, timeout).await
    }

    async fn fetch_status(&self, address: &str, port: u16) -> ClientResult<String> {
        let url = build_player_url(address, port, STATUS_PATH);
        log::trace!("[BluOS] GET {}", url);
        get_text(
            &self.client,
            &url,
            Duration::from_secs(CONTROL_TIMEOUT_SECS),
        )
        .await
    }
}

#[async_trait]
impl BluosControl for BluosClientImpl {
    async fn send_action(
        &self,
        address: &str,
        port: u16,
        action: &ControlAction,
    ) -> ClientResult<()> {
        playback::send_action(&self.client, address, port, action).await
    }
}
