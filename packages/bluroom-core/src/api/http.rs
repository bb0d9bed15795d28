//! HTTP route handlers.
//!
//! All handlers are thin - they delegate to services for business logic.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::response::{api_ok, api_success};
use crate::api::AppState;
use crate::bluos::playback::ControlAction;
use crate::error::{BluroomError, BluroomResult};
use crate::protocol_constants::SERVICE_ID;

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DiscoverQuery {
    force_refresh: bool,
    skip_cache: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PortQuery {
    port: Option<u16>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/groups", get(list_groups))
        .route("/api/groups/refresh", post(refresh_groups))
        .route("/api/players", get(list_players))
        .route("/api/players/{address}/status", get(get_player_status))
        .route("/api/players/{address}/control", post(control_player))
        .route("/api/known-devices", get(list_known_devices))
        .route("/api/known-devices/{address}", delete(remove_known_device))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness probe: "Is the process running?"
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    api_success(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "cachedPlayers": state.discovery_service.cache().get().len(),
    }))
}

async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> impl IntoResponse {
    let groups = state
        .discovery_service
        .discover_groups(query.force_refresh, query.skip_cache)
        .await;
    api_success(json!({ "groups": groups }))
}

async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> impl IntoResponse {
    let players = state
        .discovery_service
        .discover(query.force_refresh, query.skip_cache)
        .await;
    api_success(json!({ "players": players }))
}

/// Re-probes known players after a topology change made elsewhere.
async fn refresh_groups(State(state): State<AppState>) -> impl IntoResponse {
    let groups = state.discovery_service.refresh_known_groups().await;
    api_success(json!({ "groups": groups }))
}

async fn get_player_status(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PortQuery>,
) -> BluroomResult<impl IntoResponse> {
    let port = query.port.unwrap_or(state.config.default_port);
    let status = state.player_controller.status(&address, port).await?;
    Ok(api_success(json!({ "status": status })))
}

/// POST /api/players/{address}/control
///
/// Group changes answer with the refreshed rooms; other actions with `{success}`.
async fn control_player(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PortQuery>,
    Json(action): Json<ControlAction>,
) -> BluroomResult<Response> {
    let port = query.port.unwrap_or(state.config.default_port);
    let outcome = state
        .player_controller
        .control(&address, port, &action)
        .await?;

    Ok(match outcome {
        Some(groups) => api_success(json!({ "groups": groups })).into_response(),
        None => api_ok().into_response(),
    })
}

async fn list_known_devices(State(state): State<AppState>) -> BluroomResult<impl IntoResponse> {
    let devices = state.discovery_service.store().get_all().await?;
    Ok(api_success(json!({ "devices": devices })))
}

/// DELETE /api/known-devices/{address}
///
/// The only path that deletes known devices.
async fn remove_known_device(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> BluroomResult<impl IntoResponse> {
    if !state.discovery_service.store().remove(&address).await? {
        return Err(BluroomError::DeviceNotFound(address));
    }
    log::info!("[API] Known device {} removed", address);
    Ok(api_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluos::client::{ClientError, ClientResult};
    use crate::bluos::discovery::DiscoveryResult;
    use crate::bluos::prober::{ProbeError, ProbeResult};
    use crate::bluos::test_fixtures::STATUS_RADIO;
    use crate::bluos::traits::{BluosControl, BluosStatus, PlayerProber};
    use crate::bluos::types::test_support::{master, player, slave};
    use crate::bluos::types::Player;
    use crate::services::{DiscoveryService, KnownDeviceRegistry, PlayerCache, PlayerController};
    use crate::state::Config;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticProber(Vec<Player>);

    #[async_trait]
    impl PlayerProber for StaticProber {
        async fn probe(&self, address: &str, port: u16, _timeout: Duration) -> ProbeResult<Player> {
            self.0
                .iter()
                .find(|p| p.address == address)
                .cloned()
                .ok_or_else(|| ProbeError::Unreachable {
                    address: address.to_string(),
                    port,
                    source: ClientError::HttpStatus(404, String::new()),
                })
        }

        async fn sweep(&self, _duration: Duration) -> DiscoveryResult<Vec<Player>> {
            Ok(self.0.clone())
        }
    }

    struct RadioClient;

    #[async_trait]
    impl BluosStatus for RadioClient {
        async fn fetch_sync_status(
            &self,
            _address: &str,
            _port: u16,
            _timeout: Duration,
        ) -> ClientResult<String> {
            Err(ClientError::HttpStatus(404, String::new()))
        }

        async fn fetch_status(&self, _address: &str, _port: u16) -> ClientResult<String> {
            Ok(STATUS_RADIO.to_string())
        }
    }

    #[async_trait]
    impl BluosControl for RadioClient {
        async fn send_action(
            &self,
            _address: &str,
            _port: u16,
            _action: &ControlAction,
        ) -> ClientResult<()> {
            Ok(())
        }
    }

    fn app() -> Router {
        let prober = Arc::new(StaticProber(vec![
            master("192.168.1.10", "Living Room", &["192.168.1.11"]),
            slave("192.168.1.11", "Kitchen", "192.168.1.10"),
            player("192.168.1.30", "Office"),
        ]));
        let discovery = Arc::new(DiscoveryService::new(
            prober,
            Arc::new(KnownDeviceRegistry::in_memory()),
            Arc::new(PlayerCache::new()),
            Config::default(),
        ));
        let controller = Arc::new(PlayerController::new(
            Arc::new(RadioClient),
            Arc::clone(&discovery),
        ));
        create_router(AppState {
            discovery_service: discovery,
            player_controller: controller,
            config: Arc::new(Config::default()),
        })
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (status, body) = call(app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], SERVICE_ID);
    }

    #[tokio::test]
    async fn groups_endpoint_resolves_rooms() {
        let (status, body) = call(app(), Method::GET, "/api/groups?forceRefresh=true", None).await;

        assert_eq!(status, StatusCode::OK);
        let groups = body["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["type"], "single");
        assert_eq!(groups[1]["type"], "multiRoom");
        assert_eq!(groups[1]["members"][0]["address"], "192.168.1.11");
    }

    #[tokio::test]
    async fn players_endpoint_returns_flat_list() {
        let (status, body) = call(app(), Method::GET, "/api/players", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn status_endpoint_decodes_playback() {
        let (status, body) =
            call(app(), Method::GET, "/api/players/192.168.1.30/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["state"], "streaming");
        assert_eq!(body["status"]["title"], "Radio Paradise");
    }

    #[tokio::test]
    async fn control_endpoint_accepts_tagged_action() {
        let (status, body) = call(
            app(),
            Method::POST,
            "/api/players/192.168.1.30/control",
            Some(r#"{"action":"setVolume","level":25}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn control_endpoint_rejects_bad_address() {
        let (status, body) = call(
            app(),
            Method::POST,
            "/api/players/localhost/control",
            Some(r#"{"action":"play"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_ip");
    }

    #[tokio::test]
    async fn removing_unknown_device_is_not_found() {
        let (status, body) =
            call(app(), Method::DELETE, "/api/known-devices/192.168.1.99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "device_not_found");
    }
}
