//! Centralized error types for the Bluroom core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses
//!
//! Discovery itself never fails from the caller's point of view; these
//! errors come from control actions, status fetches and store administration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::bluos::client::ClientError;
use crate::bluos::decoder::DecodeError;
use crate::bluos::discovery::DiscoveryError;
use crate::bluos::prober::ProbeError;
use crate::services::known_devices::StoreError;
use crate::utils::IpValidationError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> &'static str {
        match self {
            Self::MdnsDaemon(_) => "mdns_daemon_failed",
            Self::Browse { .. } => "mdns_browse_failed",
        }
    }
}

impl ErrorCode for ClientError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Timeout { .. } => "device_timeout",
        }
    }
}

impl ErrorCode for DecodeError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingRoot { .. } => "payload_missing_root",
            Self::UnexpectedRoot { .. } => "payload_unexpected_root",
            Self::Malformed(_) => "payload_malformed",
        }
    }
}

impl ErrorCode for ProbeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "device_unreachable",
            Self::Decode { .. } => "device_payload_invalid",
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "store_io_failed",
            Self::Serialization(_) => "store_serialization_failed",
            Self::WriteTask(_) => "store_write_task_failed",
        }
    }
}

/// Application-wide error type for the Bluroom server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum BluroomError {
    /// A request to a player failed or timed out.
    #[error("Device request failed: {0}")]
    Device(String),

    /// A player answered with a payload that could not be decoded.
    #[error("Invalid device response: {0}")]
    InvalidResponse(String),

    /// Known device not found.
    #[error("Known device not found: {0}")]
    DeviceNotFound(String),

    /// Client sent an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid IP address for a player.
    ///
    /// Used for IP validation errors (IPv6, loopback, broadcast, etc.).
    #[error("Invalid IP: {0}")]
    InvalidIp(String),

    /// The known-device store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Server configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BluroomError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Device(_) => "device_error",
            Self::InvalidResponse(_) => "invalid_device_response",
            Self::DeviceNotFound(_) => "device_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidIp(_) => "invalid_ip",
            Self::Store(_) => "store_error",
            Self::Internal(_) => "internal_error",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) | Self::InvalidIp(_) => StatusCode::BAD_REQUEST,
            Self::Device(_) | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::bluos::client::ClientResult;
pub use crate::bluos::decoder::DecodeResult;
pub use crate::bluos::discovery::DiscoveryResult;
pub use crate::bluos::prober::ProbeResult;
pub use crate::services::known_devices::StoreResult;

/// Convenient Result alias for application-wide operations.
pub type BluroomResult<T> = Result<T, BluroomError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for BluroomError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ClientError> for BluroomError {
    fn from(err: ClientError) -> Self {
        Self::Device(err.to_string())
    }
}

impl From<DecodeError> for BluroomError {
    fn from(err: DecodeError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<ProbeError> for BluroomError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Unreachable { .. } => Self::Device(err.to_string()),
            ProbeError::Decode { .. } => Self::InvalidResponse(err.to_string()),
        }
    }
}

impl From<StoreError> for BluroomError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<IpValidationError> for BluroomError {
    fn from(err: IpValidationError) -> Self {
        Self::InvalidIp(err.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ip_error_returns_correct_code() {
        let err: BluroomError = IpValidationError::Loopback.into();
        assert_eq!(err.code(), "invalid_ip");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn device_errors_are_bad_gateway() {
        let err: BluroomError = ClientError::Timeout {
            url: "http://192.168.1.10:11000/Play".into(),
            timeout_ms: 10_000,
        }
        .into();
        assert_eq!(err.code(), "device_error");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: BluroomError = DecodeError::MissingRoot {
            expected: "status",
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_device_is_not_found() {
        let err = BluroomError::DeviceNotFound("192.168.1.10".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn layer_errors_have_codes() {
        assert_eq!(
            DiscoveryError::MdnsDaemon("x".into()).code(),
            "mdns_daemon_failed"
        );
        assert_eq!(
            ClientError::HttpStatus(500, String::new()).code(),
            "http_error_status"
        );
    }
}
