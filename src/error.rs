//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type. Each variant maps to a numeric
//! code and an HTTP status; the same code is used in WebSocket `error`
//! frames so clients see one vocabulary on both transports.
//!
//! An absent recipient is deliberately not represented here: undeliverable
//! messages are dropped, not reported.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid user id: user id is empty"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Relay error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request / 413      |
/// | 2000–2999 | Connection state| 409 Conflict               |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// User id missing, empty, or too long.
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    /// Frame or request body could not be understood.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Frame named an event the relay does not handle.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Message content exceeds the configured cap.
    #[error("message too large: {size} bytes exceeds limit of {max}")]
    MessageTooLarge {
        /// Size of the rejected content in bytes.
        size: usize,
        /// Configured maximum in bytes.
        max: usize,
    },

    /// Connection tried to send before registering a user id.
    #[error("connection is not registered")]
    NotRegistered,

    /// Operation attempted on a connection that already disconnected.
    #[error("connection is closed")]
    ConnectionClosed,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidUserId(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::UnknownEvent(_) => 1003,
            Self::MessageTooLarge { .. } => 1004,
            Self::NotRegistered => 2001,
            Self::ConnectionClosed => 2002,
            Self::Config(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUserId(_) | Self::InvalidRequest(_) | Self::UnknownEvent(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::MessageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotRegistered | Self::ConnectionClosed => StatusCode::CONFLICT,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
