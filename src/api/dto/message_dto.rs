//! Message send DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /messages`.
///
/// Field names match the WebSocket `privateMessage` event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Sending user id, as established by the caller's authentication.
    pub from: String,
    /// Recipient user id.
    pub to: String,
    /// Message text.
    pub message: String,
}

/// Response body for `POST /messages`.
///
/// Deliberately says nothing about whether the recipient was reached.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    /// Always `true` for a valid request.
    pub accepted: bool,
}
