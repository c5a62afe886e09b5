//! Server-side message trigger.
//!
//! Lets a trusted collaborator (for example a team-invite flow) push a
//! direct message through the same relay the WebSocket clients use.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{SendMessageRequest, SendMessageResponse};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::RelayError;

/// `POST /messages` — Relay a message best-effort.
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "Messages",
    summary = "Send a direct message",
    description = "Forwards the message if the recipient is connected, otherwise drops it. \
                   The response never reveals which happened.",
    request_body = SendMessageRequest,
    responses(
        (status = 202, description = "Accepted for best-effort delivery", body = SendMessageResponse),
        (status = 400, description = "Invalid user id"),
        (status = 413, description = "Message too large"),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, RelayError> {
    let from = UserId::parse(&req.from)?;
    let _ = state
        .relay_service
        .send(&from, &req.to, req.message)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SendMessageResponse { accepted: true }),
    ))
}

/// Message routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/messages", post(send_message))
}
