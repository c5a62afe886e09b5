//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::RelayError;

/// Optional query parameters on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Registers the connection immediately after the upgrade.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// # Errors
///
/// Returns [`RelayError::InvalidUserId`] before upgrading if `userId` is
/// present but unusable.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RelayError> {
    let initial_user = params.user_id.as_deref().map(UserId::parse).transpose()?;
    let relay = Arc::clone(&state.relay_service);
    let queue_capacity = state.config.outbound_queue_capacity;

    Ok(ws.on_upgrade(move |socket| run_connection(socket, relay, queue_capacity, initial_user)))
}
