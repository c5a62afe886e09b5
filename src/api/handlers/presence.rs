//! Presence handlers: who is connected right now.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{OnlineUsersResponse, UserStatusResponse};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::RelayError;

/// `GET /users/{user_id}/status` — Online status of one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/status",
    tag = "Presence",
    summary = "User status",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Presence of the user", body = UserStatusResponse),
        (status = 400, description = "Invalid user id"),
    )
)]
pub async fn user_status(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, RelayError> {
    let user_id = UserId::parse(&raw)?;
    let presence = state.relay_service.registry().presence(&user_id).await;
    Ok(Json(UserStatusResponse::new(user_id, presence)))
}

/// `GET /users/online` — All registered users.
#[utoipa::path(
    get,
    path = "/api/v1/users/online",
    tag = "Presence",
    summary = "Online users",
    responses(
        (status = 200, description = "Registered user ids", body = OnlineUsersResponse),
    )
)]
pub async fn online_users(State(state): State<AppState>) -> impl IntoResponse {
    let users = state.relay_service.registry().online_users().await;
    Json(OnlineUsersResponse {
        count: users.len(),
        users,
    })
}

/// Presence routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/online", get(online_users))
        .route("/users/{user_id}/status", get(user_status))
}
