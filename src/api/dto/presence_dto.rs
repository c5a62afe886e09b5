//! Presence DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Presence, UserId};

/// Response body for `GET /users/:user_id/status`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserStatusResponse {
    /// Queried user.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Whether the user has a registered connection.
    pub online: bool,
    /// When the user's last connection went away, if it has.
    pub last_seen: Option<DateTime<Utc>>,
}

impl UserStatusResponse {
    /// Combines a user id with its registry presence.
    #[must_use]
    pub fn new(user_id: UserId, presence: Presence) -> Self {
        Self {
            user_id,
            online: presence.online,
            last_seen: presence.last_seen,
        }
    }
}

/// Response body for `GET /users/online`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OnlineUsersResponse {
    /// Registered user ids, sorted.
    #[schema(value_type = Vec<String>)]
    pub users: Vec<UserId>,
    /// Number of registered users.
    pub count: usize,
}
