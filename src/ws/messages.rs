//! WebSocket frame types.
//!
//! Every text frame is one JSON object with an `event` discriminator:
//!
//! ```json
//! {"event": "register", "userId": "665f1c2a"}
//! {"event": "privateMessage", "to": "665f1c2b", "message": "hi"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Delivery, UserId};
use crate::error::RelayError;

/// Events a client can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a user id.
    Register {
        /// Id supplied by the authentication layer.
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Send a direct message.
    PrivateMessage {
        /// Recipient user id.
        #[serde(default)]
        to: String,
        /// Message text.
        #[serde(default)]
        message: String,
        /// Claimed sender. Ignored; the registered id is used instead.
        #[serde(default)]
        from: Option<String>,
    },
}

impl ClientEvent {
    /// Parses one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownEvent`] for well-formed JSON naming an
    /// event the relay does not handle, and [`RelayError::InvalidRequest`]
    /// for anything else that does not parse.
    pub fn parse(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(|e| {
            let event = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_string));
            match event {
                Some(name) if name != "register" && name != "privateMessage" => {
                    RelayError::UnknownEvent(name)
                }
                _ => RelayError::InvalidRequest(e.to_string()),
            }
        })
    }
}

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A direct message relayed from another user.
    PrivateMessage {
        /// Sender's user id.
        from: UserId,
        /// Message text.
        message: String,
    },
    /// Acknowledges a `register` event.
    Registered {
        /// The id this connection is now registered under.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// A request from this connection was rejected.
    Error {
        /// Numeric code, shared with HTTP error bodies.
        code: u32,
        /// Human-readable reason.
        message: String,
    },
}

impl ServerEvent {
    /// Serializes the event into a text frame payload.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

impl From<Delivery> for ServerEvent {
    fn from(d: Delivery) -> Self {
        Self::PrivateMessage {
            from: d.from,
            message: d.message,
        }
    }
}

impl From<&RelayError> for ServerEvent {
    fn from(e: &RelayError) -> Self {
        Self::Error {
            code: e.error_code(),
            message: e.to_string(),
        }
    }
}
