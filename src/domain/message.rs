//! Transient message values passed through the relay.
//!
//! Nothing here is persisted. A [`PrivateMessage`] lives only for the
//! duration of one relay call; the recipient's connection receives the
//! narrower [`Delivery`] view.

use serde::Serialize;

use super::UserId;

/// A direct message from one user to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    /// Registered id of the sending connection.
    pub from: UserId,
    /// Intended recipient.
    pub to: UserId,
    /// Message text, forwarded verbatim.
    pub content: String,
}

impl PrivateMessage {
    /// Drops the recipient field, leaving what the recipient is told.
    #[must_use]
    pub fn into_delivery(self) -> Delivery {
        Delivery {
            from: self.from,
            message: self.content,
        }
    }
}

/// What a recipient's connection receives: `{from, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    /// Sender of the message.
    pub from: UserId,
    /// Message text.
    pub message: String,
}

/// Why a message was not handed to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Recipient has no registered connection.
    RecipientOffline,
    /// Recipient's outbound queue is full (slow consumer).
    QueueFull,
    /// Recipient's connection closed between lookup and hand-off.
    ConnectionClosed,
}

/// Result of a single relay attempt.
///
/// Used for logging and counters only. It is never reported back to the
/// sending client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Handed to the recipient's connection.
    Delivered,
    /// Silently dropped.
    Dropped(DropReason),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn into_delivery_keeps_sender_and_text() {
        let (Ok(from), Ok(to)) = (UserId::parse("alice"), UserId::parse("bob")) else {
            panic!("valid ids");
        };
        let msg = PrivateMessage {
            from: from.clone(),
            to,
            content: "hi".to_string(),
        };
        let delivery = msg.into_delivery();
        assert_eq!(delivery.from, from);
        assert_eq!(delivery.message, "hi");
    }
}
