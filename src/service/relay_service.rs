//! Relay service: validates send requests and forwards them best-effort.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ConnectionRegistry, DeliveryOutcome, DropReason, PrivateMessage, UserId};
use crate::error::RelayError;

/// Running counters for relay activity.
#[derive(Debug, Default)]
struct RelayCounters {
    relayed: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of the relay counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RelayStats {
    /// Users with a registered connection right now.
    pub online_users: usize,
    /// Messages handed to a recipient connection.
    pub relayed: u64,
    /// Messages silently dropped (recipient absent or not keeping up).
    pub dropped: u64,
    /// Send requests rejected as malformed.
    pub rejected: u64,
}

/// Stateless message relay over the [`ConnectionRegistry`].
///
/// Each call to [`RelayService::send`] looks up the recipient and hands
/// the message to its connection in the same step, or drops it. There is
/// no queueing beyond the recipient connection's own outbound buffer, no
/// retry, and no acknowledgement to the sender.
#[derive(Debug)]
pub struct RelayService {
    registry: Arc<ConnectionRegistry>,
    max_message_bytes: usize,
    counters: RelayCounters,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, max_message_bytes: usize) -> Self {
        Self {
            registry,
            max_message_bytes,
            counters: RelayCounters::default(),
        }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Validates and relays a message from `from` to `to`.
    ///
    /// An absent recipient is not an error: the returned outcome is
    /// [`DeliveryOutcome::Dropped`] and nothing is reported to the sender.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUserId`] if `to` is empty or malformed,
    /// or [`RelayError::MessageTooLarge`] if `content` exceeds the cap.
    pub async fn send(
        &self,
        from: &UserId,
        to: &str,
        content: String,
    ) -> Result<DeliveryOutcome, RelayError> {
        let message = self
            .validate(from, to, content)
            .inspect_err(|e| {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%from, error = %e, "send request rejected");
            })?;
        Ok(self.relay(message).await)
    }

    /// Forwards an already validated message.
    pub async fn relay(&self, message: PrivateMessage) -> DeliveryOutcome {
        let from = message.from.clone();
        let to = message.to.clone();

        let result = match self.registry.lookup(&to).await {
            Some(handle) => handle.deliver(message.into_delivery()),
            None => Err(DropReason::RecipientOffline),
        };

        match result {
            Ok(()) => {
                self.counters.relayed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%from, %to, "message relayed");
                DeliveryOutcome::Delivered
            }
            Err(reason) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                if reason == DropReason::QueueFull {
                    tracing::warn!(%from, %to, "recipient queue full, message dropped");
                } else {
                    tracing::debug!(%from, %to, ?reason, "message dropped");
                }
                DeliveryOutcome::Dropped(reason)
            }
        }
    }

    /// Returns a snapshot of relay counters.
    pub async fn stats(&self) -> RelayStats {
        RelayStats {
            online_users: self.registry.len().await,
            relayed: self.counters.relayed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    fn validate(
        &self,
        from: &UserId,
        to: &str,
        content: String,
    ) -> Result<PrivateMessage, RelayError> {
        let to = UserId::parse(to)?;
        if content.len() > self.max_message_bytes {
            return Err(RelayError::MessageTooLarge {
                size: content.len(),
                max: self.max_message_bytes,
            });
        }
        Ok(PrivateMessage {
            from: from.clone(),
            to,
            content,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{ConnectionHandle, ConnectionId, Delivery};

    fn user(raw: &str) -> UserId {
        let Ok(id) = UserId::parse(raw) else {
            panic!("valid user id");
        };
        id
    }

    fn service() -> RelayService {
        RelayService::new(Arc::new(ConnectionRegistry::new()), 64)
    }

    async fn connect(service: &RelayService, raw: &str) -> (ConnectionId, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(16);
        let id = ConnectionId::new();
        service
            .registry()
            .register(user(raw), ConnectionHandle::new(id, tx))
            .await;
        (id, rx)
    }

    #[tokio::test]
    async fn relays_to_connected_recipient_only() {
        let svc = service();
        let (_a, mut rx_alice) = connect(&svc, "alice").await;
        let (_b, mut rx_bob) = connect(&svc, "bob").await;

        let outcome = tokio_test::assert_ok!(svc.send(&user("alice"), "bob", "hi".to_string()).await);
        assert_eq!(outcome, DeliveryOutcome::Delivered);

        let Ok(delivery) = rx_bob.try_recv() else {
            panic!("bob should have a delivery");
        };
        assert_eq!(delivery.from, user("alice"));
        assert_eq!(delivery.message, "hi");
        assert!(rx_bob.try_recv().is_err());
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn absent_recipient_is_dropped_silently() {
        let svc = service();
        let outcome = svc.send(&user("alice"), "carol", "hi".to_string()).await;
        assert!(matches!(
            outcome,
            Ok(DeliveryOutcome::Dropped(DropReason::RecipientOffline))
        ));
        assert_eq!(svc.stats().await.dropped, 1);
    }

    #[tokio::test]
    async fn order_is_preserved_per_pair() {
        let svc = service();
        let (_b, mut rx_bob) = connect(&svc, "bob").await;

        for text in ["m1", "m2", "m3"] {
            let _ = svc.send(&user("alice"), "bob", text.to_string()).await;
        }

        let mut got = Vec::new();
        while let Ok(d) = rx_bob.try_recv() {
            got.push(d.message);
        }
        assert_eq!(got, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn disconnected_recipient_is_dropped() {
        let svc = service();
        let (b, rx_bob) = connect(&svc, "bob").await;
        assert!(svc.registry().remove(&user("bob"), b).await);
        drop(rx_bob);

        let outcome = svc.send(&user("alice"), "bob", "late".to_string()).await;
        assert!(matches!(outcome, Ok(DeliveryOutcome::Dropped(_))));
    }

    #[tokio::test]
    async fn closed_queue_counts_as_dropped() {
        let svc = service();
        let (_b, rx_bob) = connect(&svc, "bob").await;
        drop(rx_bob);

        let outcome = svc.send(&user("alice"), "bob", "hi".to_string()).await;
        assert!(matches!(
            outcome,
            Ok(DeliveryOutcome::Dropped(DropReason::ConnectionClosed))
        ));
    }

    #[tokio::test]
    async fn empty_recipient_is_rejected() {
        let svc = service();
        let result = svc.send(&user("alice"), "  ", "hi".to_string()).await;
        assert!(matches!(result, Err(RelayError::InvalidUserId(_))));
        assert_eq!(svc.stats().await.rejected, 1);
    }

    #[tokio::test]
    async fn oversized_content_is_rejected() {
        let svc = service();
        let (_b, mut rx_bob) = connect(&svc, "bob").await;
        let result = svc.send(&user("alice"), "bob", "x".repeat(65)).await;
        assert!(matches!(
            result,
            Err(RelayError::MessageTooLarge { size: 65, max: 64 })
        ));
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn stats_count_outcomes() {
        let svc = service();
        let (_b, _rx_bob) = connect(&svc, "bob").await;
        let _ = svc.send(&user("alice"), "bob", "a".to_string()).await;
        let _ = svc.send(&user("alice"), "carol", "b".to_string()).await;
        let _ = svc.send(&user("alice"), "", "c".to_string()).await;

        let stats = svc.stats().await;
        assert_eq!(
            stats,
            RelayStats {
                online_users: 1,
                relayed: 1,
                dropped: 1,
                rejected: 1,
            }
        );
    }
}
