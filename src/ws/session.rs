//! Per-connection lifecycle state machine.
//!
//! ```text
//! Unregistered ──register──▶ Registered ──disconnect──▶ Disconnected
//!      │                         │  ▲
//!      │                         └──┘ register (re-bind)
//!      └──────────disconnect────────────────────────────▶ Disconnected
//! ```
//!
//! A [`Session`] owns the registry side effects for one connection: it
//! registers the connection's outbound handle, and on disconnect removes
//! exactly that handle, once.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{ConnectionHandle, ConnectionId, Delivery, DeliveryOutcome, UserId};
use crate::error::RelayError;
use crate::service::RelayService;

/// Lifecycle state of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, no user id yet. Cannot send or receive messages.
    Unregistered,
    /// Bound to a user id.
    Registered(UserId),
    /// Terminal. Registry cleanup has run.
    Disconnected,
}

/// Registry-facing state of one WebSocket connection.
#[derive(Debug)]
pub struct Session {
    id: ConnectionId,
    handle: ConnectionHandle,
    relay: Arc<RelayService>,
    state: SessionState,
}

impl Session {
    /// Creates a session in [`SessionState::Unregistered`] whose deliveries
    /// are pushed into `tx`.
    #[must_use]
    pub fn new(relay: Arc<RelayService>, tx: mpsc::Sender<Delivery>) -> Self {
        let id = ConnectionId::new();
        Self {
            id,
            handle: ConnectionHandle::new(id, tx),
            relay,
            state: SessionState::Unregistered,
        }
    }

    /// Returns this connection's identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the registered user id, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            SessionState::Registered(user_id) => Some(user_id),
            _ => None,
        }
    }

    /// Binds this connection to `raw_user_id`.
    ///
    /// Re-registering under a different id first releases the old entry.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUserId`] for an unusable id, or
    /// [`RelayError::ConnectionClosed`] after [`Session::disconnect`].
    pub async fn register(&mut self, raw_user_id: &str) -> Result<UserId, RelayError> {
        let user_id = UserId::parse(raw_user_id)?;
        match &self.state {
            SessionState::Disconnected => return Err(RelayError::ConnectionClosed),
            SessionState::Registered(current) if *current != user_id => {
                let _ = self.relay.registry().remove(current, self.id).await;
            }
            _ => {}
        }

        self.relay
            .registry()
            .register(user_id.clone(), self.handle.clone())
            .await;
        tracing::info!(%user_id, connection_id = %self.id, "user registered");

        self.state = SessionState::Registered(user_id.clone());
        Ok(user_id)
    }

    /// Relays `message` to `to` as this connection's registered user.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NotRegistered`] before registration,
    /// [`RelayError::ConnectionClosed`] after disconnect, or any validation
    /// error from [`RelayService::send`].
    pub async fn send(&self, to: &str, message: String) -> Result<DeliveryOutcome, RelayError> {
        match &self.state {
            SessionState::Registered(from) => self.relay.send(from, to, message).await,
            SessionState::Unregistered => Err(RelayError::NotRegistered),
            SessionState::Disconnected => Err(RelayError::ConnectionClosed),
        }
    }

    /// Runs disconnect cleanup. Idempotent.
    ///
    /// Returns `true` only on the call that performed the transition.
    pub async fn disconnect(&mut self) -> bool {
        let previous = std::mem::replace(&mut self.state, SessionState::Disconnected);
        match previous {
            SessionState::Disconnected => false,
            SessionState::Unregistered => {
                tracing::debug!(connection_id = %self.id, "unregistered connection closed");
                true
            }
            SessionState::Registered(user_id) => {
                if self.relay.registry().remove(&user_id, self.id).await {
                    tracing::info!(%user_id, connection_id = %self.id, "user disconnected");
                } else {
                    tracing::debug!(
                        %user_id,
                        connection_id = %self.id,
                        "superseded connection closed"
                    );
                }
                true
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConnectionRegistry;

    fn relay() -> Arc<RelayService> {
        Arc::new(RelayService::new(Arc::new(ConnectionRegistry::new()), 1024))
    }

    fn user(raw: &str) -> UserId {
        let Ok(id) = UserId::parse(raw) else {
            panic!("valid user id");
        };
        id
    }

    fn session(relay: &Arc<RelayService>) -> (Session, mpsc::Receiver<Delivery>) {
        let (tx, rx) = mpsc::channel(8);
        (Session::new(Arc::clone(relay), tx), rx)
    }

    #[tokio::test]
    async fn register_transitions_and_binds() {
        let relay = relay();
        let (mut s, _rx) = session(&relay);
        assert_eq!(s.state(), &SessionState::Unregistered);

        let registered = tokio_test::assert_ok!(s.register("alice").await);
        assert_eq!(registered, user("alice"));
        assert_eq!(s.state(), &SessionState::Registered(user("alice")));

        let found = relay.registry().lookup(&user("alice")).await.map(|h| h.id());
        assert_eq!(found, Some(s.id()));
    }

    #[tokio::test]
    async fn send_before_register_is_rejected() {
        let relay = relay();
        let (s, _rx) = session(&relay);
        let result = s.send("bob", "hi".to_string()).await;
        assert!(matches!(result, Err(RelayError::NotRegistered)));
    }

    #[tokio::test]
    async fn invalid_user_id_leaves_state_unchanged() {
        let relay = relay();
        let (mut s, _rx) = session(&relay);
        assert!(s.register("  ").await.is_err());
        assert_eq!(s.state(), &SessionState::Unregistered);
    }

    #[tokio::test]
    async fn relays_between_sessions() {
        let relay = relay();
        let (mut a, _rx_a) = session(&relay);
        let (mut b, mut rx_b) = session(&relay);
        let _ = a.register("alice").await;
        let _ = b.register("bob").await;

        let outcome = a.send("bob", "hi".to_string()).await;
        assert!(matches!(outcome, Ok(DeliveryOutcome::Delivered)));
        let Ok(delivery) = rx_b.try_recv() else {
            panic!("bob should receive");
        };
        assert_eq!(delivery.from, user("alice"));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let relay = relay();
        let (mut a, _rx_a) = session(&relay);
        let (mut b, _rx_b) = session(&relay);
        let _ = a.register("alice").await;
        let _ = b.register("bob").await;

        assert!(a.disconnect().await);
        assert!(!a.disconnect().await);
        assert_eq!(a.state(), &SessionState::Disconnected);

        assert!(relay.registry().lookup(&user("alice")).await.is_none());
        assert!(relay.registry().lookup(&user("bob")).await.is_some());
    }

    #[tokio::test]
    async fn disconnect_without_register_is_noop() {
        let relay = relay();
        let (mut s, _rx) = session(&relay);
        assert!(s.disconnect().await);
        assert!(relay.registry().is_empty().await);
    }

    #[tokio::test]
    async fn stale_disconnect_keeps_newer_registration() {
        let relay = relay();
        let (mut old, _rx_old) = session(&relay);
        let (mut new, _rx_new) = session(&relay);
        let _ = old.register("alice").await;
        let _ = new.register("alice").await;

        assert!(old.disconnect().await);

        let found = relay.registry().lookup(&user("alice")).await.map(|h| h.id());
        assert_eq!(found, Some(new.id()));
    }

    #[tokio::test]
    async fn reregister_under_new_id_releases_old() {
        let relay = relay();
        let (mut s, _rx) = session(&relay);
        let _ = s.register("alice").await;
        let _ = s.register("alicia").await;

        assert!(relay.registry().lookup(&user("alice")).await.is_none());
        assert!(relay.registry().lookup(&user("alicia")).await.is_some());
    }

    #[tokio::test]
    async fn register_after_disconnect_fails() {
        let relay = relay();
        let (mut s, _rx) = session(&relay);
        let _ = s.disconnect().await;
        assert!(matches!(
            s.register("alice").await,
            Err(RelayError::ConnectionClosed)
        ));
        assert!(relay.registry().is_empty().await);
    }

    #[tokio::test]
    async fn reregister_after_being_superseded_keeps_other_connection() {
        let relay = relay();
        let (mut first, _rx_first) = session(&relay);
        let (mut second, _rx_second) = session(&relay);
        let _ = first.register("alice").await;
        let _ = second.register("alice").await;

        let _ = first.register("bob").await;

        let found = relay.registry().lookup(&user("alice")).await.map(|h| h.id());
        assert_eq!(found, Some(second.id()));
        let found = relay.registry().lookup(&user("bob")).await.map(|h| h.id());
        assert_eq!(found, Some(first.id()));
    }
}
