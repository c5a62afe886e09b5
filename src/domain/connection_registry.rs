//! Registry of live connections keyed by user id.
//!
//! [`ConnectionRegistry`] is the single source of truth for which
//! connection currently represents a user. It holds at most one
//! [`ConnectionHandle`] per [`UserId`]; a later registration replaces an
//! earlier one. Removal matches on the `(UserId, ConnectionId)` pair, never
//! on the user id alone, so an out-of-order disconnect of a superseded
//! connection cannot evict the newer one.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::message::{Delivery, DropReason};
use super::{ConnectionId, UserId};

/// Outbound half of one live connection.
///
/// Cloning is cheap; every clone feeds the same connection queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Delivery>,
}

impl ConnectionHandle {
    /// Wraps the sending side of a connection's outbound queue.
    #[must_use]
    pub const fn new(id: ConnectionId, tx: mpsc::Sender<Delivery>) -> Self {
        Self { id, tx }
    }

    /// Returns the identity of the underlying connection.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Hands a delivery to the connection without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DropReason::QueueFull`] if the connection is not keeping
    /// up, or [`DropReason::ConnectionClosed`] if it already went away.
    pub fn deliver(&self, delivery: Delivery) -> Result<(), DropReason> {
        self.tx.try_send(delivery).map_err(|e| match e {
            TrySendError::Full(_) => DropReason::QueueFull,
            TrySendError::Closed(_) => DropReason::ConnectionClosed,
        })
    }
}

/// Online status of a user as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    /// Whether a connection is currently registered for the user.
    pub online: bool,
    /// When the user's last registered connection went away, if ever.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Default number of offline users whose `last_seen` is remembered.
pub const DEFAULT_LAST_SEEN_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct LastSeen {
    at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: HashMap<UserId, ConnectionHandle>,
    last_seen: HashMap<UserId, LastSeen>,
    // Insertion order for eviction; may hold outdated (user, seq) pairs.
    last_seen_order: VecDeque<(UserId, u64)>,
    next_seq: u64,
}

impl RegistryState {
    fn record_last_seen(&mut self, user_id: UserId, capacity: usize) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.last_seen.insert(
            user_id.clone(),
            LastSeen {
                at: Utc::now(),
                seq,
            },
        );
        self.last_seen_order.push_back((user_id, seq));

        while self.last_seen_order.len() > capacity {
            let Some((oldest, oldest_seq)) = self.last_seen_order.pop_front() else {
                break;
            };
            if self.last_seen.get(&oldest).map(|e| e.seq) == Some(oldest_seq) {
                self.last_seen.remove(&oldest);
            }
        }
    }
}

/// Concurrent map from user id to that user's current connection.
///
/// # Concurrency
///
/// A single [`RwLock`] guards the whole map, so every `register`,
/// `lookup`, and `remove` is atomic with respect to the others. Lookups
/// run concurrently; mutations are serialized. All three are single
/// hash-map operations.
///
/// The `last_seen` history is bounded: once more than `last_seen_capacity`
/// users have gone offline, the oldest records are evicted.
#[derive(Debug)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
    last_seen_capacity: usize,
}

impl ConnectionRegistry {
    /// Creates an empty registry with [`DEFAULT_LAST_SEEN_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_last_seen_capacity(DEFAULT_LAST_SEEN_CAPACITY)
    }

    /// Creates an empty registry remembering at most `capacity` offline
    /// users' `last_seen` timestamps.
    #[must_use]
    pub fn with_last_seen_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            last_seen_capacity: capacity.max(1),
        }
    }

    /// Registers `handle` as the current connection for `user_id`.
    ///
    /// Any previous connection for the same user is superseded but not
    /// closed; closing is up to whoever owns that connection.
    pub async fn register(&self, user_id: UserId, handle: ConnectionHandle) {
        let connection_id = handle.id();
        let mut state = self.state.write().await;
        if let Some(previous) = state.entries.insert(user_id.clone(), handle)
            && previous.id() != connection_id
        {
            tracing::debug!(
                %user_id,
                superseded = %previous.id(),
                %connection_id,
                "registration replaced an older connection"
            );
        }
    }

    /// Returns the current connection for `user_id`, if any.
    pub async fn lookup(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.state.read().await.entries.get(user_id).cloned()
    }

    /// Removes `user_id`'s entry if, and only if, it still points at
    /// `connection`.
    ///
    /// Returns `true` if an entry was removed. A superseded or never
    /// registered connection leaves the registry untouched.
    pub async fn remove(&self, user_id: &UserId, connection: ConnectionId) -> bool {
        let mut state = self.state.write().await;
        if state.entries.get(user_id).map(ConnectionHandle::id) != Some(connection) {
            return false;
        }
        state.entries.remove(user_id);
        state.record_last_seen(user_id.clone(), self.last_seen_capacity);
        true
    }

    /// Returns the presence of `user_id`.
    pub async fn presence(&self, user_id: &UserId) -> Presence {
        let state = self.state.read().await;
        Presence {
            online: state.entries.contains_key(user_id),
            last_seen: state.last_seen.get(user_id).map(|e| e.at),
        }
    }

    /// Returns all currently registered user ids, sorted.
    pub async fn online_users(&self) -> Vec<UserId> {
        let state = self.state.read().await;
        let mut users: Vec<UserId> = state.entries.keys().cloned().collect();
        users.sort();
        users
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns `true` if no user is registered.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
