//! Domain layer: identities, message values, and the connection registry.
//!
//! This module contains the in-memory model of the relay: who is
//! connected, through which connection, and the transient messages that
//! flow between them.

pub mod connection_id;
pub mod connection_registry;
pub mod message;
pub mod user_id;

pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionHandle, ConnectionRegistry, Presence};
pub use message::{Delivery, DeliveryOutcome, DropReason, PrivateMessage};
pub use user_id::UserId;
