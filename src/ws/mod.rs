//! WebSocket layer: connection handling, session lifecycle, frame types.
//!
//! The WebSocket endpoints at `/ws` and `/api/socket` carry the
//! `register` and `privateMessage` events in both directions.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod session;
