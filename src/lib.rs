//! # hackmatch-relay
//!
//! Real-time private messaging relay for the hackmatch team-matching
//! platform.
//!
//! Clients open a WebSocket, register the user id their login session
//! established, and exchange direct messages with other registered users.
//! Delivery is best-effort: a message reaches its recipient only if the
//! recipient is connected at send time. Nothing is stored.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler + Session (ws/)
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RelayService (service/)
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
