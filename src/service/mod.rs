//! Service layer: message relay orchestration.
//!
//! [`RelayService`] validates send requests and forwards them through the
//! [`super::domain::ConnectionRegistry`].

pub mod relay_service;

pub use relay_service::{RelayService, RelayStats};
