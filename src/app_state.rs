//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::ConnectionRegistry;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service, which also owns the connection registry.
    pub relay_service: Arc<RelayService>,
    /// Runtime configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds the state for a fresh process: an empty registry and a relay
    /// configured from `config`.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::with_last_seen_capacity(
            config.last_seen_capacity,
        ));
        let relay_service = Arc::new(RelayService::new(registry, config.max_message_bytes));
        Self {
            relay_service,
            config: Arc::new(config),
        }
    }
}
