use std::sync::Arc;

use quest_events::EventBus;
use quest_ledger::LedgerEngine;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (auth and user lookups).
    pub pool: quest_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus the ledger publishes to.
    pub event_bus: Arc<EventBus>,
    /// Points-and-rewards ledger.
    pub ledger: Arc<LedgerEngine>,
}
