use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every open connection on a fixed interval.
///
/// Runs until aborted; `main` aborts the handle during shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        loop {
            interval.tick().await;
            let connections = ws_manager.connection_count().await;
            tracing::debug!(connections, "WebSocket heartbeat");
            ws_manager.ping_all().await;
        }
    })
}
