use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::{Message, Utf8Bytes};
use quest_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Outbound half of a connection's message queue.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One open WebSocket.
pub struct WsConnection {
    /// Owner of the connection when it was opened with a valid token.
    pub user_id: Option<DbId>,
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Registry of open WebSocket connections keyed by connection id.
///
/// Shared as `Arc<WsManager>` between the upgrade handler, the event
/// broadcaster and the heartbeat task.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and hand back the queue its writer task drains.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (sender, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(
            conn_id,
            WsConnection {
                user_id,
                sender,
                connected_at: chrono::Utc::now(),
            },
        );
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Connection ids opened by `user_id`.
    pub async fn get_by_user(&self, user_id: DbId) -> Vec<String> {
        self.connections
            .read()
            .await
            .iter()
            .filter(|(_, conn)| conn.user_id == Some(user_id))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Queue a text frame on every connection. Returns how many accepted it.
    ///
    /// A connection whose writer already stopped is skipped; its reader
    /// loop removes it.
    pub async fn broadcast_text(&self, text: impl Into<Utf8Bytes>) -> usize {
        let message = Message::Text(text.into());
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    /// Queue a text frame on every connection owned by `user_id`.
    pub async fn send_to_user(&self, user_id: DbId, text: impl Into<Utf8Bytes>) -> usize {
        let message = Message::Text(text.into());
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.user_id == Some(user_id))
            .filter(|conn| conn.sender.send(message.clone()).is_ok())
            .count()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of distinct users with at least one open connection.
    pub async fn connected_users(&self) -> usize {
        let conns = self.connections.read().await;
        let mut users: Vec<DbId> = conns.values().filter_map(|c| c.user_id).collect();
        users.sort_unstable();
        users.dedup();
        users.len()
    }

    /// Send Close to every connection and forget them all.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    pub async fn ping_all(&self) {
        for conn in self.connections.read().await.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
