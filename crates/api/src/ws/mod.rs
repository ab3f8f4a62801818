//! WebSocket channel for live ledger updates.
//!
//! Clients connect to `/api/v1/ws`, optionally passing `?token=<jwt>` so the
//! connection can receive celebration frames addressed to its user.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
