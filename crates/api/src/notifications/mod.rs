//! Fan-out of ledger events to WebSocket clients.

pub mod broadcaster;

pub use broadcaster::EventBroadcaster;
