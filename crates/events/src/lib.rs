//! Office Quest real-time event infrastructure.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`QuestEvent`] -- the event envelope published after every committed
//!   ledger or catalog mutation.
//! - [`EventPublisher`] -- the capability the ledger is handed, so it has no
//!   dependency on how events reach clients.

pub mod bus;

pub use bus::{EventBus, EventPublisher, QuestEvent};
