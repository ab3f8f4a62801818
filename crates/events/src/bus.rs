//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`QuestEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.
//! Delivery is best-effort and at-most-once: a slow subscriber that falls
//! more than the channel capacity behind observes `RecvError::Lagged`.

use chrono::{DateTime, Utc};
use quest_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// QuestEvent
// ---------------------------------------------------------------------------

/// A state change that observers should hear about.
///
/// Constructed via [`QuestEvent::new`] and enriched with the builder
/// methods [`with_subject`](QuestEvent::with_subject),
/// [`with_actor`](QuestEvent::with_actor),
/// [`with_payload`](QuestEvent::with_payload) and
/// [`with_celebration`](QuestEvent::with_celebration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestEvent {
    /// Event name, e.g. `"rewardPurchased"`.
    pub event_type: String,

    /// User whose ledger the mutation touched, if any.
    pub subject_user_id: Option<DbId>,

    /// User who performed the mutation, if any.
    pub actor_user_id: Option<DbId>,

    /// Message shown to the subject user only.
    pub celebration: Option<String>,

    /// Event-specific JSON payload.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl QuestEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            subject_user_id: None,
            actor_user_id: None,
            celebration: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the user whose ledger changed.
    pub fn with_subject(mut self, user_id: DbId) -> Self {
        self.subject_user_id = Some(user_id);
        self
    }

    /// Attach the acting user.
    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    /// Set the JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a celebration message for the subject user.
    pub fn with_celebration(mut self, message: impl Into<String>) -> Self {
        self.celebration = Some(message.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventPublisher
// ---------------------------------------------------------------------------

/// Fire-and-forget publish capability.
///
/// Implementations must not block and must not fail the caller: by the time
/// an event is published the mutation it describes has already committed.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: QuestEvent);
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`QuestEvent`]. Subscribers see
/// events in publish order.
///
/// # Usage
///
/// ```rust
/// use quest_events::bus::{EventBus, EventPublisher, QuestEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(QuestEvent::new("rewardCreated"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<QuestEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<QuestEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for EventBus {
    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    fn publish(&self, event: QuestEvent) {
        tracing::debug!(event_type = %event.event_type, "Publishing event");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
