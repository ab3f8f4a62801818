//! Event bus to WebSocket bridge.
//!
//! [`EventBroadcaster`] subscribes to the [`EventBus`](quest_events::EventBus)
//! and forwards each [`QuestEvent`] to every open connection. Events for
//! which the subject deserves a celebration additionally produce a
//! `celebration` frame sent only to the subject's own connections.

use std::sync::Arc;

use quest_core::events::{CELEBRATED_EVENTS, EVENT_CELEBRATION};
use quest_events::QuestEvent;
use serde_json::json;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct EventBroadcaster {
    ws_manager: Arc<WsManager>,
}

impl EventBroadcaster {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Forward events until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<QuestEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event broadcaster lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, broadcaster shutting down");
                    break;
                }
            }
        }
    }

    async fn deliver(&self, event: &QuestEvent) {
        let delivered = self
            .ws_manager
            .broadcast_text(event_frame(event).to_string())
            .await;
        tracing::debug!(event_type = %event.event_type, delivered, "Broadcast event");

        if let Some((user_id, frame)) = celebration_frame(event) {
            let sent = self
                .ws_manager
                .send_to_user(user_id, frame.to_string())
                .await;
            tracing::debug!(user_id, sent, "Sent celebration");
        }
    }
}

/// The frame every client sees for an event.
pub fn event_frame(event: &QuestEvent) -> serde_json::Value {
    json!({
        "event": event.event_type,
        "payload": event.payload,
        "timestamp": event.timestamp,
    })
}

/// The subject-only celebration frame, if this event earns one.
pub fn celebration_frame(event: &QuestEvent) -> Option<(i64, serde_json::Value)> {
    if !CELEBRATED_EVENTS.contains(&event.event_type.as_str()) {
        return None;
    }
    let user_id = event.subject_user_id?;
    let message = event.celebration.as_ref()?;
    Some((
        user_id,
        json!({
            "event": EVENT_CELEBRATION,
            "message": message,
            "source": event.event_type,
            "timestamp": event.timestamp,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::events::{EVENT_POINTS_AWARDED, EVENT_REWARD_CREATED};

    #[test]
    fn event_frame_carries_name_and_payload() {
        let event = QuestEvent::new(EVENT_REWARD_CREATED).with_payload(json!({"id": 7}));
        let frame = event_frame(&event);
        assert_eq!(frame["event"], "rewardCreated");
        assert_eq!(frame["payload"]["id"], 7);
        assert!(frame["timestamp"].is_string());
    }

    #[test]
    fn celebration_goes_to_subject() {
        let event = QuestEvent::new(EVENT_POINTS_AWARDED)
            .with_subject(42)
            .with_celebration("+100 points! Great demo");
        let (user_id, frame) = celebration_frame(&event).expect("celebrated");
        assert_eq!(user_id, 42);
        assert_eq!(frame["event"], "celebration");
        assert_eq!(frame["message"], "+100 points! Great demo");
        assert_eq!(frame["source"], "pointsAwarded");
    }

    #[test]
    fn catalog_events_are_not_celebrated() {
        let event = QuestEvent::new(EVENT_REWARD_CREATED)
            .with_subject(42)
            .with_celebration("ignored");
        assert!(celebration_frame(&event).is_none());
    }

    #[test]
    fn celebration_needs_a_subject() {
        let event = QuestEvent::new(EVENT_POINTS_AWARDED).with_celebration("+5 points! x");
        assert!(celebration_frame(&event).is_none());
    }
}
