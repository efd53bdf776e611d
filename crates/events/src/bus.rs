//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`RealtimeEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::groups::{SKYBOX_GROUP, SKYBOX_UPDATE, SKYBOX_UPDATED_MESSAGE};

// ---------------------------------------------------------------------------
// RealtimeEvent
// ---------------------------------------------------------------------------

/// A message for every current subscriber of one group.
///
/// Carries no identity and no sequence number; receivers are expected to
/// re-fetch whatever state the tag refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    /// Target group, e.g. `"skybox-updates"`.
    pub group: String,

    /// Event tag, e.g. `"skybox_update"`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Human-readable text forwarded to clients as-is.
    pub message: String,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RealtimeEvent {
    pub fn new(
        group: impl Into<String>,
        event_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            event_type: event_type.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// The "skybox was replaced" signal for the viewer group.
    pub fn skybox_updated() -> Self {
        Self::new(SKYBOX_GROUP, SKYBOX_UPDATE, SKYBOX_UPDATED_MESSAGE)
    }

    /// JSON text frame sent to a connected client: `{"message": ...}`.
    pub fn client_payload(&self) -> String {
        serde_json::json!({ "message": self.message }).to_string()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use interio_events::bus::{EventBus, RealtimeEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// let delivered = bus.publish(RealtimeEvent::skybox_updated());
/// assert_eq!(delivered, 1);
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers the event was handed to. Zero
    /// means it was dropped.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        let group = event.group.clone();
        match self.sender.send(event) {
            Ok(n) => n,
            Err(_) => {
                tracing::debug!(group = %group, "Event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(RealtimeEvent::skybox_updated()), 1);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.group, "skybox-updates");
        assert_eq!(received.event_type, "skybox_update");
        assert_eq!(received.message, "Skybox updated");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(RealtimeEvent::new("lobby", "ping", "hi"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1, e2);
    }

    #[test]
    fn publish_with_no_subscribers_returns_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(RealtimeEvent::skybox_updated()), 0);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(RealtimeEvent::skybox_updated());

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn client_payload_carries_only_the_message() {
        let payload: serde_json::Value =
            serde_json::from_str(&RealtimeEvent::skybox_updated().client_payload()).unwrap();
        assert_eq!(payload, serde_json::json!({ "message": "Skybox updated" }));
    }

    #[test]
    fn event_serializes_type_tag() {
        let json = serde_json::to_value(RealtimeEvent::skybox_updated()).unwrap();
        assert_eq!(json["type"], "skybox_update");
        assert!(json.get("event_type").is_none());
    }
}
