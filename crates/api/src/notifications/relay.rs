//! Event-to-WebSocket relay.
//!
//! [`NotificationRelay`] subscribes to the event bus and forwards each
//! [`RealtimeEvent`] to every WebSocket connection in the event's group.

use std::sync::Arc;

use axum::extract::ws::Message;
use interio_events::RealtimeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct NotificationRelay {
    ws_manager: Arc<WsManager>,
}

impl NotificationRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](interio_events::EventBus) is dropped). Lagged events
    /// are skipped, not replayed.
    pub async fn run(self, mut receiver: broadcast::Receiver<RealtimeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.relay(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }

    async fn relay(&self, event: &RealtimeEvent) -> usize {
        let message = Message::Text(event.client_payload().into());
        let delivered = self.ws_manager.send_to_group(&event.group, message).await;
        tracing::info!(
            group = %event.group,
            event_type = %event.event_type,
            delivered,
            "Relayed real-time event"
        );
        delivered
    }
}
