//! Event bus to dashboard group relay.

use std::sync::Arc;

use axum::extract::ws::Message;
use shopfloor_core::live_events::DASHBOARD_GROUP;
use shopfloor_events::ChangeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Forwards change events to every connection in the dashboard group.
///
/// Delivery is best effort: members that joined after an event was
/// published never see it, and events dropped while the relay lagged are
/// not replayed.
pub struct DashboardRelay {
    ws_manager: Arc<WsManager>,
}

impl DashboardRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop until the [`EventBus`](shopfloor_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Dashboard relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, dashboard relay shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &ChangeEvent) {
        let text = dashboard_frame(event).to_string();
        let delivered = self
            .ws_manager
            .broadcast_to_group(DASHBOARD_GROUP, Message::Text(text.into()))
            .await;
        tracing::debug!(
            event = event.topic.event_name(),
            action = event.action.as_str(),
            entity_id = event.entity_id,
            delivered,
            "Relayed change event"
        );
    }
}

/// The outbound frame: `{"event": "order-updated", "data": {...}}`.
pub fn dashboard_frame(event: &ChangeEvent) -> serde_json::Value {
    serde_json::json!({
        "event": event.topic.event_name(),
        "data": event.wire_payload(),
    })
}
