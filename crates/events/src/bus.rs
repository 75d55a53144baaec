//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`ChangeEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfloor_core::live_events::{EVENT_INVENTORY_UPDATED, EVENT_ORDER_UPDATED};
use shopfloor_core::types::DbId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// Which kind of entity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTopic {
    Order,
    Inventory,
}

impl ChangeTopic {
    /// Event name pushed to live clients.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Order => EVENT_ORDER_UPDATED,
            Self::Inventory => EVENT_INVENTORY_UPDATED,
        }
    }

    /// Key under which the entity id is sent (`orderId`, `itemId`).
    pub fn id_key(&self) -> &'static str {
        match self {
            Self::Order => "orderId",
            Self::Inventory => "itemId",
        }
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// A mutation that live dashboards should hear about.
///
/// Constructed via [`ChangeEvent::order`] / [`ChangeEvent::inventory`] and
/// optionally enriched with [`with_actor`](ChangeEvent::with_actor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: ChangeTopic,
    pub action: ChangeAction,
    pub entity_id: DbId,

    /// Optional id of the user that triggered the change.
    pub actor_user_id: Option<DbId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(topic: ChangeTopic, action: ChangeAction, entity_id: DbId) -> Self {
        Self {
            topic,
            action,
            entity_id,
            actor_user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn order(action: ChangeAction, order_id: DbId) -> Self {
        Self::new(ChangeTopic::Order, action, order_id)
    }

    pub fn inventory(action: ChangeAction, item_id: DbId) -> Self {
        Self::new(ChangeTopic::Inventory, action, item_id)
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// The client-facing payload: `{ "action": "...", "<entity>Id": n }`.
    pub fn wire_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        payload.insert("action".into(), self.action.as_str().into());
        payload.insert(self.topic.id_key().into(), self.entity_id.into());
        serde_json::Value::Object(payload)
    }
}

// ---------------------------------------------------------------------------
// ChangePublisher
// ---------------------------------------------------------------------------

/// Outbound publish seam for mutating components.
///
/// Implementations must return without waiting on delivery and must never
/// report failure to the caller.
pub trait ChangePublisher: Send + Sync {
    fn publish(&self, event: ChangeEvent);
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ChangeEvent`].
///
/// # Usage
///
/// ```rust
/// use shopfloor_events::bus::{ChangeAction, ChangeEvent, ChangePublisher, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ChangeEvent::order(ChangeAction::Created, 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
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

    /// Subscribe to all events published on this bus.
    ///
    /// Events published before the call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ChangePublisher for EventBus {
    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    fn publish(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Change event dropped, no subscribers");
        }
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
