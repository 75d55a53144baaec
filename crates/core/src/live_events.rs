//! Wire constants for the live dashboard channel.
//!
//! Shared by the WebSocket handler (inbound handshake) and the dashboard
//! relay (outbound event names).

/// Name of the subscription group every live dashboard joins.
pub const DASHBOARD_GROUP: &str = "dashboard";

/// Inbound message type that adds a connection to the dashboard group.
pub const MSG_TYPE_JOIN_DASHBOARD: &str = "join-dashboard";

/// Inbound message type that removes a connection from the dashboard group.
pub const MSG_TYPE_LEAVE_DASHBOARD: &str = "leave-dashboard";

/// Outbound event emitted after an order is created or updated.
pub const EVENT_ORDER_UPDATED: &str = "order-updated";

/// Outbound event emitted after an inventory item changes.
pub const EVENT_INVENTORY_UPDATED: &str = "inventory-updated";
