//! Live dashboard notification delivery.
//!
//! The [`DashboardRelay`] subscribes to the event bus and pushes every
//! change event to the WebSocket connections in the dashboard group.

pub mod dashboard;

pub use dashboard::DashboardRelay;
