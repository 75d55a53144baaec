//! Shopfloor change notification.
//!
//! - [`ChangeEvent`] — an order or inventory mutation worth telling live
//!   dashboards about.
//! - [`ChangePublisher`] — the outbound publish seam injected into every
//!   mutating component.
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.

pub mod bus;

pub use bus::{ChangeAction, ChangeEvent, ChangePublisher, ChangeTopic, EventBus};
