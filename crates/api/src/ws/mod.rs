//! WebSocket live channel.
//!
//! Provides connection management with named groups, heartbeat pings, and
//! the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{parse_client_command, ws_handler, ClientCommand};
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::WsManager;
