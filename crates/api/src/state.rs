use std::sync::Arc;

use shopfloor_events::EventBus;
use shopfloor_pipeline::OrderLifecycle;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shopfloor_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser dashboards).
    pub ws_manager: Arc<WsManager>,
    /// Change event bus; the dashboard relay subscribes to it.
    pub event_bus: Arc<EventBus>,
    /// Order lifecycle service, publishing to `event_bus`.
    pub orders: OrderLifecycle,
}

impl AppState {
    /// Wire the lifecycle service to the given bus.
    pub fn new(
        pool: shopfloor_db::DbPool,
        config: Arc<ServerConfig>,
        ws_manager: Arc<WsManager>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let orders = OrderLifecycle::new(pool.clone(), event_bus.clone());
        Self {
            pool,
            config,
            ws_manager,
            event_bus,
            orders,
        }
    }
}
