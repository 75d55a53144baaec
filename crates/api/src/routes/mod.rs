pub mod dashboard;
pub mod health;
pub mod orders;

use axum::routing::get;
use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                              WebSocket live channel
///
/// /orders                          list, create
/// /orders/import                   spreadsheet import (multipart)
/// /orders/{id}                     get, update (status / assignee)
/// /orders/{id}/history             status history, newest first
///
/// /dashboard/stats                 order counts per status
/// /dashboard/recent-orders         ten newest orders
/// /dashboard/order-status-chart    [{status, count}]
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/orders", orders::router(config.max_upload_bytes))
        .nest("/dashboard", dashboard::router())
}
