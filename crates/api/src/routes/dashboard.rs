//! Route definitions for the dashboard widgets.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Widget data routes mounted at `/dashboard`.
///
/// ```text
/// GET  /stats                -> stats
/// GET  /recent-orders        -> recent_orders
/// GET  /order-status-chart   -> order_status_chart
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard::stats))
        .route("/recent-orders", get(dashboard::recent_orders))
        .route("/order-status-chart", get(dashboard::order_status_chart))
}
