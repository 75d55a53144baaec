//! Handlers for the dashboard widgets.
//!
//! Dashboards load these once, then keep themselves current from the live
//! channel. All endpoints require authentication via [`AuthUser`].

use axum::extract::State;
use axum::Json;
use shopfloor_db::models::dashboard::{OrderStats, StatusCount};
use shopfloor_db::models::order::OrderListing;
use shopfloor_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of orders shown in the recent-orders widget.
pub const RECENT_ORDERS_LIMIT: i64 = 10;

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<OrderStats>>> {
    let stats = DashboardRepo::order_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/dashboard/recent-orders
pub async fn recent_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<OrderListing>>>> {
    let orders = state.orders.list(Some(RECENT_ORDERS_LIMIT)).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/dashboard/order-status-chart
pub async fn order_status_chart(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<StatusCount>>>> {
    let counts = DashboardRepo::status_breakdown(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}
