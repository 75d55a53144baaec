//! Aggregate read models for the dashboard endpoints.

use serde::Serialize;
use sqlx::FromRow;

/// Order counts per lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub in_progress_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
}

/// One bar of the order-status chart.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
