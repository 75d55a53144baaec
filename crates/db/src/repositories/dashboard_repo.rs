//! Aggregate queries backing the dashboard widgets.

use sqlx::PgPool;

use crate::models::dashboard::{OrderStats, StatusCount};

/// Read-only dashboard aggregates.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Order counts overall and per status, in a single scan.
    pub async fn order_stats(pool: &PgPool) -> Result<OrderStats, sqlx::Error> {
        sqlx::query_as::<_, OrderStats>(
            "SELECT \
                COUNT(*) AS total_orders, \
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_orders, \
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_orders, \
                COUNT(*) FILTER (WHERE status = 'completed') AS completed_orders, \
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_orders \
             FROM orders",
        )
        .fetch_one(pool)
        .await
    }

    /// Order counts grouped by status (statuses with no orders are omitted).
    pub async fn status_breakdown(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
