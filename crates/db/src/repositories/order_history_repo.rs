//! Repository for the append-only order status history.

use shopfloor_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::order_history::{OrderHistoryEntry, OrderHistoryWithActor};

/// Column list for `order_history`.
const COLUMNS: &str = "id, order_id, status, changed_by, notes, created_at";

/// Read access to order history. Writes only happen through
/// [`OrderRepo`](crate::repositories::OrderRepo), inside the transaction
/// that changes the order.
pub struct OrderHistoryRepo;

impl OrderHistoryRepo {
    /// Append a history row on an open connection or transaction.
    pub(crate) async fn append(
        conn: &mut PgConnection,
        order_id: DbId,
        status: &str,
        changed_by: Option<DbId>,
        notes: Option<&str>,
    ) -> Result<OrderHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO order_history (order_id, status, changed_by, notes) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrderHistoryEntry>(&query)
            .bind(order_id)
            .bind(status)
            .bind(changed_by)
            .bind(notes)
            .fetch_one(conn)
            .await
    }

    /// All history for an order, newest first, with actor names resolved.
    pub async fn list_for_order(
        pool: &PgPool,
        order_id: DbId,
    ) -> Result<Vec<OrderHistoryWithActor>, sqlx::Error> {
        sqlx::query_as::<_, OrderHistoryWithActor>(
            "SELECT h.id, h.order_id, h.status, h.changed_by, h.notes, h.created_at, \
                    u.full_name AS changed_by_name \
             FROM order_history h \
             LEFT JOIN users u ON h.changed_by = u.id \
             WHERE h.order_id = $1 \
             ORDER BY h.created_at DESC, h.id DESC",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    /// Number of history rows recorded for an order.
    pub async fn count_for_order(pool: &PgPool, order_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_history WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
