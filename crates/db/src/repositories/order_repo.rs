//! Repository for production orders.
//!
//! Every write that changes an order's status also writes its history row
//! inside the same transaction, so the two are committed or rolled back
//! together.

use shopfloor_core::orders::HISTORY_NOTE_CREATED;
use shopfloor_core::types::DbId;
use sqlx::PgPool;

use crate::models::order::{CreateOrder, Order, OrderListing, TransitionOrder};
use crate::repositories::OrderHistoryRepo;

/// Column list for `orders`.
const COLUMNS: &str = "id, order_number, customer_name, product_name, quantity, status, \
     priority, delivery_date, kanban_id, notes, assigned_to, created_by, \
     created_at, updated_at";

/// `orders` columns qualified with the `o` alias, for joins.
const QUALIFIED_COLUMNS: &str = "o.id, o.order_number, o.customer_name, o.product_name, \
     o.quantity, o.status, o.priority, o.delivery_date, o.kanban_id, o.notes, \
     o.assigned_to, o.created_by, o.created_at, o.updated_at";

/// Name of the unique constraint guarding `order_number`.
pub const ORDER_NUMBER_CONSTRAINT: &str = "uq_orders_order_number";

/// Provides order persistence.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert an order and its "Order created" history entry atomically.
    ///
    /// A duplicate order number surfaces as a unique violation on
    /// [`ORDER_NUMBER_CONSTRAINT`] and nothing is written.
    pub async fn create_with_history(
        pool: &PgPool,
        input: &CreateOrder,
    ) -> Result<Order, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO orders \
                (order_number, customer_name, product_name, quantity, status, priority, \
                 delivery_date, kanban_id, notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(&input.order_number)
            .bind(&input.customer_name)
            .bind(&input.product_name)
            .bind(input.quantity)
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(&input.delivery_date)
            .bind(&input.kanban_id)
            .bind(&input.notes)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        OrderHistoryRepo::append(
            &mut *tx,
            order.id,
            &order.status,
            Some(input.created_by),
            Some(HISTORY_NOTE_CREATED),
        )
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    /// Apply a status and/or assignee change.
    ///
    /// The assignee is only touched when the caller supplied it; an inner
    /// `None` clears it. When a status is supplied a history entry is appended in the same
    /// transaction. Returns `None` if the order does not exist; nothing is
    /// written in that case.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        input: &TransitionOrder,
        changed_by: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE orders SET \
                status = COALESCE($2, status), \
                assigned_to = CASE WHEN $3 THEN $4 ELSE assigned_to END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = updated else {
            return Ok(None);
        };

        if let Some(status) = input.status {
            OrderHistoryRepo::append(&mut *tx, order.id, status.as_str(), Some(changed_by), None)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(order))
    }

    /// Find an order by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an order by its business key.
    pub async fn find_by_order_number(
        pool: &PgPool,
        order_number: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE order_number = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(order_number)
            .fetch_optional(pool)
            .await
    }

    /// List orders newest first with assignee/creator display names.
    ///
    /// `limit = None` returns every order.
    pub async fn list_with_names(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<OrderListing>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS}, \
                    a.full_name AS assigned_name, \
                    c.full_name AS created_name \
             FROM orders o \
             LEFT JOIN users a ON o.assigned_to = a.id \
             LEFT JOIN users c ON o.created_by = c.id \
             ORDER BY o.created_at DESC, o.id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, OrderListing>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
