//! The Order Lifecycle Store service.
//!
//! Wraps [`OrderRepo`] and [`OrderHistoryRepo`] with input validation,
//! storage-error classification and change notification. Events are
//! published only after the transaction has committed; publishing never
//! blocks and never fails the caller.

use std::sync::Arc;

use shopfloor_core::error::CoreError;
use shopfloor_core::orders::{validate_quantity, validate_required_text};
use shopfloor_core::types::DbId;
use shopfloor_db::models::order::{CreateOrder, Order, OrderListing, TransitionOrder};
use shopfloor_db::models::order_history::OrderHistoryWithActor;
use shopfloor_db::repositories::order_repo::ORDER_NUMBER_CONSTRAINT;
use shopfloor_db::repositories::{OrderHistoryRepo, OrderRepo};
use shopfloor_db::DbPool;
use shopfloor_events::{ChangeAction, ChangeEvent, ChangePublisher};

/// PostgreSQL SQLSTATE for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Order creation, transitions and history reads.
///
/// Cheap to clone; shared by the HTTP handlers and the importer.
#[derive(Clone)]
pub struct OrderLifecycle {
    pool: DbPool,
    publisher: Arc<dyn ChangePublisher>,
}

impl OrderLifecycle {
    pub fn new(pool: DbPool, publisher: Arc<dyn ChangePublisher>) -> Self {
        Self { pool, publisher }
    }

    /// Create an order together with its "Order created" history entry.
    ///
    /// A duplicate order number yields [`CoreError::Conflict`]. When two
    /// requests race on the same number the database constraint decides the
    /// winner and the loser sees the conflict.
    pub async fn create(&self, input: CreateOrder) -> Result<Order, CoreError> {
        validate_create(&input)?;

        let order = OrderRepo::create_with_history(&self.pool, &input)
            .await
            .map_err(|e| classify_write_error(e, &input.order_number))?;

        tracing::info!(
            order_id = order.id,
            order_number = %order.order_number,
            actor_id = input.created_by,
            "Order created"
        );
        self.publisher.publish(
            ChangeEvent::order(ChangeAction::Created, order.id).with_actor(input.created_by),
        );

        Ok(order)
    }

    /// Change an order's status and/or assignee.
    ///
    /// A status change appends a history entry attributed to `actor` in the
    /// same transaction as the update.
    pub async fn transition(
        &self,
        id: DbId,
        input: &TransitionOrder,
        actor: DbId,
    ) -> Result<Order, CoreError> {
        if input.is_empty() {
            return Err(CoreError::Validation("No fields to update".to_string()));
        }

        let order = OrderRepo::transition(&self.pool, id, input, actor)
            .await
            .map_err(|e| classify_write_error(e, ""))?
            .ok_or(CoreError::NotFound {
                entity: "Order",
                id,
            })?;

        tracing::info!(
            order_id = order.id,
            status = ?input.status,
            assigned_to = ?input.assigned_to,
            actor_id = actor,
            "Order updated"
        );
        self.publisher
            .publish(ChangeEvent::order(ChangeAction::Updated, order.id).with_actor(actor));

        Ok(order)
    }

    /// History of one order, newest first.
    pub async fn history(&self, id: DbId) -> Result<Vec<OrderHistoryWithActor>, CoreError> {
        self.get(id).await?;
        OrderHistoryRepo::list_for_order(&self.pool, id)
            .await
            .map_err(internal)
    }

    pub async fn get(&self, id: DbId) -> Result<Order, CoreError> {
        OrderRepo::find_by_id(&self.pool, id)
            .await
            .map_err(internal)?
            .ok_or(CoreError::NotFound {
                entity: "Order",
                id,
            })
    }

    /// Orders newest first with display names; `limit = None` lists all.
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<OrderListing>, CoreError> {
        OrderRepo::list_with_names(&self.pool, limit)
            .await
            .map_err(internal)
    }
}

fn validate_create(input: &CreateOrder) -> Result<(), CoreError> {
    validate_required_text("orderNumber", &input.order_number)?;
    validate_required_text("customerName", &input.customer_name)?;
    validate_required_text("productName", &input.product_name)?;
    validate_quantity(input.quantity)
}

/// Map a failed order write onto the domain error the caller may see.
fn classify_write_error(err: sqlx::Error, order_number: &str) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) if db_err.constraint() == Some(ORDER_NUMBER_CONSTRAINT) => {
                return CoreError::Conflict(format!(
                    "Order number '{order_number}' already exists"
                ));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return CoreError::Validation("Referenced user does not exist".to_string());
            }
            _ => {}
        }
    }
    internal(err)
}

fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Order store failure");
    CoreError::Internal("Order store failure".to_string())
}
