//! Production order models and DTOs.
//!
//! `status` and `priority` are stored as text constrained by CHECK clauses;
//! the typed enums live in `shopfloor_core::orders`.

use serde::{Deserialize, Deserializer, Serialize};
use shopfloor_core::importer::NormalizedOrder;
use shopfloor_core::orders::{OrderPriority, OrderStatus};
use shopfloor_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub status: String,
    pub priority: String,
    pub delivery_date: Option<String>,
    pub kanban_id: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An order joined with the display names of its assignee and creator.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,
    pub assigned_name: Option<String>,
    pub created_name: Option<String>,
}

/// DTO for inserting an order. Used by manual entry and bulk import.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub order_number: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub status: OrderStatus,
    pub priority: OrderPriority,
    pub delivery_date: Option<String>,
    pub kanban_id: Option<String>,
    pub notes: Option<String>,
    pub created_by: DbId,
}

impl From<NormalizedOrder> for CreateOrder {
    fn from(row: NormalizedOrder) -> Self {
        Self {
            order_number: row.order_number,
            customer_name: row.customer_name,
            product_name: row.product_name,
            quantity: row.quantity,
            status: row.status,
            priority: row.priority,
            delivery_date: row.delivery_date,
            kanban_id: Some(row.kanban_id),
            notes: Some(row.notes),
            created_by: row.created_by,
        }
    }
}

/// Request body for a status and/or assignee change.
///
/// `assigned_to` distinguishes an absent key (`None`, keep the assignee)
/// from an explicit `null` (`Some(None)`, unassign).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOrder {
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "present")]
    pub assigned_to: Option<Option<DbId>>,
}

impl TransitionOrder {
    /// True when neither field was supplied.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none()
    }
}

/// Wrap any value that is present in the body, `null` included.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
