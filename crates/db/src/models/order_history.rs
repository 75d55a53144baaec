//! Order status history models.
//!
//! History rows are append-only: there is no `updated_at` column and no
//! update or delete path. A database trigger rejects both.

use serde::Serialize;
use shopfloor_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `order_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderHistoryEntry {
    pub id: DbId,
    pub order_id: DbId,
    pub status: String,
    pub changed_by: Option<DbId>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// A history row with the actor's display name resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderHistoryWithActor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: OrderHistoryEntry,
    pub changed_by_name: Option<String>,
}
