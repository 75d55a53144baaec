//! Handlers for manual order entry, status transitions and history.
//!
//! All endpoints require authentication via [`AuthUser`]. Mutations go
//! through [`OrderLifecycle`](shopfloor_pipeline::OrderLifecycle), which
//! writes the history entry and publishes the change event.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shopfloor_core::error::CoreError;
use shopfloor_core::orders::{OrderPriority, OrderStatus};
use shopfloor_core::types::DbId;
use shopfloor_db::models::order::{CreateOrder, Order, OrderListing, TransitionOrder};
use shopfloor_db::models::order_history::OrderHistoryWithActor;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /orders`.
///
/// Every field is optional at the parsing stage so a missing field is
/// reported as a 400 naming the field rather than a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_number: Option<String>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub priority: Option<OrderPriority>,
    pub delivery_date: Option<String>,
    pub kanban_id: Option<String>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Convert into a store payload attributed to `actor`.
    ///
    /// New orders always start as `pending`.
    pub fn into_create(self, actor: DbId) -> Result<CreateOrder, CoreError> {
        Ok(CreateOrder {
            order_number: required("orderNumber", self.order_number)?,
            customer_name: required("customerName", self.customer_name)?,
            product_name: required("productName", self.product_name)?,
            quantity: self
                .quantity
                .ok_or_else(|| CoreError::Validation("quantity is required".to_string()))?,
            status: OrderStatus::Pending,
            priority: self.priority.unwrap_or_default(),
            delivery_date: non_blank(self.delivery_date),
            kanban_id: non_blank(self.kanban_id),
            notes: non_blank(self.notes),
            created_by: actor,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, CoreError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<OrderListing>>>> {
    let orders = state.orders.list(None).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = state.orders.get(id).await?;
    Ok(Json(DataResponse { data: order }))
}

/// POST /api/v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Order>>)> {
    let input = body.into_create(user.user_id)?;
    let order = state.orders.create(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// PUT /api/v1/orders/{id}
///
/// Accepts `{ "status"?, "assignedTo"? }`; at least one is required.
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<TransitionOrder>,
) -> AppResult<Json<DataResponse<Order>>> {
    let order = state.orders.transition(id, &body, user.user_id).await?;
    Ok(Json(DataResponse { data: order }))
}

/// GET /api/v1/orders/{id}/history
pub async fn order_history(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<OrderHistoryWithActor>>>> {
    let history = state.orders.history(id).await?;
    Ok(Json(DataResponse { data: history }))
}
