//! Route definitions for orders and spreadsheet import.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{order_import, orders};
use crate::state::AppState;

/// Order routes mounted at `/orders`.
///
/// ```text
/// GET   /               -> list_orders
/// POST  /               -> create_order
/// POST  /import         -> import_orders (multipart, size-limited)
/// GET   /{id}           -> get_order
/// PUT   /{id}           -> update_order
/// GET   /{id}/history   -> order_history
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_orders).post(orders::create_order))
        .route(
            "/import",
            post(order_import::import_orders).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}", get(orders::get_order).put(orders::update_order))
        .route("/{id}/history", get(orders::order_history))
}
