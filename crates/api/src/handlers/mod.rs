//! Request handlers.
//!
//! Handlers delegate to `shopfloor_pipeline` for order mutations and to the
//! `shopfloor_db` repositories for read-only aggregates, mapping errors via
//! [`AppError`](crate::error::AppError).

pub mod dashboard;
pub mod order_import;
pub mod orders;
