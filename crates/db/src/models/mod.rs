//! Row models and DTOs.
//!
//! Row structs derive `FromRow` + `Serialize`; create/update DTOs live next
//! to the row they produce.

pub mod dashboard;
pub mod order;
pub mod order_history;
pub mod user;
