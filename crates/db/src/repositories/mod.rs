//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod order_history_repo;
pub mod order_repo;
pub mod user_repo;

pub use dashboard_repo::DashboardRepo;
pub use order_history_repo::OrderHistoryRepo;
pub use order_repo::OrderRepo;
pub use user_repo::UserRepo;
