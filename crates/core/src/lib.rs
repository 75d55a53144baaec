//! Shopfloor core domain logic.
//!
//! Pure types and functions shared by every other crate. Nothing in here
//! touches the database or the async runtime.

pub mod error;
pub mod importer;
pub mod live_events;
pub mod orders;
pub mod types;
pub mod workbook;
