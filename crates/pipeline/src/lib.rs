//! Order orchestration on top of the store and the event bus.
//!
//! - [`lifecycle::OrderLifecycle`] creates and transitions orders, keeps the
//!   history in step with every status write and publishes a change event
//!   once the write has committed.
//! - [`import`] runs the Import Batch Processor: one workbook in, one
//!   [`ImportBatchResult`](shopfloor_core::importer::ImportBatchResult) out.

pub mod import;
pub mod lifecycle;

pub use import::{import_sheet, import_workbook, OrderSink};
pub use lifecycle::OrderLifecycle;
