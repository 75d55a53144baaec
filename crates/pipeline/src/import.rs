//! Import Batch Processor.
//!
//! Reads the target sheet of an uploaded workbook, resolves its header row
//! once, then normalizes and persists the data rows one at a time. Rows are
//! processed strictly in file order: synthesized order numbers depend on the
//! row position and each create must finish before the next one starts.
//!
//! Structural problems (unreadable payload, missing or empty sheet,
//! unresolved header) abort the batch before any row is written. A row that
//! fails to persist is recorded in the result and the batch carries on.
//! Rows already written stay committed.

use async_trait::async_trait;
use shopfloor_core::error::CoreError;
use shopfloor_core::importer::{
    normalize_row, resolve_schema, ImportBatchResult, ImportError, RowContext, RowOutcome,
    TARGET_SHEET_INDEX,
};
use shopfloor_core::types::DbId;
use shopfloor_core::workbook::{read_sheet, SheetRows};
use shopfloor_db::models::order::CreateOrder;

use crate::lifecycle::OrderLifecycle;

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Destination for normalized rows.
///
/// Implemented by [`OrderLifecycle`] for production, so every imported row
/// gets its history entry and change event exactly like a manual create.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Persist one order, returning its id.
    async fn create_order(&self, input: CreateOrder) -> Result<DbId, CoreError>;
}

#[async_trait]
impl OrderSink for OrderLifecycle {
    async fn create_order(&self, input: CreateOrder) -> Result<DbId, CoreError> {
        self.create(input).await.map(|order| order.id)
    }
}

// ---------------------------------------------------------------------------
// Batch processing
// ---------------------------------------------------------------------------

/// Import the target sheet of a raw workbook payload.
///
/// The workbook is parsed on the blocking pool since it is fully read into
/// memory before row iteration starts.
pub async fn import_workbook<S>(
    sink: &S,
    bytes: Vec<u8>,
    actor: DbId,
) -> Result<ImportBatchResult, ImportError>
where
    S: OrderSink + ?Sized,
{
    let sheet = tokio::task::spawn_blocking(move || read_sheet(&bytes, TARGET_SHEET_INDEX))
        .await
        .map_err(|e| ImportError::Workbook(format!("workbook reader aborted: {e}")))??;

    import_sheet(sink, &sheet, actor).await
}

/// Import already-extracted sheet rows.
pub async fn import_sheet<S>(
    sink: &S,
    sheet: &SheetRows,
    actor: DbId,
) -> Result<ImportBatchResult, ImportError>
where
    S: OrderSink + ?Sized,
{
    let mapping = resolve_schema(sheet.headers())?;
    let mut result = ImportBatchResult::new(sheet.data_row_count());

    for (row_number, row) in sheet.data_rows() {
        let ctx = RowContext {
            sheet_name: &sheet.name,
            row_number,
            actor,
        };

        let order = match normalize_row(row, &mapping, &ctx) {
            RowOutcome::Skip => {
                result.record_skipped();
                continue;
            }
            RowOutcome::Order(order) => order,
        };

        match sink.create_order(order.into()).await {
            Ok(_) => result.record_imported(),
            Err(err) => {
                tracing::warn!(
                    sheet = %sheet.name,
                    row = row_number,
                    error = %err,
                    "Import row rejected"
                );
                result.record_failure(row_number, row_failure_reason(&err));
            }
        }
    }

    let result = result.finish(&sheet.name);
    tracing::info!(
        sheet = %sheet.name,
        actor_id = actor,
        imported = result.imported,
        skipped = result.skipped,
        failed = result.failed,
        total = result.total,
        "Import batch finished"
    );
    Ok(result)
}

/// Text placed after `Row <n>: ` for a rejected row.
fn row_failure_reason(err: &CoreError) -> String {
    match err {
        CoreError::Conflict(msg) | CoreError::Validation(msg) => msg.clone(),
        CoreError::Internal(_) => "Failed to save order".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use rust_xlsxwriter::Workbook;
    use shopfloor_core::importer::CanonicalField;

    use super::*;

    /// In-memory sink enforcing order-number uniqueness.
    #[derive(Default)]
    struct MemorySink {
        taken: Mutex<HashSet<String>>,
        created: Mutex<Vec<CreateOrder>>,
    }

    impl MemorySink {
        fn with_existing(order_numbers: &[&str]) -> Self {
            let sink = Self::default();
            sink.taken
                .lock()
                .unwrap()
                .extend(order_numbers.iter().map(|n| n.to_string()));
            sink
        }

        fn created(&self) -> Vec<CreateOrder> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderSink for MemorySink {
        async fn create_order(&self, input: CreateOrder) -> Result<DbId, CoreError> {
            let mut taken = self.taken.lock().unwrap();
            if !taken.insert(input.order_number.clone()) {
                return Err(CoreError::Conflict(format!(
                    "Order number '{}' already exists",
                    input.order_number
                )));
            }
            let mut created = self.created.lock().unwrap();
            created.push(input);
            Ok(created.len() as DbId)
        }
    }

    const HEADERS: [&str; 6] = [
        "Kanban ID",
        "Customer",
        "Sale Part",
        "Order No",
        "Delivery Date",
        "Qty",
    ];

    fn sheet(rows: &[&[&str]]) -> SheetRows {
        let mut all = vec![HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        all.extend(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        );
        SheetRows {
            name: "Sheet3".to_string(),
            first_row: 1,
            rows: all,
        }
    }

    #[tokio::test]
    async fn skips_blank_kanban_and_reports_colliding_row() {
        let sink = MemorySink::with_existing(&["PO-EXISTING"]);
        let rows = sheet(&[
            &["K-1", "Acme", "Bolt", "PO-1", "2024-05-01", "4"],
            &["", "Acme", "Nut", "PO-2", "", "1"],
            &["K-3", "Acme", "Washer", "PO-EXISTING", "", "2"],
        ]);

        let result = import_sheet(&sink, &rows, 9).await.unwrap();

        assert!(result.success);
        assert_eq!(result.imported, 1);
        assert_eq!(result.total, 3);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(
            result.errors,
            vec!["Row 4: Order number 'PO-EXISTING' already exists".to_string()]
        );
        assert_eq!(result.message, "Successfully imported 1 orders from Sheet3");

        let created = sink.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].order_number, "PO-1");
        assert_eq!(created[0].created_by, 9);
    }

    #[tokio::test]
    async fn gaps_are_filled_with_defaults() {
        let sink = MemorySink::default();
        let rows = sheet(&[&["K-7", "", "", "", "", "lots"]]);

        let result = import_sheet(&sink, &rows, 1).await.unwrap();
        assert_eq!(result.imported, 1);

        let order = &sink.created()[0];
        assert_eq!(order.order_number, "ORD-K-7-2");
        assert_eq!(order.customer_name, "Unknown Customer");
        assert_eq!(order.product_name, "Unknown Product");
        assert_eq!(order.quantity, 1);
        assert_eq!(order.delivery_date, None);
        assert_eq!(
            order.notes.as_deref(),
            Some("Imported from Sheet3 - Kanban ID: K-7")
        );
    }

    #[tokio::test]
    async fn repeated_kanban_ids_get_distinct_synthesized_numbers() {
        let sink = MemorySink::default();
        let rows = sheet(&[
            &["K-1", "A", "P", "", "", "1"],
            &["K-1", "A", "P", "", "", "1"],
        ]);

        let result = import_sheet(&sink, &rows, 1).await.unwrap();
        assert_eq!(result.imported, 2);
        assert!(result.errors.is_empty());

        let numbers: Vec<String> = sink.created().into_iter().map(|o| o.order_number).collect();
        assert_eq!(numbers, vec!["ORD-K-1-2", "ORD-K-1-3"]);
    }

    #[tokio::test]
    async fn error_list_is_capped_but_failures_are_counted() {
        let existing: Vec<String> = (0..15).map(|i| format!("PO-{i}")).collect();
        let existing_refs: Vec<&str> = existing.iter().map(String::as_str).collect();
        let sink = MemorySink::with_existing(&existing_refs);

        let data: Vec<Vec<&str>> = existing_refs
            .iter()
            .map(|n| vec!["K", "A", "P", *n, "", "1"])
            .collect();
        let data_refs: Vec<&[&str]> = data.iter().map(Vec::as_slice).collect();

        let result = import_sheet(&sink, &sheet(&data_refs), 1).await.unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.failed, 15);
        assert_eq!(result.errors.len(), 10);
        assert!(result.errors[0].starts_with("Row 2: "));
        assert!(result.success);
    }

    #[tokio::test]
    async fn unresolved_header_aborts_before_any_write() {
        let sink = MemorySink::default();
        let rows = SheetRows {
            name: "Sheet3".to_string(),
            first_row: 1,
            rows: vec![
                vec!["Kanban".into(), "Customer".into(), "Qty".into()],
                vec!["K-1".into(), "Acme".into(), "3".into()],
            ],
        };

        let err = import_sheet(&sink, &rows, 1).await.unwrap_err();
        assert_matches!(
            &err,
            ImportError::MissingColumns { missing, .. }
                if *missing == vec![CanonicalField::SalePart, CanonicalField::OrderNo, CanonicalField::DeliveryDate]
        );
        assert_eq!(
            err.found_headers().unwrap(),
            ["Kanban", "Customer", "Qty"]
        );
        assert!(sink.created().is_empty());
    }

    #[tokio::test]
    async fn reads_the_third_sheet_of_a_workbook() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Cover").unwrap();
        workbook.add_worksheet().set_name("Notes").unwrap();
        let data = workbook.add_worksheet().set_name("Kanban").unwrap();
        for (c, header) in HEADERS.iter().enumerate() {
            data.write_string(0, c as u16, *header).unwrap();
        }
        data.write_string(1, 0, "K-42").unwrap();
        data.write_string(1, 1, "Globex").unwrap();
        data.write_string(1, 2, "Gear").unwrap();
        data.write_string(1, 3, "PO-42").unwrap();
        data.write_number(1, 5, 8.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sink = MemorySink::default();
        let result = import_workbook(&sink, bytes, 3).await.unwrap();

        assert_eq!(result.imported, 1);
        assert_eq!(result.message, "Successfully imported 1 orders from Kanban");
        let order = &sink.created()[0];
        assert_eq!(order.quantity, 8);
        assert_eq!(order.customer_name, "Globex");
    }

    #[tokio::test]
    async fn workbook_without_third_sheet_is_structural() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        let bytes = workbook.save_to_buffer().unwrap();

        let sink = MemorySink::default();
        let err = import_workbook(&sink, bytes, 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Sheet3 not found in file");
    }

    #[tokio::test]
    async fn garbage_payload_is_structural() {
        let sink = MemorySink::default();
        let err = import_workbook(&sink, b"not a spreadsheet".to_vec(), 1)
            .await
            .unwrap_err();
        assert_matches!(err, ImportError::Workbook(_));
    }

    #[test]
    fn internal_failures_do_not_leak_detail() {
        let reason = row_failure_reason(&CoreError::Internal("pool exhausted".into()));
        assert_eq!(reason, "Failed to save order");
    }
}
