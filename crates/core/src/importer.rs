//! Core types, constants, and pure logic for the spreadsheet order importer.
//!
//! This module has no I/O. It provides:
//!
//! - The Schema Resolver: an ordered list of [`ColumnRule`]s that maps fuzzy
//!   header text onto the six [`CanonicalField`]s, producing a [`ColumnMapping`].
//! - The Row Normalizer: [`normalize_row`] turns one data row into a
//!   [`NormalizedOrder`] or a [`RowOutcome::Skip`]. It never fails.
//! - [`ImportBatchResult`], the per-request summary returned to the caller.
//! - [`ImportError`], the batch-level structural failures.

use serde::Serialize;

use crate::orders::{OrderPriority, OrderStatus};
use crate::types::DbId;

// ── Constants ────────────────────────────────────────────────────────

/// Zero-based position of the sheet holding importable rows.
pub const TARGET_SHEET_INDEX: usize = 2;

/// Upper bound on the number of row failures echoed back to the caller.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Placeholder used when a row has no customer.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Placeholder used when a row has no product / sale part.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Prefix of order numbers synthesized for rows without one.
pub const SYNTHETIC_ORDER_PREFIX: &str = "ORD";

/// Quantity used when the source cell is missing or unparsable.
pub const FALLBACK_QUANTITY: i32 = 1;

// ── Canonical fields ─────────────────────────────────────────────────

/// The six semantic columns every import sheet must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    KanbanId,
    Customer,
    SalePart,
    OrderNo,
    DeliveryDate,
    Qty,
}

impl CanonicalField {
    /// All fields, in resolution priority order.
    pub const ALL: [CanonicalField; 6] = [
        Self::KanbanId,
        Self::Customer,
        Self::SalePart,
        Self::OrderNo,
        Self::DeliveryDate,
        Self::Qty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KanbanId => "kanbanId",
            Self::Customer => "customer",
            Self::SalePart => "salePart",
            Self::OrderNo => "orderNo",
            Self::DeliveryDate => "deliveryDate",
            Self::Qty => "qty",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::KanbanId => 0,
            Self::Customer => 1,
            Self::SalePart => 2,
            Self::OrderNo => 3,
            Self::DeliveryDate => 4,
            Self::Qty => 5,
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Schema Resolver ──────────────────────────────────────────────────

/// A single header-matching rule: the header claims `field` when its
/// normalized text contains any of `needles`.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub field: CanonicalField,
    pub needles: &'static [&'static str],
}

impl ColumnRule {
    /// `header` must already be lower-cased and trimmed.
    pub fn matches(&self, header: &str) -> bool {
        self.needles.iter().any(|needle| header.contains(needle))
    }
}

/// The fixed rule list, highest priority first.
pub const DEFAULT_COLUMN_RULES: [ColumnRule; 6] = [
    ColumnRule {
        field: CanonicalField::KanbanId,
        needles: &["kanban", "id"],
    },
    ColumnRule {
        field: CanonicalField::Customer,
        needles: &["customer"],
    },
    ColumnRule {
        field: CanonicalField::SalePart,
        needles: &["sale", "part"],
    },
    ColumnRule {
        field: CanonicalField::OrderNo,
        needles: &["order", "no"],
    },
    ColumnRule {
        field: CanonicalField::DeliveryDate,
        needles: &["delivery", "date"],
    },
    ColumnRule {
        field: CanonicalField::Qty,
        needles: &["qty", "quantity"],
    },
];

/// Source-column position for each canonical field of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    positions: [Option<usize>; 6],
}

impl ColumnMapping {
    /// Column index resolved for `field`, if any.
    pub fn position(&self, field: CanonicalField) -> Option<usize> {
        self.positions[field.slot()]
    }

    fn claim(&mut self, field: CanonicalField, column: usize) {
        self.positions[field.slot()] = Some(column);
    }

    /// Fields left unresolved, in priority order.
    pub fn missing(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|field| self.position(*field).is_none())
            .collect()
    }

    /// Trimmed text of `field` in `row`; empty when the cell is absent.
    pub fn cell<'a>(&self, row: &'a [String], field: CanonicalField) -> &'a str {
        self.position(field)
            .and_then(|idx| row.get(idx))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }
}

/// Map header cells to canonical fields.
///
/// Headers are scanned left to right. Each header is lower-cased, trimmed and
/// offered to the rules in priority order, skipping rules whose field is
/// already claimed; the first remaining rule that matches claims the column.
/// A header that matches nothing unclaimed is ignored.
pub fn resolve_columns(headers: &[String], rules: &[ColumnRule]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for (column, header) in headers.iter().enumerate() {
        let text = header.trim().to_lowercase();
        if text.is_empty() {
            continue;
        }
        let claimed = rules
            .iter()
            .filter(|rule| mapping.position(rule.field).is_none())
            .find(|rule| rule.matches(&text));
        if let Some(rule) = claimed {
            mapping.claim(rule.field, column);
        }
    }

    mapping
}

/// Resolve the header row and insist on a complete mapping.
pub fn resolve_schema(headers: &[String]) -> Result<ColumnMapping, ImportError> {
    let mapping = resolve_columns(headers, &DEFAULT_COLUMN_RULES);
    let missing = mapping.missing();
    if missing.is_empty() {
        Ok(mapping)
    } else {
        Err(ImportError::MissingColumns {
            missing,
            found_headers: headers.to_vec(),
        })
    }
}

// ── Row Normalizer ───────────────────────────────────────────────────

/// An order creation payload derived from one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrder {
    pub order_number: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i32,
    pub delivery_date: Option<String>,
    pub kanban_id: String,
    pub priority: OrderPriority,
    pub status: OrderStatus,
    pub notes: String,
    pub created_by: DbId,
}

/// What the normalizer decided for a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// No kanban id: a structurally empty row.
    Skip,
    Order(NormalizedOrder),
}

/// Per-row context supplied by the batch processor.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Name of the sheet the row came from (used in provenance notes).
    pub sheet_name: &'a str,
    /// Spreadsheet row number, header row = 1.
    pub row_number: usize,
    /// The importing user.
    pub actor: DbId,
}

/// Turn a data row into an order payload, filling every gap with a default.
pub fn normalize_row(row: &[String], mapping: &ColumnMapping, ctx: &RowContext<'_>) -> RowOutcome {
    let kanban_id = mapping.cell(row, CanonicalField::KanbanId);
    if kanban_id.is_empty() {
        return RowOutcome::Skip;
    }

    let order_number = match mapping.cell(row, CanonicalField::OrderNo) {
        "" => synthesize_order_number(kanban_id, ctx.row_number),
        given => given.to_string(),
    };

    let delivery_date = match mapping.cell(row, CanonicalField::DeliveryDate) {
        "" => None,
        date => Some(date.to_string()),
    };

    RowOutcome::Order(NormalizedOrder {
        order_number,
        customer_name: non_empty_or(mapping.cell(row, CanonicalField::Customer), UNKNOWN_CUSTOMER),
        product_name: non_empty_or(mapping.cell(row, CanonicalField::SalePart), UNKNOWN_PRODUCT),
        quantity: parse_quantity(mapping.cell(row, CanonicalField::Qty)),
        delivery_date,
        kanban_id: kanban_id.to_string(),
        priority: OrderPriority::default(),
        status: OrderStatus::default(),
        notes: format!("Imported from {} - Kanban ID: {kanban_id}", ctx.sheet_name),
        created_by: ctx.actor,
    })
}

/// Order number for a row that has none. The spreadsheet row number keeps
/// it unique within the batch even when kanban ids repeat.
pub fn synthesize_order_number(kanban_id: &str, row_number: usize) -> String {
    format!("{SYNTHETIC_ORDER_PREFIX}-{kanban_id}-{row_number}")
}

/// Parse the leading integer of a quantity cell.
///
/// `"12"`, `"12 pcs"` and `"12.9"` all give 12. Anything without a leading
/// integer, or a non-positive value, gives [`FALLBACK_QUANTITY`].
pub fn parse_quantity(raw: &str) -> i32 {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i32>() {
        Ok(value) if sign * value > 0 => value,
        _ => FALLBACK_QUANTITY,
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

// ── Batch result ─────────────────────────────────────────────────────

/// Summary of one import request.
///
/// `total` counts every data row below the header, skipped rows included.
/// `errors` keeps at most [`MAX_REPORTED_ERRORS`] entries; `failed` holds the
/// true count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportBatchResult {
    pub success: bool,
    pub imported: usize,
    pub total: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub message: String,
}

impl ImportBatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_imported(&mut self) {
        self.imported += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, row_number: usize, reason: impl std::fmt::Display) {
        self.failed += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(format!("Row {row_number}: {reason}"));
        }
    }

    /// Seal the result once every row has been processed.
    pub fn finish(mut self, sheet_name: &str) -> Self {
        self.success = true;
        self.message = format!(
            "Successfully imported {} orders from {sheet_name}",
            self.imported
        );
        self
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Batch-level failures. Any of these aborts the import before a row is
/// written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Sheet{} not found in file", .index + 1)]
    SheetMissing { index: usize },

    #[error("{name} is empty or invalid")]
    SheetEmpty { name: String },

    #[error("Missing required columns: {}", join_fields(.missing))]
    MissingColumns {
        missing: Vec<CanonicalField>,
        found_headers: Vec<String>,
    },
}

impl ImportError {
    /// The header row actually encountered, when the schema was rejected.
    pub fn found_headers(&self) -> Option<&[String]> {
        match self {
            Self::MissingColumns { found_headers, .. } => Some(found_headers),
            _ => None,
        }
    }
}

fn join_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(CanonicalField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ────────────────────────────────────────────────────────────
