//! Spreadsheet payload reading.
//!
//! The whole workbook is parsed in memory (xlsx, xlsm, xlsb, xls and ods are
//! detected automatically) and one sheet is flattened into rows of display
//! text. Upload size limits are enforced by the HTTP layer.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::importer::ImportError;

/// One sheet flattened to text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRows {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Spreadsheet row number of `rows[0]` (1-based).
    pub first_row: usize,
    /// Rectangular cell grid; empty cells are empty strings.
    pub rows: Vec<Vec<String>>,
}

impl SheetRows {
    /// The header row (first used row of the sheet).
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows below the header, paired with their spreadsheet row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(move |(offset, row)| (self.first_row + offset, row.as_slice()))
    }

    /// Number of rows below the header.
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// Read the sheet at `index` (zero-based, by position rather than name).
///
/// Fails when the payload is not a workbook, the position does not exist,
/// or the sheet lacks a header plus at least one data row.
pub fn read_sheet(bytes: &[u8], index: usize) -> Result<SheetRows, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let name = workbook
        .sheet_names()
        .get(index)
        .cloned()
        .ok_or(ImportError::SheetMissing { index })?;

    let range = workbook
        .worksheet_range_at(index)
        .ok_or(ImportError::SheetMissing { index })?
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let first_row = range
        .start()
        .map(|(row, _)| row as usize + 1)
        .unwrap_or(1);

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    if rows.len() < 2 {
        return Err(ImportError::SheetEmpty { name });
    }

    Ok(SheetRows {
        name,
        first_row,
        rows,
    })
}

/// Display text of a cell. Whole-number floats render without a fraction.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_xlsxwriter::Workbook;

    /// Build an xlsx with `sheet_count` sheets; `rows` go on the last one.
    fn xlsx(sheet_count: usize, rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        for idx in 0..sheet_count {
            let sheet = workbook.add_worksheet();
            if idx + 1 == sheet_count {
                for (r, row) in rows.iter().enumerate() {
                    for (c, value) in row.iter().enumerate() {
                        if !value.is_empty() {
                            sheet.write_string(r as u32, c as u16, *value).unwrap();
                        }
                    }
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_third_sheet_by_position() {
        let bytes = xlsx(3, &[&["Kanban", "Qty"], &["K-1", "4"], &["K-2", "9"]]);
        let sheet = read_sheet(&bytes, 2).unwrap();

        assert_eq!(sheet.name, "Sheet3");
        assert_eq!(sheet.headers(), ["Kanban", "Qty"]);
        assert_eq!(sheet.data_row_count(), 2);

        let data: Vec<(usize, Vec<String>)> = sheet
            .data_rows()
            .map(|(n, row)| (n, row.to_vec()))
            .collect();
        assert_eq!(data[0], (2, vec!["K-1".to_string(), "4".to_string()]));
        assert_eq!(data[1].0, 3);
    }

    #[test]
    fn numeric_cells_render_without_fraction() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        workbook.add_worksheet();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Qty").unwrap();
        sheet.write_number(1, 0, 12.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = read_sheet(&bytes, 2).unwrap();
        assert_eq!(sheet.rows[1][0], "12");
    }

    #[test]
    fn empty_cells_become_empty_strings() {
        let bytes = xlsx(3, &[&["A", "B", "C"], &["x", "", "z"]]);
        let sheet = read_sheet(&bytes, 2).unwrap();
        assert_eq!(sheet.rows[1], vec!["x", "", "z"]);
    }

    #[test]
    fn missing_sheet_position_is_structural() {
        let bytes = xlsx(2, &[&["A"], &["1"]]);
        assert_matches!(
            read_sheet(&bytes, 2),
            Err(ImportError::SheetMissing { index: 2 })
        );
    }

    #[test]
    fn header_only_sheet_is_empty() {
        let bytes = xlsx(3, &[&["Kanban", "Qty"]]);
        assert_matches!(
            read_sheet(&bytes, 2),
            Err(ImportError::SheetEmpty { name }) if name == "Sheet3"
        );
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert_matches!(
            read_sheet(b"definitely not a spreadsheet", 2),
            Err(ImportError::Workbook(_))
        );
    }
}
