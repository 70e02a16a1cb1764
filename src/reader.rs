// 🧹 Reader & Cleanser
// Reads a CSV, coerces every declared column to its type, replaces misses
// with type defaults and reindexes to the canonical column order.

use crate::error::{Error, Result};
use crate::registry::{Cell, ColumnType, FileKind};
use chrono::{NaiveDate, NaiveTime};
use csv::ByteRecord;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// RAW TABLE (as read from disk)
// ============================================================================

/// Untyped table: header names plus raw byte cells
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<ByteRecord>,
}

impl RawTable {
    pub fn read(path: &Path, kind: FileKind) -> Result<RawTable> {
        let unreadable = |e: csv::Error| Error::FileUnreadable {
            kind,
            reason: e.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(unreadable)?;

        let headers = reader
            .byte_headers()
            .map_err(unreadable)?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        let rows = reader
            .byte_records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(unreadable)?;

        Ok(RawTable { headers, rows })
    }

    pub fn from_strings(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(|r| ByteRecord::from(r.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// CLEANSED TABLE
// ============================================================================

/// Typed table in canonical column order
#[derive(Debug, Clone, PartialEq)]
pub struct CleansedTable {
    pub kind: FileKind,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl CleansedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |cells| RowView { table: self, cells })
    }

    /// Render back to raw text, e.g. to re-run the cleanser over its own output
    pub fn to_raw(&self) -> RawTable {
        RawTable {
            headers: self.columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| ByteRecord::from(row.iter().map(Cell::render).collect::<Vec<_>>()))
                .collect(),
        }
    }
}

/// Borrowed view of one cleansed row with typed accessors by column name
pub struct RowView<'a> {
    table: &'a CleansedTable,
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    fn cell(&self, column: &str) -> Option<&'a Cell> {
        let cells: &'a [Cell] = self.cells;
        self.table.column_index(column).map(|i| &cells[i])
    }

    pub fn string(&self, column: &str) -> String {
        self.cell(column).map(|c| c.as_str().to_string()).unwrap_or_default()
    }

    pub fn int(&self, column: &str) -> i64 {
        self.cell(column).map(Cell::as_int).unwrap_or(0)
    }

    pub fn float(&self, column: &str) -> f64 {
        self.cell(column).map(Cell::as_float).unwrap_or(0.0)
    }

    pub fn date(&self, column: &str) -> NaiveDate {
        self.cell(column)
            .map(Cell::as_date)
            .unwrap_or_else(crate::registry::default_date)
    }

    pub fn time(&self, column: &str) -> NaiveTime {
        self.cell(column)
            .map(Cell::as_time)
            .unwrap_or_else(crate::registry::default_time)
    }
}

// ============================================================================
// CLEANSE REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanseReport {
    pub rows: usize,
    /// Default replacements per present column, in canonical order
    pub replacements: Vec<(String, usize)>,
    /// Declared columns the file does not carry (filled with defaults)
    pub absent_columns: Vec<String>,
    /// Columns that could not be coerced at all
    pub errors: Vec<String>,
}

impl CleanseReport {
    pub fn total_replacements(&self) -> usize {
        self.replacements.iter().map(|(_, n)| n).sum()
    }

    pub fn error_columns(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| e.split(':').next().unwrap_or(e).to_string())
            .collect()
    }
}

// ============================================================================
// CLEANSE
// ============================================================================

/// Coerce a raw table to the declared schema of `kind`.
///
/// Cell-level misses become type defaults and are counted per column. A
/// column is reported in `errors` only when it cannot be coerced at all
/// (cells that are not text); the table is still returned.
pub fn cleanse(kind: FileKind, raw: &RawTable) -> (CleansedTable, CleanseReport) {
    let specs = kind.columns();
    let positions: Vec<Option<usize>> = specs
        .iter()
        .map(|spec| raw.headers.iter().position(|h| h == spec.name))
        .collect();

    let mut counts = vec![0usize; specs.len()];
    let mut broken = vec![None::<String>; specs.len()];
    let mut rows = Vec::with_capacity(raw.rows.len());

    for (line, record) in raw.rows.iter().enumerate() {
        let mut row = Vec::with_capacity(specs.len());

        for (i, spec) in specs.iter().enumerate() {
            let Some(pos) = positions[i] else {
                row.push(spec.column_type.default_cell());
                continue;
            };

            let bytes = record.get(pos).unwrap_or_default();
            let cell = match std::str::from_utf8(bytes) {
                Ok(text) => coerce(spec.column_type, text, &mut counts[i]),
                Err(e) => {
                    if broken[i].is_none() {
                        broken[i] = Some(format!(
                            "{}: not text at data row {} ({})",
                            spec.name,
                            line + 1,
                            e
                        ));
                    }
                    spec.column_type.default_cell()
                }
            };
            row.push(cell);
        }

        rows.push(row);
    }

    let mut report = CleanseReport {
        rows: rows.len(),
        ..CleanseReport::default()
    };
    for (i, spec) in specs.iter().enumerate() {
        if positions[i].is_none() {
            report.absent_columns.push(spec.name.to_string());
            continue;
        }
        report.replacements.push((spec.name.to_string(), counts[i]));
        if counts[i] > 0 {
            debug!(file = %kind, column = spec.name, replaced = counts[i], "defaults substituted");
        }
    }
    report.errors = broken.into_iter().flatten().collect();
    for error in &report.errors {
        warn!(file = %kind, %error, "column coercion failed");
    }

    let table = CleansedTable {
        kind,
        columns: kind.column_names(),
        rows,
    };

    (table, report)
}

fn coerce(column_type: ColumnType, text: &str, replaced: &mut usize) -> Cell {
    match column_type.parse(text) {
        Some(cell) => cell,
        None => {
            *replaced += 1;
            column_type.default_cell()
        }
    }
}

/// Read and cleanse one input file
pub fn read_and_cleanse(path: &Path, kind: FileKind) -> Result<(CleansedTable, CleanseReport)> {
    let raw = RawTable::read(path, kind)?;
    Ok(cleanse(kind, &raw))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn order_details() -> RawTable {
        RawTable::from_strings(
            &["Quantity", "SKU", "OrderNumber", "UoM", "Unused"],
            &[
                vec!["3", "A", "O1", "Each", "x"],
                vec!["lots", "B", "O1", "Each", "y"],
                vec!["", "C", "O2", "Carton", "z"],
            ],
        )
    }

    #[test]
    fn test_reindexes_to_canonical_order() {
        let (table, report) = cleanse(FileKind::OrderDetails, &order_details());

        assert_eq!(table.columns, FileKind::OrderDetails.column_names());
        assert_eq!(table.rows[0][0], Cell::Str("O1".to_string()));
        assert_eq!(table.rows[0][1], Cell::Str("A".to_string()));
        assert_eq!(table.rows[0][2], Cell::Int(3));
        assert!(report.errors.is_empty());
        assert_eq!(
            report.absent_columns,
            vec!["BusinessUnit", "ShipContainerType", "SpecialHandlingCodes", "Carrier"]
        );
    }

    #[test]
    fn test_counts_replacements_per_column() {
        let (table, report) = cleanse(FileKind::OrderDetails, &order_details());

        assert_eq!(table.rows[1][2], Cell::Int(0));
        assert_eq!(table.rows[2][2], Cell::Int(0));
        let quantity = report
            .replacements
            .iter()
            .find(|(c, _)| c == "Quantity")
            .unwrap();
        assert_eq!(quantity.1, 2);
        assert_eq!(report.total_replacements(), 2);
    }

    #[test]
    fn test_bad_dates_fall_back_to_default() {
        let raw = RawTable::from_strings(
            &["OrderNumber", "ReceivedDate", "PickDate", "ShipDate"],
            &[vec!["O1", "2024-01-02", "01/03/2024", "2024-13-01"]],
        );
        let (table, report) = cleanse(FileKind::OrderHeader, &raw);

        let row = table.rows().next().unwrap();
        assert_eq!(row.date("ReceivedDate"), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(row.date("PickDate"), crate::registry::default_date());
        assert_eq!(row.date("ShipDate"), crate::registry::default_date());
        assert_eq!(report.total_replacements(), 2);
    }

    #[test]
    fn test_cleanse_is_idempotent() {
        let (first, first_report) = cleanse(FileKind::OrderDetails, &order_details());
        let (second, second_report) = cleanse(FileKind::OrderDetails, &first.to_raw());

        assert_eq!(first, second);
        assert_eq!(first_report.total_replacements(), 2);
        assert_eq!(second_report.total_replacements(), 0);
        assert!(second_report.absent_columns.is_empty());
    }

    #[test]
    fn test_non_text_cells_are_column_errors() {
        let mut raw = RawTable::from_strings(&["SKU", "Description"], &[]);
        raw.rows.push(ByteRecord::from(vec![b"A".to_vec(), vec![0xff, 0xfe]]));

        let (table, report) = cleanse(FileKind::ItemMaster, &raw);
        assert_eq!(table.len(), 1);
        assert_eq!(report.error_columns(), vec!["Description".to_string()]);
    }
}
