// 📦 Typed input tables
// Cleansed CSV rows turned into records, one struct per input file kind

use crate::error::{Error, Result};
use crate::options::TransformOptions;
use crate::reader::{read_and_cleanse, CleansedTable, RowView};
use crate::registry::FileKind;
use crate::runlog::RunLog;
use crate::transform::round2;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Cubic inches per cubic foot
const CUBIC_INCHES_PER_FOOT: f64 = 1728.0;

// ============================================================================
// UNIT OF MEASURE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOfMeasure {
    Each,
    Inner,
    Carton,
    Pallet,
}

impl UnitOfMeasure {
    /// Case-insensitive match on the usual spellings; `None` if unknown
    pub fn parse(raw: &str) -> Option<UnitOfMeasure> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "each" | "ea" | "eaches" => Some(UnitOfMeasure::Each),
            "inner" | "in" | "ip" => Some(UnitOfMeasure::Inner),
            "carton" | "case" | "cs" | "ctn" => Some(UnitOfMeasure::Carton),
            "pallet" | "plt" | "pl" => Some(UnitOfMeasure::Pallet),
            _ => None,
        }
    }
}

// ============================================================================
// ITEM MASTER
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

impl Dimensions {
    /// Cubic feet from inch dimensions, 2 decimals
    pub fn cube(&self) -> f64 {
        round2(self.length * self.width * self.height / CUBIC_INCHES_PER_FOOT)
    }

    fn from_row(row: &RowView, prefix: &str) -> Dimensions {
        Dimensions {
            length: row.float(&format!("{}Length", prefix)),
            width: row.float(&format!("{}Width", prefix)),
            height: row.float(&format!("{}Height", prefix)),
            weight: row.float(&format!("{}Weight", prefix)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Item {
    pub sku: String,
    pub description: String,
    pub class: String,
    pub uom: String,
    pub each: Dimensions,
    pub inner_quantity: i64,
    pub inner: Dimensions,
    pub carton_quantity: i64,
    pub carton: Dimensions,
    pub pallet_quantity: i64,
    pub pallet: Dimensions,
    pub pallet_tie: i64,
    pub pallet_high: i64,
    pub subwarehouse: String,
}

impl Item {
    pub fn dimensions(&self, uom: UnitOfMeasure) -> &Dimensions {
        match uom {
            UnitOfMeasure::Each => &self.each,
            UnitOfMeasure::Inner => &self.inner,
            UnitOfMeasure::Carton => &self.carton,
            UnitOfMeasure::Pallet => &self.pallet,
        }
    }
}

// ============================================================================
// INBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub arrival_date: NaiveDate,
    pub arrival_time: NaiveTime,
    pub expected_date: NaiveDate,
    pub expected_time: NaiveTime,
    pub carrier: String,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptLine {
    pub receipt_number: String,
    pub sku: String,
    pub uom: String,
    pub quantity: f64,
    pub vendor_id: String,
    pub source_point: String,
}

// ============================================================================
// INVENTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLine {
    pub period: NaiveDate,
    pub sku: String,
    pub quantity: i64,
    pub uom: String,
    pub location: String,
    pub lot: String,
    pub subwarehouse: String,
}

// ============================================================================
// OUTBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_number: String,
    pub received_date: NaiveDate,
    pub pick_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub order_number: String,
    pub sku: String,
    pub quantity: i64,
    pub uom: String,
    pub business_unit: String,
    pub ship_container_type: String,
    pub special_handling_codes: String,
    pub carrier: String,
}

// ============================================================================
// ROW CONVERSION
// ============================================================================

/// Build a typed record from a cleansed row
pub trait FromRow: Sized {
    const KIND: FileKind;

    fn from_row(row: &RowView) -> Self;

    fn from_table(table: &CleansedTable) -> Vec<Self> {
        table.rows().map(|row| Self::from_row(&row)).collect()
    }
}

impl FromRow for Item {
    const KIND: FileKind = FileKind::ItemMaster;

    fn from_row(row: &RowView) -> Self {
        Item {
            sku: row.string("SKU"),
            description: row.string("Description"),
            class: row.string("Class"),
            uom: row.string("UoM"),
            each: Dimensions::from_row(row, "Each"),
            inner_quantity: row.int("InnerQuantity"),
            inner: Dimensions::from_row(row, "Inner"),
            carton_quantity: row.int("CartonQuantity"),
            carton: Dimensions::from_row(row, "Carton"),
            pallet_quantity: row.int("PalletQuantity"),
            pallet: Dimensions::from_row(row, "Pallet"),
            pallet_tie: row.int("PalletTie"),
            pallet_high: row.int("PalletHigh"),
            subwarehouse: row.string("Subwarehouse"),
        }
    }
}

impl FromRow for Receipt {
    const KIND: FileKind = FileKind::InboundHeader;

    fn from_row(row: &RowView) -> Self {
        Receipt {
            receipt_number: row.string("ReceiptNumber"),
            arrival_date: row.date("ArrivalDate"),
            arrival_time: row.time("ArrivalTime"),
            expected_date: row.date("ExpectedDate"),
            expected_time: row.time("ExpectedTime"),
            carrier: row.string("Carrier"),
            mode: row.string("Mode"),
        }
    }
}

impl FromRow for ReceiptLine {
    const KIND: FileKind = FileKind::InboundDetails;

    fn from_row(row: &RowView) -> Self {
        ReceiptLine {
            receipt_number: row.string("ReceiptNumber"),
            sku: row.string("SKU"),
            uom: row.string("UoM"),
            quantity: row.float("Quantity"),
            vendor_id: row.string("VendorID"),
            source_point: row.string("SourcePoint"),
        }
    }
}

impl FromRow for InventoryLine {
    const KIND: FileKind = FileKind::Inventory;

    fn from_row(row: &RowView) -> Self {
        InventoryLine {
            period: row.date("Period"),
            sku: row.string("SKU"),
            quantity: row.int("Quantity"),
            uom: row.string("UoM"),
            location: row.string("Location"),
            lot: row.string("Lot"),
            subwarehouse: row.string("Subwarehouse"),
        }
    }
}

impl FromRow for Order {
    const KIND: FileKind = FileKind::OrderHeader;

    fn from_row(row: &RowView) -> Self {
        Order {
            order_number: row.string("OrderNumber"),
            received_date: row.date("ReceivedDate"),
            pick_date: row.date("PickDate"),
            ship_date: row.date("ShipDate"),
            channel: row.string("Channel"),
        }
    }
}

impl FromRow for OrderLine {
    const KIND: FileKind = FileKind::OrderDetails;

    fn from_row(row: &RowView) -> Self {
        OrderLine {
            order_number: row.string("OrderNumber"),
            sku: row.string("SKU"),
            quantity: row.int("Quantity"),
            uom: row.string("UoM"),
            business_unit: row.string("BusinessUnit"),
            ship_container_type: row.string("ShipContainerType"),
            special_handling_codes: row.string("SpecialHandlingCodes"),
            carrier: row.string("Carrier"),
        }
    }
}

// ============================================================================
// INPUT TABLES
// ============================================================================

/// The six cleansed inputs; tables switched off by the options stay empty
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub items: Vec<Item>,
    pub receipts: Vec<Receipt>,
    pub receipt_lines: Vec<ReceiptLine>,
    pub inventory: Vec<InventoryLine>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<OrderLine>,
}

fn load_kind<T: FromRow>(directory: &Path, log: &mut RunLog) -> Result<Vec<T>> {
    let kind = T::KIND;
    let path = directory.join(kind.file_name());
    let (table, report) = read_and_cleanse(&path, kind)?;

    log.line(format!("{}: {} rows read", kind.file_name(), report.rows));
    for (column, replaced) in report.replacements.iter().filter(|(_, n)| *n > 0) {
        log.line(format!("  {}.{}: {} value(s) replaced with default", kind, column, replaced));
    }
    if !report.absent_columns.is_empty() {
        log.line(format!(
            "  {}: optional columns absent: {}",
            kind,
            report.absent_columns.join(", ")
        ));
    }
    info!(
        file = %kind,
        rows = report.rows,
        replaced = report.total_replacements(),
        "input cleansed"
    );

    if !report.errors.is_empty() {
        for error in &report.errors {
            log.line(format!("  {} coercion error: {}", kind, error));
        }
        return Err(Error::CoercionError {
            kind,
            columns: report.error_columns(),
        });
    }

    Ok(T::from_table(&table))
}

impl InputTables {
    /// Read and cleanse every file the options ask for
    pub fn load(directory: &Path, options: &TransformOptions, log: &mut RunLog) -> Result<InputTables> {
        let mut tables = InputTables {
            items: load_kind(directory, log)?,
            ..InputTables::default()
        };

        if options.is_active(FileKind::InboundHeader) {
            tables.receipts = load_kind(directory, log)?;
            tables.receipt_lines = load_kind(directory, log)?;
        }
        if options.is_active(FileKind::Inventory) {
            tables.inventory = load_kind(directory, log)?;
        }
        if options.is_active(FileKind::OrderHeader) {
            tables.orders = load_kind(directory, log)?;
            tables.order_lines = load_kind(directory, log)?;
        }

        log.flush();
        Ok(tables)
    }
}

// ============================================================================
// TESTS
// ============================================================================
