// 🗂️ Input Registry - file kinds, declared columns, types and defaults
// Single source of truth for the validator, the reader and the transformer

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// COLUMN TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Date,
    Time,
    Int,
    Float,
    String,
}

/// 2^63: floats at or beyond this do not fit an Int cell
const INT_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Default date used for cells that could not be parsed (1900-01-01)
pub fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Default time used for cells that could not be parsed (00:00:00)
pub fn default_time() -> NaiveTime {
    NaiveTime::MIN
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::String => "string",
        }
    }

    /// Value substituted for a missing or unparseable cell
    pub fn default_cell(&self) -> Cell {
        match self {
            ColumnType::Date => Cell::Date(default_date()),
            ColumnType::Time => Cell::Time(default_time()),
            ColumnType::Int => Cell::Int(0),
            ColumnType::Float => Cell::Float(0.0),
            ColumnType::String => Cell::Str(String::new()),
        }
    }

    /// Coerce one raw cell. `None` means "missing" and is replaced by the
    /// type default by the caller.
    pub fn parse(&self, raw: &str) -> Option<Cell> {
        let trimmed = raw.trim();

        match self {
            ColumnType::String => Some(Cell::Str(raw.to_string())),
            _ if trimmed.is_empty() => None,
            ColumnType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(Cell::Date),
            ColumnType::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
                .ok()
                .map(Cell::Time),
            ColumnType::Int => match trimmed.parse::<i64>() {
                Ok(v) => Some(Cell::Int(v)),
                Err(_) => trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && v.abs() < INT_LIMIT)
                    .map(|v| Cell::Int(v.trunc() as i64)),
            },
            ColumnType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Cell::Float),
        }
    }
}

// ============================================================================
// CELL VALUES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Date(NaiveDate),
    Time(NaiveTime),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn as_date(&self) -> NaiveDate {
        match self {
            Cell::Date(d) => *d,
            _ => default_date(),
        }
    }

    pub fn as_time(&self) -> NaiveTime {
        match self {
            Cell::Time(t) => *t,
            _ => default_time(),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Cell::Int(v) => *v,
            Cell::Float(v) => v.trunc() as i64,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Cell::Float(v) => *v,
            Cell::Int(v) => *v as f64,
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cell::Str(s) => s,
            _ => "",
        }
    }

    /// Render back to the textual form the reader accepts
    pub fn render(&self) -> String {
        match self {
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Time(t) => t.format("%H:%M:%S").to_string(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Str(s) => s.clone(),
        }
    }
}

// ============================================================================
// FILE KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    ItemMaster,
    InboundHeader,
    InboundDetails,
    Inventory,
    OrderHeader,
    OrderDetails,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
}

const fn req(name: &'static str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec { name, column_type, required: true }
}

const fn opt(name: &'static str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec { name, column_type, required: false }
}

use ColumnType::{Date, Float, Int, String as Text, Time};

const ITEM_MASTER: &[ColumnSpec] = &[
    req("SKU", Text),
    req("Description", Text),
    opt("Class", Text),
    req("UoM", Text),
    req("EachLength", Float),
    req("EachWidth", Float),
    req("EachHeight", Float),
    req("EachWeight", Float),
    opt("InnerQuantity", Int),
    opt("InnerLength", Float),
    opt("InnerWidth", Float),
    opt("InnerHeight", Float),
    opt("InnerWeight", Float),
    opt("CartonQuantity", Int),
    opt("CartonLength", Float),
    opt("CartonWidth", Float),
    opt("CartonHeight", Float),
    opt("CartonWeight", Float),
    opt("PalletQuantity", Int),
    opt("PalletLength", Float),
    opt("PalletWidth", Float),
    opt("PalletHeight", Float),
    opt("PalletWeight", Float),
    opt("PalletTie", Int),
    opt("PalletHigh", Int),
    opt("Subwarehouse", Text),
];

const INBOUND_HEADER: &[ColumnSpec] = &[
    req("ReceiptNumber", Text),
    req("ArrivalDate", Date),
    opt("ArrivalTime", Time),
    opt("ExpectedDate", Date),
    opt("ExpectedTime", Time),
    opt("Carrier", Text),
    opt("Mode", Text),
];

const INBOUND_DETAILS: &[ColumnSpec] = &[
    req("ReceiptNumber", Text),
    req("SKU", Text),
    req("UoM", Text),
    req("Quantity", Float),
    opt("VendorID", Text),
    opt("SourcePoint", Text),
];

const INVENTORY: &[ColumnSpec] = &[
    req("Period", Date),
    req("SKU", Text),
    req("Quantity", Int),
    req("UoM", Text),
    opt("Location", Text),
    opt("Lot", Text),
    opt("Subwarehouse", Text),
];

const ORDER_HEADER: &[ColumnSpec] = &[
    req("OrderNumber", Text),
    req("ReceivedDate", Date),
    req("PickDate", Date),
    req("ShipDate", Date),
    opt("Channel", Text),
];

const ORDER_DETAILS: &[ColumnSpec] = &[
    req("OrderNumber", Text),
    req("SKU", Text),
    req("Quantity", Int),
    req("UoM", Text),
    opt("BusinessUnit", Text),
    opt("ShipContainerType", Text),
    opt("SpecialHandlingCodes", Text),
    opt("Carrier", Text),
];

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::ItemMaster,
        FileKind::InboundHeader,
        FileKind::InboundDetails,
        FileKind::Inventory,
        FileKind::OrderHeader,
        FileKind::OrderDetails,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FileKind::ItemMaster => "ItemMaster",
            FileKind::InboundHeader => "InboundHeader",
            FileKind::InboundDetails => "InboundDetails",
            FileKind::Inventory => "Inventory",
            FileKind::OrderHeader => "OrderHeader",
            FileKind::OrderDetails => "OrderDetails",
        }
    }

    /// File name expected inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            FileKind::ItemMaster => "ItemMaster.csv",
            FileKind::InboundHeader => "InboundHeader.csv",
            FileKind::InboundDetails => "InboundDetails.csv",
            FileKind::Inventory => "Inventory.csv",
            FileKind::OrderHeader => "OrderHeader.csv",
            FileKind::OrderDetails => "OrderDetails.csv",
        }
    }

    /// Prefix of the stable error codes (`INVENTORY_MISSING_COLUMNS`, ...)
    pub fn code(&self) -> &'static str {
        match self {
            FileKind::ItemMaster => "ITEM_MASTER",
            FileKind::InboundHeader => "INBOUND_HEADER",
            FileKind::InboundDetails => "INBOUND_DETAILS",
            FileKind::Inventory => "INVENTORY",
            FileKind::OrderHeader => "ORDER_HEADER",
            FileKind::OrderDetails => "ORDER_DETAILS",
        }
    }

    /// Declared columns in canonical order
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            FileKind::ItemMaster => ITEM_MASTER,
            FileKind::InboundHeader => INBOUND_HEADER,
            FileKind::InboundDetails => INBOUND_DETAILS,
            FileKind::Inventory => INVENTORY,
            FileKind::OrderHeader => ORDER_HEADER,
            FileKind::OrderDetails => ORDER_DETAILS,
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    /// Minimum column set a file must provide
    pub fn required_columns(&self) -> Vec<&'static str> {
        self.columns()
            .iter()
            .filter(|c| c.required)
            .map(|c| c.name)
            .collect()
    }

    /// Primary-key column for the kinds that have a single-column key
    pub fn primary_key(&self) -> Option<&'static str> {
        match self {
            FileKind::ItemMaster => Some("SKU"),
            FileKind::InboundHeader => Some("ReceiptNumber"),
            FileKind::OrderHeader => Some("OrderNumber"),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TESTS
// ============================================================================
