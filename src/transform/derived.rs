// 📊 Derived tables - row types written to the store
//
// Every row starts with ProjectNumber and carries `{PN}-{key}` surrogates.
// `values()` yields the row in the column order of the matching INSERT.

use crate::inputs::Item;
use crate::loader::TableRow;
use crate::transform::velocity::Velocity;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use serde::Serialize;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn int(v: i64) -> Value {
    Value::Integer(v)
}

fn real(v: f64) -> Value {
    Value::Real(v)
}

fn date(d: NaiveDate) -> Value {
    Value::Text(d.format("%Y-%m-%d").to_string())
}

fn time(t: NaiveTime) -> Value {
    Value::Text(t.format("%H:%M:%S").to_string())
}

fn velocity(v: Velocity) -> Value {
    text(v.as_str())
}

// ============================================================================
// ITEM MASTER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMasterRow {
    pub project_number: String,
    pub project_number_sku: String,
    pub item: Item,
    pub each_cube: f64,
    pub inner_cube: f64,
    pub carton_cube: f64,
    pub pallet_cube: f64,
    pub velocity: Velocity,
    pub lines: i64,
    pub units: i64,
}

impl TableRow for ItemMasterRow {
    fn values(&self) -> Vec<Value> {
        let i = &self.item;
        vec![
            text(&self.project_number),
            text(&self.project_number_sku),
            text(&i.sku),
            text(&i.description),
            text(&i.class),
            text(&i.uom),
            real(i.each.length),
            real(i.each.width),
            real(i.each.height),
            real(i.each.weight),
            int(i.inner_quantity),
            real(i.inner.length),
            real(i.inner.width),
            real(i.inner.height),
            real(i.inner.weight),
            int(i.carton_quantity),
            real(i.carton.length),
            real(i.carton.width),
            real(i.carton.height),
            real(i.carton.weight),
            int(i.pallet_quantity),
            real(i.pallet.length),
            real(i.pallet.width),
            real(i.pallet.height),
            real(i.pallet.weight),
            int(i.pallet_tie),
            int(i.pallet_high),
            text(&i.subwarehouse),
            real(self.each_cube),
            real(self.inner_cube),
            real(self.carton_cube),
            real(self.pallet_cube),
            velocity(self.velocity),
            int(self.lines),
            int(self.units),
        ]
    }
}

// ============================================================================
// INBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundHeaderRow {
    pub project_number: String,
    pub project_number_receipt_number: String,
    pub receipt_number: String,
    pub arrival_date: NaiveDate,
    pub arrival_time: NaiveTime,
    pub expected_date: NaiveDate,
    pub expected_time: NaiveTime,
    pub carrier: String,
    pub mode: String,
    pub weekday: String,
    pub weekday_idx: u32,
    pub week_number: u32,
    pub week: NaiveDate,
    pub lines: i64,
    pub units: f64,
    pub skus: i64,
}

impl TableRow for InboundHeaderRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_receipt_number),
            text(&self.receipt_number),
            date(self.arrival_date),
            time(self.arrival_time),
            date(self.expected_date),
            time(self.expected_time),
            text(&self.carrier),
            text(&self.mode),
            text(&self.weekday),
            int(self.weekday_idx as i64),
            int(self.week_number as i64),
            date(self.week),
            int(self.lines),
            real(self.units),
            int(self.skus),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboundDetailRow {
    pub project_number: String,
    pub project_number_receipt_number: String,
    pub project_number_sku: String,
    pub receipt_number: String,
    pub sku: String,
    pub uom: String,
    pub quantity: f64,
    pub vendor_id: String,
    pub source_point: String,
    pub line_cube: f64,
    pub line_weight: f64,
}

impl TableRow for InboundDetailRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_receipt_number),
            text(&self.project_number_sku),
            text(&self.receipt_number),
            text(&self.sku),
            text(&self.uom),
            real(self.quantity),
            text(&self.vendor_id),
            text(&self.source_point),
            real(self.line_cube),
            real(self.line_weight),
        ]
    }
}

// ============================================================================
// OUTBOUND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundRow {
    pub project_number: String,
    pub project_number_order_number: String,
    pub project_number_sku: String,
    pub project_number_velocity: String,
    pub order_number: String,
    pub sku: String,
    pub quantity: i64,
    pub uom: String,
    pub business_unit: String,
    pub ship_container_type: String,
    pub special_handling_codes: String,
    pub carrier: String,
    pub channel: String,
    pub received_date: NaiveDate,
    pub pick_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub date: NaiveDate,
    pub weekday: String,
    pub weekday_idx: u32,
    pub week_number: u32,
    pub week: NaiveDate,
    pub month_year: String,
    pub velocity: Velocity,
    pub units_per_line_range: String,
    pub line_cube: f64,
    pub line_weight: f64,
}

impl TableRow for OutboundRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_order_number),
            text(&self.project_number_sku),
            text(&self.project_number_velocity),
            text(&self.order_number),
            text(&self.sku),
            int(self.quantity),
            text(&self.uom),
            text(&self.business_unit),
            text(&self.ship_container_type),
            text(&self.special_handling_codes),
            text(&self.carrier),
            text(&self.channel),
            date(self.received_date),
            date(self.pick_date),
            date(self.ship_date),
            date(self.date),
            text(&self.weekday),
            int(self.weekday_idx as i64),
            int(self.week_number as i64),
            date(self.week),
            text(&self.month_year),
            velocity(self.velocity),
            text(&self.units_per_line_range),
            real(self.line_cube),
            real(self.line_weight),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummaryRow {
    pub project_number: String,
    pub project_number_order_number: String,
    pub order_number: String,
    pub date: NaiveDate,
    pub weekday: String,
    pub weekday_idx: u32,
    pub lines: i64,
    pub units: i64,
    pub skus: i64,
    pub lines_per_order_range: String,
    pub units_per_order_range: String,
}

impl TableRow for OrderSummaryRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_order_number),
            text(&self.order_number),
            date(self.date),
            text(&self.weekday),
            int(self.weekday_idx as i64),
            int(self.lines),
            int(self.units),
            int(self.skus),
            text(&self.lines_per_order_range),
            text(&self.units_per_order_range),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderVelocityCombinationRow {
    pub project_number: String,
    pub project_number_order_number: String,
    pub order_number: String,
    pub velocity_combination: String,
}

impl TableRow for OrderVelocityCombinationRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_order_number),
            text(&self.order_number),
            text(&self.velocity_combination),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectOrderNumberRow {
    pub project_number: String,
    pub project_number_order_number: String,
    pub order_number: String,
}

impl TableRow for ProjectOrderNumberRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_order_number),
            text(&self.order_number),
        ]
    }
}

// ============================================================================
// INVENTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRow {
    pub project_number: String,
    pub project_number_sku: String,
    pub project_number_velocity: String,
    pub period: NaiveDate,
    pub sku: String,
    pub quantity: i64,
    pub uom: String,
    pub location: String,
    pub lot: String,
    pub subwarehouse: String,
    pub velocity: Velocity,
    pub exists_in_outbound: bool,
    pub line_cube: f64,
    pub line_weight: f64,
}

impl TableRow for InventoryRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_sku),
            text(&self.project_number_velocity),
            date(self.period),
            text(&self.sku),
            int(self.quantity),
            text(&self.uom),
            text(&self.location),
            text(&self.lot),
            text(&self.subwarehouse),
            velocity(self.velocity),
            int(self.exists_in_outbound as i64),
            real(self.line_cube),
            real(self.line_weight),
        ]
    }
}

// ============================================================================
// VELOCITY ROLL-UPS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocitySummaryRow {
    pub project_number: String,
    pub project_number_velocity: String,
    pub velocity: Velocity,
    pub active_skus: i64,
    pub lines: i64,
    pub units: i64,
    pub on_hand_skus: i64,
    pub qty_on_hand: i64,
}

impl TableRow for VelocitySummaryRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_velocity),
            velocity(self.velocity),
            int(self.active_skus),
            int(self.lines),
            int(self.units),
            int(self.on_hand_skus),
            int(self.qty_on_hand),
        ]
    }
}

/// Mean, population standard deviation and mean + 1 SD of a daily measure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyStat {
    pub average: f64,
    pub std_dev: f64,
    pub plus_one_std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProfileRow {
    pub project_number: String,
    pub project_number_velocity: String,
    pub velocity: Velocity,
    pub days: i64,
    pub skus: DailyStat,
    pub orders: DailyStat,
    pub lines: DailyStat,
    pub units: DailyStat,
    pub active_skus: i64,
    pub total_lines: i64,
    pub total_units: i64,
}

impl TableRow for DailyProfileRow {
    fn values(&self) -> Vec<Value> {
        let mut values = vec![
            text(&self.project_number),
            text(&self.project_number_velocity),
            velocity(self.velocity),
            int(self.days),
        ];
        let stats = [&self.skus, &self.orders, &self.lines, &self.units];
        values.extend(stats.iter().map(|s| real(s.average)));
        values.extend(stats.iter().map(|s| real(s.std_dev)));
        values.extend(stats.iter().map(|s| real(s.plus_one_std_dev)));
        values.push(int(self.active_skus));
        values.push(int(self.total_lines));
        values.push(int(self.total_units));
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityByMonthRow {
    pub project_number: String,
    pub project_number_sku: String,
    pub sku: String,
    pub month_year: String,
    pub lines: i64,
    pub units: i64,
    pub month_velocity: Velocity,
    pub velocity: Velocity,
    pub equals_overall: i64,
}

impl TableRow for VelocityByMonthRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_sku),
            text(&self.sku),
            text(&self.month_year),
            int(self.lines),
            int(self.units),
            velocity(self.month_velocity),
            velocity(self.velocity),
            int(self.equals_overall),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectVelocityRow {
    pub project_number: String,
    pub project_number_velocity: String,
    pub velocity: Velocity,
}

impl TableRow for ProjectVelocityRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_velocity),
            velocity(self.velocity),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityLadderRow {
    pub project_number: String,
    pub project_number_velocity: String,
    pub pct_lines: f64,
    pub velocity: Velocity,
    pub skus: i64,
    pub lines: i64,
    pub units: i64,
    pub cumulative_skus: i64,
    pub cumulative_lines: i64,
    pub cumulative_units: i64,
    pub pct_skus: f64,
    pub pct_units: f64,
}

impl TableRow for VelocityLadderRow {
    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.project_number),
            text(&self.project_number_velocity),
            real(self.pct_lines),
            velocity(self.velocity),
            int(self.skus),
            int(self.lines),
            int(self.units),
            int(self.cumulative_skus),
            int(self.cumulative_lines),
            int(self.cumulative_units),
            real(self.pct_skus),
            real(self.pct_units),
        ]
    }
}

// ============================================================================
// ALL DERIVED TABLES
// ============================================================================

/// Output of one transform run, owned until the loader finishes
#[derive(Debug, Clone, Default)]
pub struct DerivedTables {
    pub item_master: Vec<ItemMasterRow>,
    pub inbound_header: Vec<InboundHeaderRow>,
    pub inbound_details: Vec<InboundDetailRow>,
    pub outbound_data: Vec<OutboundRow>,
    pub order_velocity_combinations: Vec<OrderVelocityCombinationRow>,
    pub inventory_data: Vec<InventoryRow>,
    pub velocity_summary: Vec<VelocitySummaryRow>,
    pub outbound_by_order: Vec<OrderSummaryRow>,
    pub daily_order_profile: Vec<DailyProfileRow>,
    pub velocity_by_month: Vec<VelocityByMonthRow>,
    pub project_velocity: Vec<ProjectVelocityRow>,
    pub project_order_number: Vec<ProjectOrderNumberRow>,
    pub velocity_ladder: Vec<VelocityLadderRow>,
}
