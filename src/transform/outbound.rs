// OutboundData and the per-order tables derived from it

use super::calendar::{iso_week_number, month_year, week_start, weekday_index, weekday_name};
use super::derived::{OrderSummaryRow, OrderVelocityCombinationRow, OutboundRow, ProjectOrderNumberRow};
use super::ranges::{LINES_PER_ORDER, UNITS_PER_LINE, UNITS_PER_ORDER};
use super::velocity::{Velocity, VelocityAnalysis};
use super::{surrogate, ItemCatalog, TransformReport};
use crate::inputs::{InputTables, Order};
use crate::options::{DateForAnalysis, TransformOptions};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};

fn analysis_date(order: &Order, choice: DateForAnalysis) -> NaiveDate {
    match choice {
        DateForAnalysis::ReceivedDate => order.received_date,
        DateForAnalysis::PickDate => order.pick_date,
        DateForAnalysis::ShipDate => order.ship_date,
    }
}

/// OrderDetails joined to OrderHeader, in detail order. Velocity is X until
/// `apply_velocity` runs.
pub(crate) fn outbound_rows(
    pn: &str,
    inputs: &InputTables,
    options: &TransformOptions,
    catalog: &ItemCatalog,
    report: &mut TransformReport,
) -> Vec<OutboundRow> {
    let headers: HashMap<&str, &Order> = inputs
        .orders
        .iter()
        .map(|o| (o.order_number.as_str(), o))
        .collect();

    inputs
        .order_lines
        .iter()
        .filter_map(|line| {
            let order = headers.get(line.order_number.as_str())?;
            let date = options
                .weekend_date_rule
                .apply(analysis_date(order, options.date_for_analysis));
            let (line_cube, line_weight) =
                report.measure(catalog.line_measures(&line.sku, &line.uom, line.quantity as f64));

            Some(OutboundRow {
                project_number: pn.to_string(),
                project_number_order_number: surrogate(pn, &line.order_number),
                project_number_sku: surrogate(pn, &line.sku),
                project_number_velocity: surrogate(pn, Velocity::X.as_str()),
                order_number: line.order_number.clone(),
                sku: line.sku.clone(),
                quantity: line.quantity,
                uom: line.uom.clone(),
                business_unit: line.business_unit.clone(),
                ship_container_type: line.ship_container_type.clone(),
                special_handling_codes: line.special_handling_codes.clone(),
                carrier: line.carrier.clone(),
                channel: order.channel.clone(),
                received_date: order.received_date,
                pick_date: order.pick_date,
                ship_date: order.ship_date,
                date,
                weekday: weekday_name(date).to_string(),
                weekday_idx: weekday_index(date),
                week_number: iso_week_number(date),
                week: week_start(date),
                month_year: month_year(date),
                velocity: Velocity::X,
                units_per_line_range: UNITS_PER_LINE.label(line.quantity as f64),
                line_cube,
                line_weight,
            })
        })
        .collect()
}

pub(crate) fn apply_velocity(pn: &str, rows: &mut [OutboundRow], analysis: &VelocityAnalysis) {
    for row in rows.iter_mut() {
        row.velocity = analysis.velocity_of(&row.sku);
        row.project_number_velocity = surrogate(pn, row.velocity.as_str());
    }
}

// ============================================================================
// PER ORDER
// ============================================================================

struct OrderTally<'a> {
    order_number: &'a str,
    date: NaiveDate,
    lines: i64,
    units: i64,
    skus: HashSet<&'a str>,
    velocities: BTreeSet<Velocity>,
}

/// Orders in order of first appearance in OutboundData
fn tally_orders(rows: &[OutboundRow]) -> Vec<OrderTally<'_>> {
    let mut tallies: Vec<OrderTally> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let pos = *positions.entry(row.order_number.as_str()).or_insert_with(|| {
            tallies.push(OrderTally {
                order_number: row.order_number.as_str(),
                date: row.date,
                lines: 0,
                units: 0,
                skus: HashSet::new(),
                velocities: BTreeSet::new(),
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[pos];
        tally.lines += 1;
        tally.units = tally.units.saturating_add(row.quantity);
        tally.skus.insert(row.sku.as_str());
        tally.velocities.insert(row.velocity);
    }
    tallies
}

/// OutboundDataByOrder
pub(crate) fn by_order(pn: &str, rows: &[OutboundRow]) -> Vec<OrderSummaryRow> {
    tally_orders(rows)
        .into_iter()
        .map(|t| OrderSummaryRow {
            project_number: pn.to_string(),
            project_number_order_number: surrogate(pn, t.order_number),
            order_number: t.order_number.to_string(),
            date: t.date,
            weekday: weekday_name(t.date).to_string(),
            weekday_idx: weekday_index(t.date),
            lines: t.lines,
            units: t.units,
            skus: t.skus.len() as i64,
            lines_per_order_range: LINES_PER_ORDER.label(t.lines as f64),
            units_per_order_range: UNITS_PER_ORDER.label(t.units as f64),
        })
        .collect()
}

/// Sorted distinct classes on each order's lines, e.g. "ABD"
pub(crate) fn velocity_combinations(pn: &str, rows: &[OutboundRow]) -> Vec<OrderVelocityCombinationRow> {
    tally_orders(rows)
        .into_iter()
        .map(|t| OrderVelocityCombinationRow {
            project_number: pn.to_string(),
            project_number_order_number: surrogate(pn, t.order_number),
            order_number: t.order_number.to_string(),
            velocity_combination: t.velocities.iter().map(|v| v.as_str()).collect(),
        })
        .collect()
}

/// ProjectNumberOrderNumber over the distinct OrderHeader numbers
pub(crate) fn project_order_numbers(pn: &str, orders: &[Order]) -> Vec<ProjectOrderNumberRow> {
    let mut seen = HashSet::new();
    orders
        .iter()
        .filter(|o| seen.insert(o.order_number.as_str()))
        .map(|o| ProjectOrderNumberRow {
            project_number: pn.to_string(),
            project_number_order_number: surrogate(pn, &o.order_number),
            order_number: o.order_number.clone(),
        })
        .collect()
}
