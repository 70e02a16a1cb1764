// 🔄 Transformer - cleansed inputs to the derived tables
//
// Pure: no I/O, no store. Everything here is recomputed from InputTables and
// the options, keyed under one project number.

pub mod calendar;
pub mod derived;
mod inbound;
mod inventory;
mod items;
mod outbound;
pub mod ranges;
mod summary;
pub mod velocity;

pub use derived::*;
pub use velocity::{SkuVelocity, Velocity, VelocityAnalysis};

use crate::inputs::{InputTables, Item, UnitOfMeasure};
use crate::options::TransformOptions;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `{project_number}-{natural_key}`
pub fn surrogate(project_number: &str, key: &str) -> String {
    format!("{}-{}", project_number, key)
}

// ============================================================================
// ITEM LOOKUP
// ============================================================================

/// ItemMaster indexed by SKU for per-line cube and weight
pub(crate) struct ItemCatalog<'a> {
    items: HashMap<&'a str, &'a Item>,
}

impl<'a> ItemCatalog<'a> {
    pub(crate) fn new(items: &'a [Item]) -> ItemCatalog<'a> {
        ItemCatalog {
            items: items.iter().map(|i| (i.sku.as_str(), i)).collect(),
        }
    }

    /// `(LineCube, LineWeight)` for `quantity` units of `uom`; `None` when
    /// the UoM is not recognised or the SKU is unknown.
    pub(crate) fn line_measures(&self, sku: &str, uom: &str, quantity: f64) -> Option<(f64, f64)> {
        let item = self.items.get(sku)?;
        let dims = item.dimensions(UnitOfMeasure::parse(uom)?);
        Some((round2(dims.cube() * quantity), round2(dims.weight * quantity)))
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Counters gathered while deriving, for the run log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    /// Lines whose UoM could not be matched; their cube and weight are 0
    pub unmeasured_lines: usize,
    pub active_skus: usize,
    pub total_lines: i64,
    pub months: usize,
}

impl TransformReport {
    pub(crate) fn measure(&mut self, measured: Option<(f64, f64)>) -> (f64, f64) {
        match measured {
            Some(m) => m,
            None => {
                self.unmeasured_lines += 1;
                (0.0, 0.0)
            }
        }
    }
}

/// Build every derived table for `project_number`
pub fn transform(
    project_number: &str,
    inputs: &InputTables,
    options: &TransformOptions,
) -> (DerivedTables, TransformReport) {
    let pn = project_number;
    let catalog = ItemCatalog::new(&inputs.items);
    let mut report = TransformReport::default();

    // Outbound first: velocity is computed over the joined lines
    let mut outbound_data = outbound::outbound_rows(pn, inputs, options, &catalog, &mut report);
    let analysis = VelocityAnalysis::from_lines(
        outbound_data
            .iter()
            .map(|r| (r.sku.as_str(), r.quantity)),
    );
    outbound::apply_velocity(pn, &mut outbound_data, &analysis);
    report.active_skus = analysis.skus.len();
    report.total_lines = analysis.total_lines;

    let item_master = items::item_master_rows(pn, &inputs.items, &analysis);
    let (inbound_header, inbound_details) =
        inbound::inbound_rows(pn, inputs, options, &catalog, &mut report);

    let outbound_skus: HashSet<&str> = outbound_data.iter().map(|r| r.sku.as_str()).collect();
    let inventory_data =
        inventory::inventory_rows(pn, &inputs.inventory, &analysis, &outbound_skus, &catalog, &mut report);

    let velocity_summary = summary::velocity_summary(pn, &analysis, &inventory_data);
    let daily_order_profile = summary::daily_profile(pn, &outbound_data, &velocity_summary);
    let velocity_by_month = summary::velocity_by_month(pn, &outbound_data, &analysis);
    report.months = summary::month_count(&outbound_data);

    let tables = DerivedTables {
        outbound_by_order: outbound::by_order(pn, &outbound_data),
        order_velocity_combinations: outbound::velocity_combinations(pn, &outbound_data),
        project_order_number: outbound::project_order_numbers(pn, &inputs.orders),
        project_velocity: summary::project_velocity(pn),
        velocity_ladder: summary::velocity_ladder(pn, &analysis),
        item_master,
        inbound_header,
        inbound_details,
        outbound_data,
        inventory_data,
        velocity_summary,
        daily_order_profile,
        velocity_by_month,
    };

    if report.unmeasured_lines > 0 {
        warn!(
            lines = report.unmeasured_lines,
            "lines with unrecognised UoM get zero cube and weight"
        );
    }
    debug!(
        project = pn,
        active_skus = report.active_skus,
        total_lines = report.total_lines,
        "transform complete"
    );

    (tables, report)
}
