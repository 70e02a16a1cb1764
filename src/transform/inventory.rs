// InventoryData: inventory lines with velocity, outbound flag and cube

use super::derived::InventoryRow;
use super::velocity::VelocityAnalysis;
use super::{surrogate, ItemCatalog, TransformReport};
use crate::inputs::InventoryLine;
use std::collections::HashSet;

pub(crate) fn inventory_rows(
    pn: &str,
    inventory: &[InventoryLine],
    analysis: &VelocityAnalysis,
    outbound_skus: &HashSet<&str>,
    catalog: &ItemCatalog,
    report: &mut TransformReport,
) -> Vec<InventoryRow> {
    inventory
        .iter()
        .map(|line| {
            let velocity = analysis.velocity_of(&line.sku);
            let (line_cube, line_weight) =
                report.measure(catalog.line_measures(&line.sku, &line.uom, line.quantity as f64));
            InventoryRow {
                project_number: pn.to_string(),
                project_number_sku: surrogate(pn, &line.sku),
                project_number_velocity: surrogate(pn, velocity.as_str()),
                period: line.period,
                sku: line.sku.clone(),
                quantity: line.quantity,
                uom: line.uom.clone(),
                location: line.location.clone(),
                lot: line.lot.clone(),
                subwarehouse: line.subwarehouse.clone(),
                velocity,
                exists_in_outbound: outbound_skus.contains(line.sku.as_str()),
                line_cube,
                line_weight,
            }
        })
        .collect()
}
