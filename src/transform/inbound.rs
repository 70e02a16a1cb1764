// InboundHeader' / InboundDetails'

use super::calendar::{iso_week_number, week_start, weekday_index, weekday_name};
use super::derived::{InboundDetailRow, InboundHeaderRow};
use super::{surrogate, ItemCatalog, TransformReport};
use crate::inputs::InputTables;
use crate::options::TransformOptions;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct ReceiptTally<'a> {
    lines: i64,
    units: f64,
    skus: HashSet<&'a str>,
}

pub(crate) fn inbound_rows(
    pn: &str,
    inputs: &InputTables,
    options: &TransformOptions,
    catalog: &ItemCatalog,
    report: &mut TransformReport,
) -> (Vec<InboundHeaderRow>, Vec<InboundDetailRow>) {
    let mut tallies: HashMap<&str, ReceiptTally> = HashMap::new();
    let mut details = Vec::with_capacity(inputs.receipt_lines.len());

    for line in &inputs.receipt_lines {
        let tally = tallies.entry(line.receipt_number.as_str()).or_default();
        tally.lines += 1;
        tally.units += line.quantity;
        tally.skus.insert(line.sku.as_str());

        let (line_cube, line_weight) =
            report.measure(catalog.line_measures(&line.sku, &line.uom, line.quantity));
        details.push(InboundDetailRow {
            project_number: pn.to_string(),
            project_number_receipt_number: surrogate(pn, &line.receipt_number),
            project_number_sku: surrogate(pn, &line.sku),
            receipt_number: line.receipt_number.clone(),
            sku: line.sku.clone(),
            uom: line.uom.clone(),
            quantity: line.quantity,
            vendor_id: line.vendor_id.clone(),
            source_point: line.source_point.clone(),
            line_cube,
            line_weight,
        });
    }

    let headers = inputs
        .receipts
        .iter()
        .map(|receipt| {
            let arrival = options.weekend_date_rule.apply(receipt.arrival_date);
            let tally = tallies.get(receipt.receipt_number.as_str());
            InboundHeaderRow {
                project_number: pn.to_string(),
                project_number_receipt_number: surrogate(pn, &receipt.receipt_number),
                receipt_number: receipt.receipt_number.clone(),
                arrival_date: arrival,
                arrival_time: receipt.arrival_time,
                expected_date: receipt.expected_date,
                expected_time: receipt.expected_time,
                carrier: receipt.carrier.clone(),
                mode: receipt.mode.clone(),
                weekday: weekday_name(arrival).to_string(),
                weekday_idx: weekday_index(arrival),
                week_number: iso_week_number(arrival),
                week: week_start(arrival),
                lines: tally.map(|t| t.lines).unwrap_or(0),
                units: tally.map(|t| t.units).unwrap_or(0.0),
                skus: tally.map(|t| t.skus.len() as i64).unwrap_or(0),
            }
        })
        .collect();

    (headers, details)
}
