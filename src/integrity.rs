// 🔗 Cross-file integrity
// Primary keys must be non-empty and unique; detail keys must exist in
// their parent table. First failing check is fatal.

use crate::error::{Error, Result};
use crate::inputs::InputTables;
use crate::registry::FileKind;
use crate::runlog::RunLog;
use std::collections::HashSet;
use tracing::warn;

/// Offending keys written to the run log (and carried in the error) per check
const MAX_REPORTED_KEYS: usize = 10;

/// Keys that are not truthy (empty strings)
pub fn validate_primary_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    keys.into_iter()
        .filter(|k| k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct foreign-key values absent from the primary-key set, in order of
/// first appearance
pub fn check_foreign_keys<'a>(
    pk_set: &HashSet<&str>,
    fk_list: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    fk_list
        .into_iter()
        .filter(|fk| !pk_set.contains(fk) && seen.insert(*fk))
        .map(str::to_string)
        .collect()
}

/// Distinct values that occur more than once, in order of second appearance
pub fn find_duplicate_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    keys.into_iter()
        .filter(|k| !seen.insert(*k) && reported.insert(*k))
        .map(str::to_string)
        .collect()
}

fn first_keys(keys: &[String]) -> Vec<String> {
    keys.iter().take(MAX_REPORTED_KEYS).cloned().collect()
}

fn check_primary_key(check: &str, keys: &[&str], log: &mut RunLog) -> Result<()> {
    let empty = validate_primary_keys(keys.iter().copied());
    if !empty.is_empty() {
        let rows: Vec<String> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.is_empty())
            .map(|(i, _)| format!("<empty at data row {}>", i + 1))
            .collect();
        log.line(format!("{}: {} empty key(s): {}", check, empty.len(), first_keys(&rows).join(", ")));
        warn!(check, count = empty.len(), "empty primary keys");
        return Err(Error::BadPrimaryKey {
            check: check.to_string(),
            keys: first_keys(&rows),
        });
    }

    let duplicates = find_duplicate_keys(keys.iter().copied());
    if !duplicates.is_empty() {
        log.line(format!(
            "{}: {} duplicated key(s): {}",
            check,
            duplicates.len(),
            first_keys(&duplicates).join(", ")
        ));
        warn!(check, count = duplicates.len(), "duplicated primary keys");
        return Err(Error::BadPrimaryKey {
            check: check.to_string(),
            keys: first_keys(&duplicates),
        });
    }

    log.line(format!("{}: {} keys OK", check, keys.len()));
    Ok(())
}

fn check_subset(check: &str, parent: &[&str], children: &[&str], log: &mut RunLog) -> Result<()> {
    let pk_set: HashSet<&str> = parent.iter().copied().collect();
    let missing = check_foreign_keys(&pk_set, children.iter().copied());
    if !missing.is_empty() {
        log.line(format!(
            "{}: {} unknown key(s): {}",
            check,
            missing.len(),
            first_keys(&missing).join(", ")
        ));
        warn!(check, count = missing.len(), "foreign key mismatch");
        return Err(Error::ForeignKeyMismatch {
            check: check.to_string(),
            keys: first_keys(&missing),
        });
    }

    log.line(format!("{}: OK", check));
    Ok(())
}

/// Run every primary-key and foreign-key check over the loaded inputs
pub fn check_integrity(tables: &InputTables, log: &mut RunLog) -> Result<()> {
    let skus: Vec<&str> = tables.items.iter().map(|i| i.sku.as_str()).collect();
    let receipts: Vec<&str> = tables.receipts.iter().map(|r| r.receipt_number.as_str()).collect();
    let orders: Vec<&str> = tables.orders.iter().map(|o| o.order_number.as_str()).collect();

    // Primary keys
    for (kind, keys) in [
        (FileKind::ItemMaster, &skus),
        (FileKind::InboundHeader, &receipts),
        (FileKind::OrderHeader, &orders),
    ] {
        if let Some(column) = kind.primary_key() {
            check_primary_key(&format!("{}.{}", kind, column), keys, log)?;
        }
    }

    // SKU foreign keys
    let inbound_skus: Vec<&str> = tables.receipt_lines.iter().map(|l| l.sku.as_str()).collect();
    let inventory_skus: Vec<&str> = tables.inventory.iter().map(|l| l.sku.as_str()).collect();
    let outbound_skus: Vec<&str> = tables.order_lines.iter().map(|l| l.sku.as_str()).collect();
    check_subset("InboundDetails.SKU -> ItemMaster.SKU", &skus, &inbound_skus, log)?;
    check_subset("Inventory.SKU -> ItemMaster.SKU", &skus, &inventory_skus, log)?;
    check_subset("OrderDetails.SKU -> ItemMaster.SKU", &skus, &outbound_skus, log)?;

    // Document foreign keys
    let line_receipts: Vec<&str> = tables
        .receipt_lines
        .iter()
        .map(|l| l.receipt_number.as_str())
        .collect();
    let line_orders: Vec<&str> = tables
        .order_lines
        .iter()
        .map(|l| l.order_number.as_str())
        .collect();
    check_subset(
        "InboundDetails.ReceiptNumber -> InboundHeader.ReceiptNumber",
        &receipts,
        &line_receipts,
        log,
    )?;
    check_subset(
        "OrderDetails.OrderNumber -> OrderHeader.OrderNumber",
        &orders,
        &line_orders,
        log,
    )?;

    log.flush();
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
