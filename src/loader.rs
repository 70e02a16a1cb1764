// 🚚 Loader - derived tables into the store under one project number
//
// Insertion order puts PK tables first; deletion runs the exact reverse.
// Rows go in chunks, one transaction per chunk. Any failure stops the load
// and deletes everything already written for the project.

use crate::error::{Error, Result};
use crate::runlog::RunLog;
use crate::sql::{SqlBundle, PROJECT_SELECT};
use crate::store::Store;
use crate::transform::DerivedTables;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A derived row as positional statement parameters
pub trait TableRow: Serialize {
    fn values(&self) -> Vec<Value>;
}

// ============================================================================
// TABLES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedTable {
    ItemMaster,
    InboundHeader,
    ProjectNumberVelocity,
    ProjectNumberOrderNumber,
    InboundDetails,
    InventoryData,
    OutboundData,
    OutboundDataByOrder,
    OrderVelocityCombinations,
    VelocitySummary,
    VelocityLadder,
    VelocityByMonth,
    DailyOrderProfileByVelocity,
}

impl DerivedTable {
    pub const INSERT_ORDER: [DerivedTable; 13] = [
        DerivedTable::ItemMaster,
        DerivedTable::InboundHeader,
        DerivedTable::ProjectNumberVelocity,
        DerivedTable::ProjectNumberOrderNumber,
        DerivedTable::InboundDetails,
        DerivedTable::InventoryData,
        DerivedTable::OutboundData,
        DerivedTable::OutboundDataByOrder,
        DerivedTable::OrderVelocityCombinations,
        DerivedTable::VelocitySummary,
        DerivedTable::VelocityLadder,
        DerivedTable::VelocityByMonth,
        DerivedTable::DailyOrderProfileByVelocity,
    ];

    pub fn delete_order() -> impl Iterator<Item = DerivedTable> {
        DerivedTable::INSERT_ORDER.into_iter().rev()
    }

    pub fn name(&self) -> &'static str {
        match self {
            DerivedTable::ItemMaster => "ItemMaster",
            DerivedTable::InboundHeader => "InboundHeader",
            DerivedTable::ProjectNumberVelocity => "ProjectNumberVelocity",
            DerivedTable::ProjectNumberOrderNumber => "ProjectNumberOrderNumber",
            DerivedTable::InboundDetails => "InboundDetails",
            DerivedTable::InventoryData => "InventoryData",
            DerivedTable::OutboundData => "OutboundData",
            DerivedTable::OutboundDataByOrder => "OutboundDataByOrder",
            DerivedTable::OrderVelocityCombinations => "OrderVelocityCombinations",
            DerivedTable::VelocitySummary => "VelocitySummary",
            DerivedTable::VelocityLadder => "VelocityLadder",
            DerivedTable::VelocityByMonth => "VelocityByMonth",
            DerivedTable::DailyOrderProfileByVelocity => "DailyOrderProfileByVelocity",
        }
    }
}

impl fmt::Display for DerivedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ROW COUNTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsInserted {
    /// Rows across all derived tables
    pub total: usize,
    pub skus: usize,
    pub inbound_receipts: usize,
    pub inbound_lines: usize,
    pub inventory_lines: usize,
    pub outbound_lines: usize,
    pub outbound_orders: usize,
}

impl RowsInserted {
    fn record(&mut self, table: DerivedTable, rows: usize) {
        self.total += rows;
        match table {
            DerivedTable::ItemMaster => self.skus = rows,
            DerivedTable::InboundHeader => self.inbound_receipts = rows,
            DerivedTable::InboundDetails => self.inbound_lines = rows,
            DerivedTable::InventoryData => self.inventory_lines = rows,
            DerivedTable::OutboundData => self.outbound_lines = rows,
            DerivedTable::OutboundDataByOrder => self.outbound_orders = rows,
            _ => {}
        }
    }
}

// ============================================================================
// LOADER
// ============================================================================

pub struct Loader<'a> {
    store: &'a Store,
    bundle: &'a SqlBundle,
    batch_size: usize,
}

impl<'a> Loader<'a> {
    pub fn new(store: &'a Store, bundle: &'a SqlBundle, batch_size: usize) -> Loader<'a> {
        Loader {
            store,
            bundle,
            batch_size: batch_size.max(1),
        }
    }

    /// Insert every derived table in order; on failure, roll back by delete
    /// and report `StoreWriteFailed`.
    pub fn load(&self, project_number: &str, tables: &DerivedTables, log: &mut RunLog) -> Result<RowsInserted> {
        log.banner("LOAD");
        self.check_project(project_number)?;
        log.line(format!("Project {}: present", project_number));

        let mut counts = RowsInserted::default();
        for table in DerivedTable::INSERT_ORDER {
            match self.insert_table(table, tables, log) {
                Ok(rows) => counts.record(table, rows),
                Err(e) => {
                    log.line(format!("{}: insert failed: {}", table, e));
                    warn!(table = %table, error = %e, "load failed, rolling back");
                    self.roll_back(project_number, log);
                    log.flush();
                    return Err(match e {
                        Error::StoreWriteFailed { .. } => e,
                        other => Error::StoreWriteFailed {
                            table: table.name().to_string(),
                            reason: other.to_string(),
                        },
                    });
                }
            }
        }

        log.line(format!("Rows inserted: {}", counts.total));
        log.flush();
        info!(project = project_number, rows = counts.total, "load complete");
        Ok(counts)
    }

    fn check_project(&self, project_number: &str) -> Result<()> {
        let found = self.store.query_row(
            self.bundle.get(PROJECT_SELECT)?,
            &[Value::Text(project_number.to_string())],
            |_| Ok(()),
        )?;
        match found {
            Some(()) => Ok(()),
            None => Err(Error::ProjectMissing(project_number.to_string())),
        }
    }

    fn insert_table(&self, table: DerivedTable, tables: &DerivedTables, log: &mut RunLog) -> Result<usize> {
        match table {
            DerivedTable::ItemMaster => self.insert_rows(table, &tables.item_master, log),
            DerivedTable::InboundHeader => self.insert_rows(table, &tables.inbound_header, log),
            DerivedTable::ProjectNumberVelocity => self.insert_rows(table, &tables.project_velocity, log),
            DerivedTable::ProjectNumberOrderNumber => self.insert_rows(table, &tables.project_order_number, log),
            DerivedTable::InboundDetails => self.insert_rows(table, &tables.inbound_details, log),
            DerivedTable::InventoryData => self.insert_rows(table, &tables.inventory_data, log),
            DerivedTable::OutboundData => self.insert_rows(table, &tables.outbound_data, log),
            DerivedTable::OutboundDataByOrder => self.insert_rows(table, &tables.outbound_by_order, log),
            DerivedTable::OrderVelocityCombinations => {
                self.insert_rows(table, &tables.order_velocity_combinations, log)
            }
            DerivedTable::VelocitySummary => self.insert_rows(table, &tables.velocity_summary, log),
            DerivedTable::VelocityLadder => self.insert_rows(table, &tables.velocity_ladder, log),
            DerivedTable::VelocityByMonth => self.insert_rows(table, &tables.velocity_by_month, log),
            DerivedTable::DailyOrderProfileByVelocity => {
                self.insert_rows(table, &tables.daily_order_profile, log)
            }
        }
    }

    fn insert_rows<T: TableRow>(&self, table: DerivedTable, rows: &[T], log: &mut RunLog) -> Result<usize> {
        let Some(first) = rows.first() else {
            log.line(format!("{}: no rows", table));
            return Ok(0);
        };
        log.line(format!("{}: first row {}", table, serde_json::to_string(first)?));
        let sql = self.bundle.insert(table)?;

        let mut inserted = 0;
        for (chunk_no, chunk) in rows.chunks(self.batch_size).enumerate() {
            let started = Instant::now();
            let params: Vec<Vec<Value>> = chunk.iter().map(TableRow::values).collect();

            let written = self.store.begin().and_then(|_| {
                let n = self.store.execute_many(sql, &params)?;
                self.store.commit()?;
                Ok(n)
            });
            match written {
                Ok(n) => inserted += n,
                Err(e) => {
                    if let Err(rb) = self.store.rollback() {
                        warn!(table = %table, error = %rb, "chunk rollback failed");
                    }
                    return Err(Error::StoreWriteFailed {
                        table: table.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }

            let elapsed = started.elapsed();
            log.line(format!(
                "{}: chunk {} ({} rows) in {:.3}s",
                table,
                chunk_no + 1,
                chunk.len(),
                elapsed.as_secs_f64()
            ));
            debug!(table = %table, chunk = chunk_no + 1, rows = chunk.len(), ms = elapsed.as_millis() as u64, "chunk committed");
        }

        log.line(format!("{}: {} rows inserted", table, inserted));
        Ok(inserted)
    }

    fn roll_back(&self, project_number: &str, log: &mut RunLog) {
        match delete_project_rows(self.store, self.bundle, project_number, log) {
            Ok(rows) => log.line(format!("Rolled back {} row(s)", rows)),
            Err(e) => {
                log.line(format!("Rollback by delete failed: {}", e));
                warn!(project = project_number, error = %e, "rollback by delete failed");
            }
        }
    }
}

/// Delete every derived row of the project, children first; returns rows
/// deleted across all tables.
pub fn delete_project_rows(store: &Store, bundle: &SqlBundle, project_number: &str, log: &mut RunLog) -> Result<usize> {
    let pn = [Value::Text(project_number.to_string())];
    store.begin()?;

    let mut deleted = 0;
    for table in DerivedTable::delete_order() {
        let result = bundle.delete(table).and_then(|sql| store.execute(sql, &pn));
        match result {
            Ok(rows) => {
                log.line(format!("{}: {} rows deleted", table, rows));
                deleted += rows;
            }
            Err(e) => {
                store.rollback()?;
                return Err(e);
            }
        }
    }

    store.commit()?;
    log.flush();
    info!(project = project_number, rows = deleted, "project rows deleted");
    Ok(deleted)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_order_is_reverse() {
        let deletes: Vec<DerivedTable> = DerivedTable::delete_order().collect();
        assert_eq!(deletes.first(), Some(&DerivedTable::DailyOrderProfileByVelocity));
        assert_eq!(deletes.last(), Some(&DerivedTable::ItemMaster));

        let mut forward = deletes.clone();
        forward.reverse();
        assert_eq!(forward, DerivedTable::INSERT_ORDER.to_vec());
    }

    #[test]
    fn test_pk_tables_first() {
        let position = |t: DerivedTable| DerivedTable::INSERT_ORDER.iter().position(|x| *x == t).unwrap();
        for pk in [
            DerivedTable::ItemMaster,
            DerivedTable::InboundHeader,
            DerivedTable::ProjectNumberVelocity,
            DerivedTable::ProjectNumberOrderNumber,
        ] {
            assert!(position(pk) < position(DerivedTable::InboundDetails));
        }
    }

    #[test]
    fn test_rows_inserted_record() {
        let mut counts = RowsInserted::default();
        counts.record(DerivedTable::ItemMaster, 3);
        counts.record(DerivedTable::ProjectNumberVelocity, 5);
        counts.record(DerivedTable::OutboundData, 7);
        assert_eq!(counts.skus, 3);
        assert_eq!(counts.outbound_lines, 7);
        assert_eq!(counts.total, 15);
    }
}
