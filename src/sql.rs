// 🗄️ SQL bundle
// Statements are opaque text: one per file, looked up by relative path.
// The default bundle is compiled in; `sql_dir` swaps in the same layout
// from disk.

use crate::error::{Error, Result};
use crate::loader::DerivedTable;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

macro_rules! embed {
    ($name:literal) => {
        ($name, include_str!(concat!("../sql/", $name)))
    };
}

const EMBEDDED: &[(&str, &str)] = &[
    embed!("schema.sql"),
    embed!("project/list.sql"),
    embed!("project/select.sql"),
    embed!("project/insert.sql"),
    embed!("project/update.sql"),
    embed!("project/delete.sql"),
    embed!("insert/ItemMaster.sql"),
    embed!("insert/InboundHeader.sql"),
    embed!("insert/ProjectNumberVelocity.sql"),
    embed!("insert/ProjectNumberOrderNumber.sql"),
    embed!("insert/InboundDetails.sql"),
    embed!("insert/InventoryData.sql"),
    embed!("insert/OutboundData.sql"),
    embed!("insert/OutboundDataByOrder.sql"),
    embed!("insert/OrderVelocityCombinations.sql"),
    embed!("insert/VelocitySummary.sql"),
    embed!("insert/VelocityLadder.sql"),
    embed!("insert/VelocityByMonth.sql"),
    embed!("insert/DailyOrderProfileByVelocity.sql"),
    embed!("delete/ItemMaster.sql"),
    embed!("delete/InboundHeader.sql"),
    embed!("delete/ProjectNumberVelocity.sql"),
    embed!("delete/ProjectNumberOrderNumber.sql"),
    embed!("delete/InboundDetails.sql"),
    embed!("delete/InventoryData.sql"),
    embed!("delete/OutboundData.sql"),
    embed!("delete/OutboundDataByOrder.sql"),
    embed!("delete/OrderVelocityCombinations.sql"),
    embed!("delete/VelocitySummary.sql"),
    embed!("delete/VelocityLadder.sql"),
    embed!("delete/VelocityByMonth.sql"),
    embed!("delete/DailyOrderProfileByVelocity.sql"),
];

pub const SCHEMA: &str = "schema.sql";
pub const PROJECT_LIST: &str = "project/list.sql";
pub const PROJECT_SELECT: &str = "project/select.sql";
pub const PROJECT_INSERT: &str = "project/insert.sql";
pub const PROJECT_UPDATE: &str = "project/update.sql";
pub const PROJECT_DELETE: &str = "project/delete.sql";

#[derive(Debug, Clone)]
pub struct SqlBundle {
    statements: HashMap<String, String>,
}

impl SqlBundle {
    pub fn embedded() -> SqlBundle {
        SqlBundle {
            statements: EMBEDDED
                .iter()
                .map(|(name, sql)| (name.to_string(), sql.to_string()))
                .collect(),
        }
    }

    /// Read every statement the embedded bundle has from `dir`
    pub fn from_dir(dir: &Path) -> Result<SqlBundle> {
        let mut statements = HashMap::new();
        for (name, _) in EMBEDDED {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(Error::MissingStatement(path.display().to_string()));
            }
            statements.insert(name.to_string(), fs::read_to_string(&path)?);
        }
        debug!(dir = %dir.display(), count = statements.len(), "sql bundle loaded");
        Ok(SqlBundle { statements })
    }

    pub fn load(sql_dir: Option<&Path>) -> Result<SqlBundle> {
        match sql_dir {
            Some(dir) => SqlBundle::from_dir(dir),
            None => Ok(SqlBundle::embedded()),
        }
    }

    pub fn get(&self, name: &str) -> Result<&str> {
        self.statements
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingStatement(name.to_string()))
    }

    pub fn insert(&self, table: DerivedTable) -> Result<&str> {
        self.get(&format!("insert/{}.sql", table.name()))
    }

    pub fn delete(&self, table: DerivedTable) -> Result<&str> {
        self.get(&format!("delete/{}.sql", table.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_embedded_has_every_table() {
        let bundle = SqlBundle::embedded();
        for table in DerivedTable::INSERT_ORDER {
            assert!(bundle.insert(table).unwrap().contains(table.name()));
            assert!(bundle.delete(table).unwrap().contains("WHERE ProjectNumber = ?1"));
        }
        assert!(bundle.get(SCHEMA).unwrap().contains("CREATE TABLE IF NOT EXISTS Project"));
        assert!(matches!(bundle.get("nope.sql"), Err(Error::MissingStatement(_))));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempdir().unwrap();
        for (name, sql) in EMBEDDED {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, sql).unwrap();
        }
        fs::write(dir.path().join(PROJECT_LIST), "SELECT ProjectNumber FROM Project").unwrap();

        let bundle = SqlBundle::load(Some(dir.path())).unwrap();
        assert_eq!(bundle.get(PROJECT_LIST).unwrap(), "SELECT ProjectNumber FROM Project");

        fs::remove_file(dir.path().join(SCHEMA)).unwrap();
        assert!(matches!(
            SqlBundle::from_dir(dir.path()),
            Err(Error::MissingStatement(_))
        ));
    }
}
