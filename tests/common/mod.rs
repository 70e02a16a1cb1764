#![allow(dead_code)]

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wms_velocity::{BaseInfo, DerivedTable, Env, ProjectService, Settings, TransformOptions};

pub const ITEM_MASTER: &str = "\
SKU,Description,UoM,EachLength,EachWidth,EachHeight,EachWeight,CartonQuantity,CartonLength,CartonWidth,CartonHeight,CartonWeight
A,Widget,Each,12,12,12,1.5,12,24,24,12,20
B,Gadget,Each,6,6,6,0.5,24,12,12,12,13
";

/// Temp workspace: data directory, logs and a dev store
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Workspace {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("data")).unwrap();
        Workspace { root }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.path().join("dev.db")
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.stores.dev = format!("sqlite://{}", self.db_path().display());
        settings.log_dir = self.root.path().join("logs");
        settings.batch_size = 2;
        settings
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.data_dir().join(name), content).unwrap();
    }

    pub fn service(&self, project_number: &str) -> ProjectService {
        ProjectService::new(project_number, Env::Dev, self.settings()).unwrap()
    }

    /// Service with its Project row already created
    pub fn project(&self, project_number: &str) -> ProjectService {
        let service = self.service(project_number);
        service
            .create_project(BaseInfo {
                project_number: project_number.to_string(),
                company: "Acme".to_string(),
                ..BaseInfo::default()
            })
            .unwrap();
        service
    }

    pub fn connection(&self) -> Connection {
        Connection::open(self.db_path()).unwrap()
    }

    /// Rows for the project across every derived table
    pub fn derived_rows(&self, project_number: &str) -> i64 {
        let conn = self.connection();
        DerivedTable::INSERT_ORDER
            .iter()
            .map(|t| {
                conn.query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE ProjectNumber = ?1", t.name()),
                    [project_number],
                    |r| r.get::<_, i64>(0),
                )
                .unwrap()
            })
            .sum()
    }

    pub fn strings(&self, sql: &str, project_number: &str) -> Vec<String> {
        let conn = self.connection();
        let mut stmt = conn.prepare(sql).unwrap();
        let rows = stmt
            .query_map([project_number], |r| r.get::<_, String>(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap();
        rows
    }
}

/// ItemMaster with A and B, one order O1 with lines (A,3) and (B,1)
pub fn write_minimal_outbound(ws: &Workspace, ship_date: &str) {
    ws.write("ItemMaster.csv", ITEM_MASTER);
    ws.write(
        "OrderHeader.csv",
        &format!("OrderNumber,ReceivedDate,PickDate,ShipDate\nO1,2024-01-01,2024-01-01,{}\n", ship_date),
    );
    ws.write(
        "OrderDetails.csv",
        "OrderNumber,SKU,Quantity,UoM\nO1,A,3,Each\nO1,B,1,Each\n",
    );
}

pub fn outbound_only() -> TransformOptions {
    TransformOptions {
        process_inbound: false,
        process_inventory: false,
        ..TransformOptions::default()
    }
}

pub fn log_text(path: &str) -> String {
    fs::read_to_string(Path::new(path)).unwrap()
}
