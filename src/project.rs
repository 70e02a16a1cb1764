// 🏗️ Project Service - one entry object per project number
//
// Lifecycle: create -> transform_and_upload -> delete_project_data -> delete.
// Expected failures of an upload come back as a failed TransformResponse;
// anything else escapes after the run log is closed.

use crate::config::{Env, Settings};
use crate::error::{Error, Result};
use crate::inputs::InputTables;
use crate::integrity::check_integrity;
use crate::loader::{delete_project_rows, Loader, RowsInserted};
use crate::options::TransformOptions;
use crate::runlog::{RunKind, RunLog};
use crate::sql::{SqlBundle, PROJECT_DELETE, PROJECT_INSERT, PROJECT_LIST, PROJECT_SELECT, PROJECT_UPDATE};
use crate::store::Store;
use crate::transform::transform;
use crate::validation::validate_directory;
use chrono::{Local, NaiveDate};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// PROJECT INFO
// ============================================================================

/// Descriptive fields supplied when a project is created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseInfo {
    pub project_number: String,
    pub company: String,
    pub location: String,
    pub salesperson: String,
    pub email: String,
    pub start_date: Option<NaiveDate>,
    pub notes: String,
}

/// A stored project: descriptive fields plus what was last uploaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExistingInfo {
    #[serde(flatten)]
    pub base: BaseInfo,
    pub data_uploaded: bool,
    pub upload_date: Option<NaiveDate>,
    pub options: Option<TransformOptions>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub project_number: String,
    pub success: bool,
    pub message: String,
    pub rows_inserted: RowsInserted,
    pub log_file_path: String,
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn optional_date(date: Option<NaiveDate>) -> Value {
    match date {
        Some(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        None => Value::Null,
    }
}

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

/// Project row as stored, before parsing
struct ProjectRecord {
    project_number: String,
    company: String,
    location: String,
    salesperson: String,
    email: String,
    start_date: Option<String>,
    notes: String,
    data_uploaded: bool,
    upload_date: Option<String>,
    date_for_analysis: Option<String>,
    weekend_date_rule: Option<String>,
    process_inbound: Option<bool>,
    process_inventory: Option<bool>,
    process_outbound: Option<bool>,
    file_paths: Option<String>,
}

impl ProjectRecord {
    fn into_info(self) -> Result<ExistingInfo> {
        let options = match (self.date_for_analysis, self.weekend_date_rule) {
            (Some(date), Some(rule)) => Some(TransformOptions {
                date_for_analysis: date.parse().unwrap_or_else(|e: String| {
                    warn!(project = %self.project_number, error = %e, "stored DateForAnalysis unreadable, using default");
                    TransformOptions::default().date_for_analysis
                }),
                weekend_date_rule: rule.parse().unwrap_or_else(|e: String| {
                    warn!(project = %self.project_number, error = %e, "stored WeekendDateRule unreadable, using default");
                    TransformOptions::default().weekend_date_rule
                }),
                process_inbound: self.process_inbound.unwrap_or(true),
                process_inventory: self.process_inventory.unwrap_or(true),
                process_outbound: self.process_outbound.unwrap_or(true),
            }),
            _ => None,
        };
        let files = match self.file_paths {
            Some(json) if !json.is_empty() => serde_json::from_str(&json)?,
            _ => Vec::new(),
        };

        Ok(ExistingInfo {
            base: BaseInfo {
                project_number: self.project_number,
                company: self.company,
                location: self.location,
                salesperson: self.salesperson,
                email: self.email,
                start_date: parse_date(self.start_date),
                notes: self.notes,
            },
            data_uploaded: self.data_uploaded,
            upload_date: parse_date(self.upload_date),
            options,
            files,
        })
    }
}

fn read_project(store: &Store, bundle: &SqlBundle, project_number: &str) -> Result<Option<ExistingInfo>> {
    let record = store.query_row(bundle.get(PROJECT_SELECT)?, &[text(project_number)], |row| {
        Ok(ProjectRecord {
            project_number: row.get(0)?,
            company: row.get(1)?,
            location: row.get(2)?,
            salesperson: row.get(3)?,
            email: row.get(4)?,
            start_date: row.get(5)?,
            notes: row.get(6)?,
            data_uploaded: row.get(7)?,
            upload_date: row.get(8)?,
            date_for_analysis: row.get(9)?,
            weekend_date_rule: row.get(10)?,
            process_inbound: row.get(11)?,
            process_inventory: row.get(12)?,
            process_outbound: row.get(13)?,
            file_paths: row.get(14)?,
        })
    })?;
    record.map(ProjectRecord::into_info).transpose()
}

fn write_project(store: &Store, bundle: &SqlBundle, info: &ExistingInfo) -> Result<()> {
    let b = &info.base;
    let flag = |f: fn(&TransformOptions) -> bool| match &info.options {
        Some(o) => Value::Integer(f(o) as i64),
        None => Value::Null,
    };
    let files = if info.files.is_empty() {
        Value::Null
    } else {
        Value::Text(serde_json::to_string(&info.files)?)
    };

    store.execute(
        bundle.get(PROJECT_UPDATE)?,
        &[
            text(&b.project_number),
            text(&b.company),
            text(&b.location),
            text(&b.salesperson),
            text(&b.email),
            optional_date(b.start_date),
            text(&b.notes),
            Value::Integer(info.data_uploaded as i64),
            optional_date(info.upload_date),
            info.options
                .map(|o| text(o.date_for_analysis.as_str()))
                .unwrap_or(Value::Null),
            info.options
                .map(|o| text(o.weekend_date_rule.as_str()))
                .unwrap_or(Value::Null),
            flag(|o| o.process_inbound),
            flag(|o| o.process_inventory),
            flag(|o| o.process_outbound),
            files,
        ],
    )?;
    Ok(())
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct ProjectService {
    project_number: String,
    env: Env,
    settings: Settings,
    bundle: SqlBundle,
}

impl ProjectService {
    pub fn new(project_number: impl Into<String>, env: Env, settings: Settings) -> Result<ProjectService> {
        let bundle = SqlBundle::load(settings.sql_dir.as_deref())?;
        Ok(ProjectService {
            project_number: project_number.into(),
            env,
            settings,
            bundle,
        })
    }

    pub fn project_number(&self) -> &str {
        &self.project_number
    }

    pub fn env(&self) -> Env {
        self.env
    }

    fn connect(&self) -> Result<Store> {
        Store::connect(
            self.settings.connection_string(self.env),
            self.settings.connect_attempts,
            &self.bundle,
        )
    }

    fn require_project(&self, store: &Store) -> Result<ExistingInfo> {
        read_project(store, &self.bundle, &self.project_number)?
            .ok_or_else(|| Error::ProjectMissing(self.project_number.clone()))
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        let store = self.connect()?;
        store.query_strings(self.bundle.get(PROJECT_LIST)?, &[])
    }

    /// Insert a new Project row with no data uploaded
    pub fn create_project(&self, info: BaseInfo) -> Result<ExistingInfo> {
        let store = self.connect()?;
        if read_project(&store, &self.bundle, &self.project_number)?.is_some() {
            return Err(Error::ProjectAlreadyExists(self.project_number.clone()));
        }

        store.execute(
            self.bundle.get(PROJECT_INSERT)?,
            &[
                text(&self.project_number),
                text(&info.company),
                text(&info.location),
                text(&info.salesperson),
                text(&info.email),
                optional_date(info.start_date),
                text(&info.notes),
            ],
        )?;
        info!(project = %self.project_number, env = %self.env, "project created");
        self.require_project(&store)
    }

    pub fn get_project(&self) -> Result<ExistingInfo> {
        let store = self.connect()?;
        self.require_project(&store)
    }

    /// Overwrite the stored Project row with `info`
    pub fn update_project(&self, mut info: ExistingInfo) -> Result<ExistingInfo> {
        let store = self.connect()?;
        self.require_project(&store)?;

        info.base.project_number = self.project_number.clone();
        write_project(&store, &self.bundle, &info)?;
        self.require_project(&store)
    }

    /// Validate, read, check, transform and load `directory`
    pub fn transform_and_upload(&self, directory: &Path, options: TransformOptions) -> Result<TransformResponse> {
        let mut log = RunLog::create(&self.settings.log_dir, &self.project_number, RunKind::Transform)?;
        let log_file_path = log.path().display().to_string();
        log.banner("TRANSFORM AND UPLOAD");
        log.line(format!("Project {} ({}), directory {}", self.project_number, self.env, directory.display()));
        log.line(format!("Options: {}", serde_json::to_string(&options)?));
        info!(project = %self.project_number, directory = %directory.display(), "upload started");

        match self.run_upload(directory, &options, &mut log) {
            Ok(rows) => {
                log.banner("SUMMARY");
                log.line(format!(
                    "SKUs {}, receipts {}, receipt lines {}, inventory lines {}, outbound lines {}, orders {}",
                    rows.skus,
                    rows.inbound_receipts,
                    rows.inbound_lines,
                    rows.inventory_lines,
                    rows.outbound_lines,
                    rows.outbound_orders
                ));
                log.line(format!("Total rows inserted: {}", rows.total));
                info!(project = %self.project_number, rows = rows.total, "upload complete");
                Ok(TransformResponse {
                    project_number: self.project_number.clone(),
                    success: true,
                    message: format!("Uploaded {} rows", rows.total),
                    rows_inserted: rows,
                    log_file_path,
                })
            }
            Err(e) if e.is_expected() => {
                log.line(format!("FAILED [{}]: {}", e.kind(), e));
                warn!(project = %self.project_number, kind = e.kind(), error = %e, "upload failed");
                Ok(TransformResponse {
                    project_number: self.project_number.clone(),
                    success: false,
                    message: e.to_string(),
                    rows_inserted: RowsInserted::default(),
                    log_file_path,
                })
            }
            Err(e) => {
                log.line(format!("UNEXPECTED [{}]: {}", e.kind(), e));
                Err(e)
            }
        }
    }

    fn run_upload(&self, directory: &Path, options: &TransformOptions, log: &mut RunLog) -> Result<RowsInserted> {
        let store = self.connect()?;
        let mut project = self.require_project(&store)?;
        if project.data_uploaded {
            return Err(Error::ProjectAlreadyHasData(self.project_number.clone()));
        }

        log.banner("VALIDATE");
        let validation = validate_directory(directory, options);
        for file in &validation.files {
            log.line(format!(
                "{}: present={} valid={} columns={}",
                file.kind.file_name(),
                file.is_present,
                file.is_valid,
                file.given_columns.len()
            ));
        }
        if let Some(error) = validation.first_error() {
            log.line(format!("Validation errors: {}", validation.error_codes().join(", ")));
            log.flush();
            return Err(error);
        }
        log.flush();

        log.banner("READ");
        let inputs = InputTables::load(directory, options, log)?;

        log.banner("INTEGRITY");
        check_integrity(&inputs, log)?;

        log.banner("TRANSFORM");
        let (tables, report) = transform(&self.project_number, &inputs, options);
        log.line(format!(
            "Active SKUs {}, outbound lines {}, months {}",
            report.active_skus, report.total_lines, report.months
        ));
        if report.unmeasured_lines > 0 {
            log.line(format!("{} line(s) with unrecognised UoM: cube and weight set to 0", report.unmeasured_lines));
        }
        log.flush();

        let loader = Loader::new(&store, &self.bundle, self.settings.batch_size);
        let rows = loader.load(&self.project_number, &tables, log)?;

        project.data_uploaded = true;
        project.upload_date = Some(Local::now().date_naive());
        project.options = Some(*options);
        project.files = options
            .active_kinds()
            .into_iter()
            .map(|kind| directory.join(kind.file_name()))
            .collect();
        if let Err(e) = write_project(&store, &self.bundle, &project) {
            log.line(format!("Project update failed: {}", e));
            delete_project_rows(&store, &self.bundle, &self.project_number, log)?;
            return Err(e);
        }
        Ok(rows)
    }

    /// Remove every derived row and reset the Project row's upload fields
    pub fn delete_project_data(&self) -> Result<usize> {
        let mut log = RunLog::create(&self.settings.log_dir, &self.project_number, RunKind::DeleteFromOutputTables)?;
        log.banner("DELETE FROM OUTPUT TABLES");

        let store = self.connect()?;
        let mut project = self.require_project(&store)?;
        let deleted = delete_project_rows(&store, &self.bundle, &self.project_number, &mut log)?;

        project.data_uploaded = false;
        project.upload_date = None;
        project.options = None;
        project.files.clear();
        write_project(&store, &self.bundle, &project)?;

        log.line(format!("Deleted {} row(s)", deleted));
        info!(project = %self.project_number, rows = deleted, "project data deleted");
        Ok(deleted)
    }

    /// Delete the Project row; refused while data is uploaded
    pub fn delete_project(&self) -> Result<usize> {
        let store = self.connect()?;
        let project = self.require_project(&store)?;
        if project.data_uploaded {
            return Err(Error::ProjectAlreadyHasData(self.project_number.clone()));
        }
        let deleted = store.execute(self.bundle.get(PROJECT_DELETE)?, &[text(&self.project_number)])?;
        info!(project = %self.project_number, "project deleted");
        Ok(deleted)
    }
}

// ============================================================================
// TESTS
// ============================================================================
