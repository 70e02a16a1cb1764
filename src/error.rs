// ⚠️ Error kinds for the ingest → transform → load pipeline

use crate::registry::FileKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // EXPECTED FAILURES (become a failed TransformResponse)
    // ========================================================================
    #[error("data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("required file missing: {0}")]
    RequiredFileMissing(String),

    #[error("file unreadable: {kind} ({reason})")]
    FileUnreadable { kind: FileKind, reason: String },

    #[error("{kind} is missing columns: {}", .columns.join(", "))]
    MissingColumns { kind: FileKind, columns: Vec<String> },

    #[error("{kind} column(s) could not be coerced: {}", .columns.join(", "))]
    CoercionError { kind: FileKind, columns: Vec<String> },

    #[error("bad primary key in {check}: {}", .keys.join(", "))]
    BadPrimaryKey { check: String, keys: Vec<String> },

    #[error("foreign key mismatch in {check}: {}", .keys.join(", "))]
    ForeignKeyMismatch { check: String, keys: Vec<String> },

    #[error("project {0} already exists")]
    ProjectAlreadyExists(String),

    #[error("project {0} does not exist")]
    ProjectMissing(String),

    #[error("project {0} already has uploaded data")]
    ProjectAlreadyHasData(String),

    #[error("store unavailable after {attempts} attempt(s): {reason}")]
    StoreUnavailable { attempts: u32, reason: String },

    #[error("store write failed on {table}: {reason}")]
    StoreWriteFailed { table: String, reason: String },

    // ========================================================================
    // UNEXPECTED FAILURES (escape to the caller)
    // ========================================================================
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("SQL bundle is missing statement {0}")]
    MissingStatement(String),
}

impl Error {
    /// Expected failures are reported through a failed response instead of
    /// escaping from `transform_and_upload`.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::DirectoryNotFound(_)
                | Error::RequiredFileMissing(_)
                | Error::FileUnreadable { .. }
                | Error::MissingColumns { .. }
                | Error::CoercionError { .. }
                | Error::BadPrimaryKey { .. }
                | Error::ForeignKeyMismatch { .. }
                | Error::ProjectAlreadyExists(_)
                | Error::ProjectMissing(_)
                | Error::ProjectAlreadyHasData(_)
                | Error::StoreUnavailable { .. }
                | Error::StoreWriteFailed { .. }
        )
    }

    /// Stable kind name, used in responses and log files
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DirectoryNotFound(_) => "DirectoryNotFound",
            Error::RequiredFileMissing(_) => "RequiredFileMissing",
            Error::FileUnreadable { .. } => "FileUnreadable",
            Error::MissingColumns { .. } => "MissingColumns",
            Error::CoercionError { .. } => "CoercionError",
            Error::BadPrimaryKey { .. } => "BadPrimaryKey",
            Error::ForeignKeyMismatch { .. } => "ForeignKeyMismatch",
            Error::ProjectAlreadyExists(_) => "ProjectAlreadyExists",
            Error::ProjectMissing(_) => "ProjectMissing",
            Error::ProjectAlreadyHasData(_) => "ProjectAlreadyHasData",
            Error::StoreUnavailable { .. } => "StoreUnavailable",
            Error::StoreWriteFailed { .. } => "StoreWriteFailed",
            Error::Sql(_) => "Sql",
            Error::Csv(_) => "Csv",
            Error::Io(_) => "Io",
            Error::Json(_) => "Json",
            Error::Config(_) => "Config",
            Error::MissingStatement(_) => "MissingStatement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_kinds() {
        let err = Error::ForeignKeyMismatch {
            check: "OrderDetails.SKU".to_string(),
            keys: vec!["C".to_string()],
        };
        assert!(err.is_expected());
        assert_eq!(err.kind(), "ForeignKeyMismatch");
        assert_eq!(err.to_string(), "foreign key mismatch in OrderDetails.SKU: C");

        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_expected());
    }

    #[test]
    fn test_missing_columns_message() {
        let err = Error::MissingColumns {
            kind: FileKind::Inventory,
            columns: vec!["Period".to_string(), "SKU".to_string()],
        };
        assert_eq!(err.to_string(), "Inventory is missing columns: Period, SKU");
    }
}
