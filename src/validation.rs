// 🔎 File & Directory Validation
// Presence, openability, header and emptiness checks for the six input files

use crate::error::Error;
use crate::options::TransformOptions;
use crate::registry::FileKind;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of data rows sampled when checking that a file opens as a table
const SAMPLE_ROWS: usize = 5;

// ============================================================================
// FILE VALIDATION
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    pub kind: FileKind,
    pub path: PathBuf,
    pub is_present: bool,
    pub is_valid: bool,
    pub given_columns: Vec<String>,
    pub missing_columns: Vec<String>,
    /// Why the file could not be opened as a table, if it could not
    pub unreadable_reason: Option<String>,
}

impl FileValidation {
    fn new(kind: FileKind, path: &Path) -> Self {
        FileValidation {
            kind,
            path: path.to_path_buf(),
            is_present: false,
            is_valid: false,
            given_columns: Vec::new(),
            missing_columns: Vec::new(),
            unreadable_reason: None,
        }
    }
}

/// Validate one input file. Never fails: every problem is reflected in the
/// returned `FileValidation`, and evaluation stops at the first failed rule.
pub fn validate_file(path: &Path, kind: FileKind) -> FileValidation {
    let mut result = FileValidation::new(kind, path);

    // Rule 1: exists and non-empty
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if !path.is_file() || size == 0 {
        debug!(file = %path.display(), "input file absent or empty");
        return result;
    }
    result.is_present = true;

    // Rule 2: opens as a table (header + a few rows)
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            result.unreadable_reason = Some(e.to_string());
            return result;
        }
    };
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    // Bytes, not text: cell encoding is judged by the cleanser on every row
    let headers = match reader.byte_headers() {
        Ok(h) => h
            .iter()
            .map(|c| String::from_utf8_lossy(c).trim().to_string())
            .collect::<Vec<_>>(),
        Err(e) => {
            result.unreadable_reason = Some(e.to_string());
            return result;
        }
    };

    let mut data_rows = 0;
    for record in reader.byte_records().take(SAMPLE_ROWS) {
        if let Err(e) = record {
            result.unreadable_reason = Some(e.to_string());
            return result;
        }
        data_rows += 1;
    }

    // Rule 3: header is a superset of the required columns
    result.missing_columns = kind
        .required_columns()
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == required))
        .map(str::to_string)
        .collect();
    result.given_columns = headers;
    if !result.missing_columns.is_empty() {
        return result;
    }
    result.is_valid = true;

    // Rule 4: header-only file counts as not present
    if data_rows == 0 {
        result.is_present = false;
    }

    result
}

// ============================================================================
// DIRECTORY VALIDATION
// ============================================================================

/// One entry of the ordered directory error list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationIssue {
    DirectoryNotFound(PathBuf),
    RequiredFileMissing(FileKind),
    FileUnreadable { kind: FileKind, reason: String },
    MissingColumns { kind: FileKind, columns: Vec<String> },
}

impl ValidationIssue {
    /// Stable error code, e.g. `INVENTORY_MISSING_COLUMNS`
    pub fn code(&self) -> String {
        match self {
            ValidationIssue::DirectoryNotFound(_) => "DIRECTORY_NOT_FOUND".to_string(),
            ValidationIssue::RequiredFileMissing(kind) => format!("{}_MISSING", kind.code()),
            ValidationIssue::FileUnreadable { kind, .. } => format!("{}_UNREADABLE", kind.code()),
            ValidationIssue::MissingColumns { kind, .. } => {
                format!("{}_MISSING_COLUMNS", kind.code())
            }
        }
    }

    pub fn to_error(&self) -> Error {
        match self {
            ValidationIssue::DirectoryNotFound(dir) => Error::DirectoryNotFound(dir.clone()),
            ValidationIssue::RequiredFileMissing(kind) => {
                Error::RequiredFileMissing(kind.file_name().to_string())
            }
            ValidationIssue::FileUnreadable { kind, reason } => Error::FileUnreadable {
                kind: *kind,
                reason: reason.clone(),
            },
            ValidationIssue::MissingColumns { kind, columns } => Error::MissingColumns {
                kind: *kind,
                columns: columns.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DataDirectoryValidation {
    pub directory: PathBuf,
    pub options: TransformOptions,
    pub files: Vec<FileValidation>,
    pub errors: Vec<ValidationIssue>,
}

impl DataDirectoryValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn file(&self, kind: FileKind) -> Option<&FileValidation> {
        self.files.iter().find(|f| f.kind == kind)
    }

    pub fn error_codes(&self) -> Vec<String> {
        self.errors.iter().map(ValidationIssue::code).collect()
    }

    /// First fatal issue as a pipeline error
    pub fn first_error(&self) -> Option<Error> {
        self.errors.first().map(ValidationIssue::to_error)
    }
}

/// Validate ItemMaster plus every file the options switch on
pub fn validate_directory(directory: &Path, options: &TransformOptions) -> DataDirectoryValidation {
    let mut validation = DataDirectoryValidation {
        directory: directory.to_path_buf(),
        options: *options,
        files: Vec::new(),
        errors: Vec::new(),
    };

    if !directory.is_dir() {
        warn!(directory = %directory.display(), "data directory not found");
        validation
            .errors
            .push(ValidationIssue::DirectoryNotFound(directory.to_path_buf()));
        return validation;
    }

    for kind in options.active_kinds() {
        let file = validate_file(&directory.join(kind.file_name()), kind);

        if !file.missing_columns.is_empty() {
            validation.errors.push(ValidationIssue::MissingColumns {
                kind,
                columns: file.missing_columns.clone(),
            });
        } else if let Some(reason) = &file.unreadable_reason {
            validation.errors.push(ValidationIssue::FileUnreadable {
                kind,
                reason: reason.clone(),
            });
        } else if !file.is_present {
            validation.errors.push(ValidationIssue::RequiredFileMissing(kind));
        }

        validation.files.push(file);
    }

    validation
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ITEM_MASTER: &str = "SKU,Description,UoM,EachLength,EachWidth,EachHeight,EachWeight\nA,Widget,Each,12,12,12,1.5\n";

    #[test]
    fn test_missing_file_is_not_present() {
        let dir = tempdir().unwrap();
        let result = validate_file(&dir.path().join("ItemMaster.csv"), FileKind::ItemMaster);
        assert!(!result.is_present);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_valid_file_with_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ItemMaster.csv");
        fs::write(&path, "Extra,SKU,Description,UoM,EachLength,EachWidth,EachHeight,EachWeight\nx,A,W,Each,1,1,1,1\n").unwrap();

        let result = validate_file(&path, FileKind::ItemMaster);
        assert!(result.is_present);
        assert!(result.is_valid);
        assert!(result.missing_columns.is_empty());
        assert_eq!(result.given_columns[0], "Extra");
    }

    #[test]
    fn test_missing_columns_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Inventory.csv");
        fs::write(&path, "SKU,Quantity\nA,3\n").unwrap();

        let result = validate_file(&path, FileKind::Inventory);
        assert!(result.is_present);
        assert!(!result.is_valid);
        assert_eq!(result.missing_columns, vec!["Period".to_string(), "UoM".to_string()]);
    }

    #[test]
    fn test_header_only_file_counts_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OrderHeader.csv");
        fs::write(&path, "OrderNumber,ReceivedDate,PickDate,ShipDate\n").unwrap();

        let result = validate_file(&path, FileKind::OrderHeader);
        assert!(!result.is_present);
        assert!(result.is_valid);
    }

    #[test]
    fn test_ragged_rows_are_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OrderHeader.csv");
        fs::write(&path, "OrderNumber,ReceivedDate,PickDate,ShipDate\nO1,2024-01-01\n").unwrap();

        let result = validate_file(&path, FileKind::OrderHeader);
        assert!(!result.is_valid);
        assert!(result.unreadable_reason.is_some());
    }

    #[test]
    fn test_non_utf8_cells_are_left_to_the_cleanser() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("OrderDetails.csv");
        let mut bytes = b"OrderNumber,SKU,Quantity,UoM,Carrier\nO1,A,1,Each,".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b"\n");
        fs::write(&path, bytes).unwrap();

        let result = validate_file(&path, FileKind::OrderDetails);
        assert!(result.is_present);
        assert!(result.is_valid);
        assert_eq!(result.unreadable_reason, None);
    }

    #[test]
    fn test_directory_not_found() {
        let validation = validate_directory(Path::new("/nonexistent/wms"), &TransformOptions::default());
        assert!(!validation.is_valid());
        assert_eq!(validation.error_codes(), vec!["DIRECTORY_NOT_FOUND".to_string()]);
    }

    #[test]
    fn test_directory_errors_are_ordered_and_gated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ItemMaster.csv"), ITEM_MASTER).unwrap();
        fs::write(dir.path().join("Inventory.csv"), "SKU,Quantity\nA,1\n").unwrap();

        let options = TransformOptions {
            process_inbound: false,
            ..TransformOptions::default()
        };
        let validation = validate_directory(dir.path(), &options);

        assert_eq!(
            validation.error_codes(),
            vec![
                "INVENTORY_MISSING_COLUMNS".to_string(),
                "ORDER_HEADER_MISSING".to_string(),
                "ORDER_DETAILS_MISSING".to_string(),
            ]
        );
        assert!(validation.file(FileKind::InboundHeader).is_none());
        assert!(matches!(
            validation.first_error(),
            Some(Error::MissingColumns { kind: FileKind::Inventory, .. })
        ));
    }

    #[test]
    fn test_item_master_only_project() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ItemMaster.csv"), ITEM_MASTER).unwrap();

        let options = TransformOptions {
            process_inbound: false,
            process_inventory: false,
            process_outbound: false,
            ..TransformOptions::default()
        };
        let validation = validate_directory(dir.path(), &options);
        assert!(validation.is_valid());
        assert_eq!(validation.files.len(), 1);
    }
}
