// Warehouse Velocity Profiler - Core Library
// CSV ingest, ABC velocity analysis and relational load, per project number

pub mod config;
pub mod error;
pub mod inputs;
pub mod integrity;
pub mod loader;
pub mod options;
pub mod project;
pub mod reader;
pub mod registry;
pub mod runlog;
pub mod sql;
pub mod store;
pub mod transform;
pub mod validation;

// Re-export commonly used types
pub use crate::config::{Env, Settings};
pub use error::{Error, Result};
pub use inputs::{InputTables, UnitOfMeasure};
pub use integrity::{check_foreign_keys, check_integrity, find_duplicate_keys, validate_primary_keys};
pub use loader::{delete_project_rows, DerivedTable, Loader, RowsInserted, TableRow};
pub use options::{DateForAnalysis, TransformOptions, WeekendDateRule};
pub use project::{BaseInfo, ExistingInfo, ProjectService, TransformResponse};
pub use reader::{cleanse, read_and_cleanse, CleanseReport, CleansedTable, RawTable};
pub use registry::{Cell, ColumnType, FileKind};
pub use runlog::{RunKind, RunLog};
pub use sql::SqlBundle;
pub use store::Store;
pub use transform::{transform, DerivedTables, TransformReport, Velocity, VelocityAnalysis};
pub use validation::{validate_directory, validate_file, DataDirectoryValidation, FileValidation, ValidationIssue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
