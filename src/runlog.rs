// 📝 Run Log - one human-readable log file per invocation
//
// File name: {PN}-{YYYYMMDD-HH.MM.SS}_{transform|delete_from_output_tables}.txt,
// with a -2, -3, ... suffix when the name is already taken

use crate::error::Result;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, LineWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Transform,
    DeleteFromOutputTables,
}

impl RunKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            RunKind::Transform => "transform",
            RunKind::DeleteFromOutputTables => "delete_from_output_tables",
        }
    }
}

/// Create `{stem}.txt`, or `{stem}-2.txt`, `{stem}-3.txt`, ... when an
/// earlier invocation in the same second took the name
fn open_unique(dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let mut n = 1;
    loop {
        let name = if n == 1 {
            format!("{}.txt", stem)
        } else {
            format!("{}-{}.txt", stem, n)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Line-buffered log file; flushed at phase boundaries and closed on drop
pub struct RunLog {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl RunLog {
    pub fn create(dir: &Path, project_number: &str, kind: RunKind) -> Result<RunLog> {
        fs::create_dir_all(dir)?;

        let stamp = Local::now().format("%Y%m%d-%H.%M.%S").to_string();
        let (path, file) = open_unique(dir, &format!("{}-{}_{}", project_number, stamp, kind.suffix()))?;

        debug!(log = %path.display(), "run log opened");
        Ok(RunLog {
            path,
            writer: LineWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Write failures are reported through
    /// tracing and never abort the run.
    pub fn line(&mut self, message: impl AsRef<str>) {
        let stamp = Local::now().format("%H:%M:%S%.3f");
        if let Err(e) = writeln!(self.writer, "{}  {}", stamp, message.as_ref()) {
            warn!(log = %self.path.display(), error = %e, "run log write failed");
        }
    }

    pub fn banner(&mut self, title: &str) {
        self.line(format!("==================== {} ====================", title));
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(log = %self.path.display(), error = %e, "run log flush failed");
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_file_name_and_content() {
        let dir = tempdir().unwrap();
        let path = {
            let mut log = RunLog::create(dir.path(), "P100", RunKind::Transform).unwrap();
            log.banner("VALIDATE");
            log.line("ItemMaster.csv: 2 rows");
            log.path().to_path_buf()
        };

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("P100-"));
        assert!(name.ends_with("_transform.txt"));
        // P100-YYYYMMDD-HH.MM.SS_transform.txt
        assert_eq!(name.len(), "P100-".len() + 17 + "_transform.txt".len());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("VALIDATE"));
        assert!(content.contains("ItemMaster.csv: 2 rows"));
    }

    #[test]
    fn test_same_second_runs_get_separate_files() {
        let dir = tempdir().unwrap();
        let first = RunLog::create(dir.path(), "P7", RunKind::Transform).unwrap();
        let second = RunLog::create(dir.path(), "P7", RunKind::Transform).unwrap();
        assert_ne!(first.path(), second.path());

        let taken = dir.path().join("P7-20240101-00.00.00_transform.txt");
        fs::write(&taken, "earlier run\n").unwrap();
        let (path, _) = open_unique(dir.path(), "P7-20240101-00.00.00_transform").unwrap();
        assert_eq!(path, dir.path().join("P7-20240101-00.00.00_transform-2.txt"));
        assert_eq!(fs::read_to_string(&taken).unwrap(), "earlier run\n");
    }

    #[test]
    fn test_delete_suffix() {
        assert_eq!(RunKind::DeleteFromOutputTables.suffix(), "delete_from_output_tables");
    }
}
