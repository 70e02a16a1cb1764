// 🔌 Store adapter - SQLite connection with retrying connect
//
// The connection string is pre-resolved (a database path, optionally with a
// `sqlite://` prefix). The connection closes when the Store is dropped.

use crate::error::{Error, Result};
use crate::sql::{SqlBundle, SCHEMA};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use tracing::{debug, info, warn};

pub struct Store {
    conn: Connection,
    location: String,
}

fn database_path(connection_string: &str) -> &str {
    connection_string
        .strip_prefix("sqlite://")
        .unwrap_or(connection_string)
}

fn open(path: &str) -> rusqlite::Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
    let conn = Connection::open_with_flags(path, flags)?;
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(conn)
}

impl Store {
    /// Open the store, retrying immediately up to `attempts` times, then
    /// apply the bundle's schema script.
    pub fn connect(connection_string: &str, attempts: u32, bundle: &SqlBundle) -> Result<Store> {
        let path = database_path(connection_string);
        let attempts = attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match open(path) {
                Ok(conn) => {
                    conn.execute_batch(bundle.get(SCHEMA)?)?;
                    info!(store = path, attempt, "store connected");
                    return Ok(Store {
                        conn,
                        location: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!(store = path, attempt, error = %e, "store connection failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::StoreUnavailable {
            attempts,
            reason: last_error,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Run one parameterised statement; returns rows changed
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    /// Run one statement once per parameter row; returns rows changed
    pub fn execute_many(&self, sql: &str, rows: &[Vec<Value>]) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut changed = 0;
        for row in rows {
            changed += stmt.execute(params_from_iter(row.iter()))?;
        }
        Ok(changed)
    }

    /// First row mapped through `map`, if any
    pub fn query_row<T>(
        &self,
        sql: &str,
        params: &[Value],
        map: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        Ok(self
            .conn
            .query_row(sql, params_from_iter(params.iter()), map)
            .optional()?)
    }

    /// First column of every row, as text
    pub fn query_strings(&self, sql: &str, params: &[Value]) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?;
        let values = rows.collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(values)
    }

    // ========================================================================
    // EXPLICIT TRANSACTIONS
    // ========================================================================

    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
        debug!(store = %self.location, "store connection released");
    }
}
