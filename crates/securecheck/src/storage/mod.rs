//! Storage layer for securecheck.
//!
//! This module owns the `SQLite` connection holding the `traffic_stops` table.
//! It creates and migrates the schema, bulk-loads records, and executes
//! arbitrary statements into [`QueryResult`]s for the access layer.

pub mod import;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::access::{QueryExecutor, QueryResult, Value};
use crate::error::{Error, Result};
use crate::record::StopRecord;

pub use import::{import_csv, ImportOptions, ImportSummary};

const MEMORY_PATH: &str = ":memory:";

const INSERT_STOP: &str = r"
INSERT INTO traffic_stops (
    stop_date, stop_time, country_name, driver_gender, driver_age, driver_race,
    is_arrested, search_conducted, search_type, stop_duration, drugs_related_stop,
    violation, stop_outcome, vehicle_number
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
";

/// The traffic stop database.
///
/// Wraps a single connection that lives for the whole session.
#[derive(Debug)]
pub struct Database {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert many records in a single transaction.
    ///
    /// With `replace` set, existing rows are deleted first. Either every
    /// record lands or none do.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; the transaction is rolled back.
    pub fn insert_all<'a>(
        &self,
        records: impl IntoIterator<Item = &'a StopRecord>,
        replace: bool,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        if replace {
            let removed = tx.execute("DELETE FROM traffic_stops", [])?;
            debug!("Removed {} existing stops", removed);
        }

        let mut inserted = 0;
        for record in records {
            insert_with(&tx, record)?;
            inserted += 1;
        }
        tx.commit()?;

        info!("Inserted {} stops", inserted);
        Ok(inserted)
    }

    /// Count stored stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM traffic_stops", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_stops = self.count()?;
        let countries: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT country_name) FROM traffic_stops",
            [],
            |row| row.get(0),
        )?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_stops,
            countries,
            db_size_bytes,
        })
    }
}

fn insert_with(conn: &Connection, record: &StopRecord) -> Result<()> {
    conn.execute(
        INSERT_STOP,
        params![
            record.stop_date,
            record.stop_time,
            record.country_name,
            record.driver_gender,
            record.driver_age,
            record.driver_race,
            record.is_arrested,
            record.search_conducted,
            record.search_type,
            record.stop_duration,
            record.drugs_related_stop,
            record.violation,
            record.stop_outcome,
            record.vehicle_number,
        ],
    )?;
    Ok(())
}

impl QueryExecutor for Database {
    fn execute(&self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i)?));
            }
            rows.push(values);
        }

        debug!("Statement returned {} rows", rows.len());
        Ok(QueryResult::new(columns, rows))
    }
}

/// Statistics about the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of stored stops.
    pub total_stops: i64,
    /// Number of distinct countries.
    pub countries: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
