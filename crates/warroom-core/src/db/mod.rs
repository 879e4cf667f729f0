//! SQLite persistence for runs, templates and the local directory.
//!
//! Each call opens its own connection on a blocking thread (see
//! [`with_database`]); writes that must be seen together run in one
//! transaction. Query modules extend [`Database`] with focused `impl` blocks.

use std::path::{Path, PathBuf};

use rusqlite::{types::Type, Connection};
use tokio::task;

use crate::error::{DatabaseResultExt, Result, RunError};

pub mod directory_queries;
pub mod migrations;
pub mod playbook_queries;
pub mod run_queries;
pub mod status_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Runs `op` against a fresh connection on the blocking pool.
pub async fn with_database<T, F>(db_path: &Path, op: F) -> Result<T>
where
    F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db_path: PathBuf = db_path.to_path_buf();
    task::spawn_blocking(move || {
        let mut db = Database::new(&db_path)?;
        op(&mut db)
    })
    .await
    .map_err(|e| RunError::Configuration {
        message: format!("Task join error: {e}"),
    })?
}

/// Reads a JSON text column into `T`.
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Fixed-width RFC 3339 text, so stored timestamps sort chronologically.
pub(crate) fn timestamp_text(ts: jiff::Timestamp) -> String {
    format!("{ts:.9}")
}

/// Reads an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<jiff::Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<jiff::Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable RFC 3339 timestamp column.
pub(crate) fn optional_timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<jiff::Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| {
            raw.parse::<jiff::Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Reads a text column through `FromStr`.
pub(crate) fn parsed_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })
}
