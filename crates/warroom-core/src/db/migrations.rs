//! Database schema initialization and migrations.

use std::time::Duration;

use crate::error::{DatabaseResultExt, Result};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        self.connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Brings databases created by earlier releases up to date.
    fn apply_migrations(&self) -> Result<()> {
        self.ensure_column("playbook_runs", "last_status_update_at", "TEXT")?;
        self.ensure_column("posts", "ephemeral", "INTEGER NOT NULL DEFAULT 0")?;
        Ok(())
    }

    fn ensure_column(&self, table: &str, column: &str, definition: &str) -> Result<()> {
        let exists: bool = self
            .connection
            .query_row(
                &format!("SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name = ?1"),
                [column],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .db_context("Failed to inspect table columns")?;

        if !exists {
            self.connection
                .execute(
                    &format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"),
                    [],
                )
                .db_context(&format!("Failed to add {column} column to {table} table"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::Database;

    #[test]
    fn test_schema_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("schema.db");

        Database::new(&path).expect("Failed to create database");
        Database::new(&path).expect("Failed to reopen database");
    }
}
