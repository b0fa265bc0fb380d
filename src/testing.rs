//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry their own
//! copy of the schema.

use rusqlite::Connection;
use tempfile::TempDir;

/// Card store in a temporary directory, removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// srs.db connection with the full schema
    pub conn: Connection,
}

impl TestEnv {
    /// Create a test environment using `crate::db::schema::run_migrations()`.
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("srs.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Open a second connection to the same database file.
    pub fn open_connection(&self) -> rusqlite::Result<Connection> {
        Connection::open(self.temp.path().join("srs.db"))
    }
}
