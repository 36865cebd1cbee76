//! SQLite database sink

use crate::core::{DiaryError, Record, Result, Sink};
use rusqlite::{params, Connection};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// SQL for creating the logs table
const CREATE_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS logs (inputDT TIMESTAMP, level TEXT, log TEXT)
";

/// SQL for inserting a record
const INSERT_LOG_SQL: &str = r"
INSERT INTO logs (inputDT, level, log) VALUES (?1, ?2, ?3)
";

/// Table layout for records.
///
/// Override it when records carry extension fields that deserve their own
/// columns.
pub trait Schema: Send + Sync {
    /// Create the table, keeping an existing one
    fn create_table(&self, conn: &Connection) -> Result<()>;

    fn insert(&self, conn: &Connection, record: &Record) -> Result<()>;
}

/// `logs(inputDT TIMESTAMP, level TEXT, log TEXT)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchema;

impl Schema for DefaultSchema {
    fn create_table(&self, conn: &Connection) -> Result<()> {
        conn.execute(CREATE_TABLE_SQL, params![])?;
        Ok(())
    }

    fn insert(&self, conn: &Connection, record: &Record) -> Result<()> {
        let mut stmt = conn.prepare_cached(INSERT_LOG_SQL)?;
        stmt.execute(params![
            record.timestamp,
            record.level.to_string(),
            record.payload_text()
        ])?;
        Ok(())
    }
}

/// Inserts one row per record; every insert commits on its own
pub struct DatabaseSink {
    path: PathBuf,
    conn: Option<Connection>,
    schema: Arc<dyn Schema>,
}

impl DatabaseSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_schema(path, Arc::new(DefaultSchema))
    }

    /// Open the database and make sure the schema's table exists
    pub fn with_schema(path: impl Into<PathBuf>, schema: Arc<dyn Schema>) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open(&path)?;
        schema.create_table(&conn)?;

        Ok(Self {
            path,
            conn: Some(conn),
            schema,
        })
    }

    /// Create an empty database file without connecting to it
    pub fn touch(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DiaryError::io_operation("creating database file", path, e))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }
}

impl Sink for DatabaseSink {
    fn write(&mut self, record: &Record) -> Result<()> {
        let conn = self.conn.as_ref().ok_or(DiaryError::LoggerStopped)?;
        self.schema.insert(conn, record)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "database"
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| DiaryError::Database(e))?;
        }
        Ok(())
    }
}
