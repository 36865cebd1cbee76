//! Path classification into text and database targets

use super::error::{DiaryError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_NAME: &str = "diary.txt";
pub const DEFAULT_DB_NAME: &str = "diary.db";

const DATABASE_EXTENSIONS: [&str; 4] = ["db", "sql", "sqlite", "sqlite3"];
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "log"];

/// Where a logger writes: a text file, a database file, or both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub text: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

impl Targets {
    /// Resolve a logger path.
    ///
    /// - directory: `file_name` and `db_name` inside it
    /// - existing file: by name or extension; unknown extensions are rejected
    /// - nonexistent path: database extensions make a database, anything else text
    pub fn resolve(path: impl AsRef<Path>, file_name: &str, db_name: &str) -> Result<Self> {
        let path = path.as_ref();

        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Self {
                text: Some(path.join(file_name)),
                database: Some(path.join(db_name)),
            }),
            Ok(meta) if meta.is_file() => Self::classify_existing(path, file_name, db_name),
            Ok(_) => Err(DiaryError::classification(
                path,
                "was not found a directory or file",
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::classify_new(path)),
            Err(e) => Err(DiaryError::io_operation("inspecting", path, e)),
        }
    }

    /// The database path, or [`DiaryError::NoDatabase`] when none was resolved
    pub fn database_path(&self) -> Result<&Path> {
        self.database.as_deref().ok_or(DiaryError::NoDatabase)
    }

    fn classify_existing(path: &Path, file_name: &str, db_name: &str) -> Result<Self> {
        let tail = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        match extension(path) {
            None => Ok(Self::text(path)),
            Some(_) if tail == db_name => Ok(Self::database(path)),
            Some(ext) if is_database_extension(&ext) => Ok(Self::database(path)),
            Some(_) if tail == file_name => Ok(Self::text(path)),
            Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => Ok(Self::text(path)),
            Some(ext) => Err(DiaryError::classification(
                path,
                format!("unrecognized extension '{}'", ext),
            )),
        }
    }

    fn classify_new(path: &Path) -> Self {
        match extension(path) {
            Some(ext) if is_database_extension(&ext) => Self::database(path),
            _ => Self::text(path),
        }
    }

    fn text(path: &Path) -> Self {
        Self {
            text: Some(path.to_path_buf()),
            database: None,
        }
    }

    fn database(path: &Path) -> Self {
        Self {
            text: None,
            database: Some(path.to_path_buf()),
        }
    }
}

pub fn is_database_extension(ext: &str) -> bool {
    DATABASE_EXTENSIONS.contains(&ext)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}
