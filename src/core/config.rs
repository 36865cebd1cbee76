//! Serializable logger configuration
//!
//! Everything a logger needs that can live in a JSON file. Values that
//! cannot be serialized (custom formatter functions, database schemas,
//! callbacks) are set on [`crate::LoggerBuilder`] instead.
//!
//! ```
//! use diary::LoggerConfig;
//!
//! let config = LoggerConfig::from_json(r#"{ "async_mode": false, "format": "minimal" }"#).unwrap();
//! assert!(!config.async_mode);
//! assert_eq!(config.file_name, "diary.txt");
//! ```

use super::error::{DiaryError, Result};
use super::formatter::Formatter;
use super::target::{DEFAULT_DB_NAME, DEFAULT_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Text file name used when the logger path is a directory
    pub file_name: String,
    /// Database file name used when the logger path is a directory
    pub db_name: String,
    /// Write from a background thread
    pub async_mode: bool,
    /// When false, `debug` calls are dropped before a record exists
    pub debug_enabled: bool,
    /// WHATWG label of the text file encoding
    pub encoding: String,
    /// Echo every record to the terminal after the file and database
    pub also_print: bool,
    /// Line format name (`standard`, `minimal`, `alarms`, `easy_read`, `json`) or a template
    pub format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            async_mode: true,
            debug_enabled: true,
            encoding: "utf-8".to_string(),
            also_print: false,
            format: "standard".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field that can be wrong without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(DiaryError::config("file_name", "must not be empty"));
        }
        if self.db_name.trim().is_empty() {
            return Err(DiaryError::config("db_name", "must not be empty"));
        }
        if self.file_name == self.db_name {
            return Err(DiaryError::config(
                "db_name",
                "text file and database must have different names",
            ));
        }
        crate::sinks::file::resolve_encoding(&self.encoding)?;
        self.formatter()?;
        Ok(())
    }

    /// The default formatter described by `format`
    pub fn formatter(&self) -> Result<Formatter> {
        Formatter::from_str(&self.format)
    }
}
