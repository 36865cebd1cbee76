//! Severity level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Classification of a record's importance.
///
/// The four built-in levels have dedicated dispatch behavior (see
/// [`Severity`](super::severity::Severity)); any other name is carried as
/// `Custom` and stringified upper-case. Levels compare by name, so a
/// `Custom("ERROR")` built by hand is still equal to `Level::Error`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum Level {
    #[default]
    Info,
    Warn,
    Error,
    Debug,
    Custom(String),
}

impl Level {
    /// Create a level by name; built-in names give the built-in level
    pub fn custom(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        name.parse()
            .unwrap_or_else(|_| Level::Custom(name.trim().to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Debug => "DEBUG",
            Level::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Level::Custom(_))
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self.as_str() {
            "DEBUG" => Blue,
            "INFO" => Green,
            "WARN" => Yellow,
            "ERROR" => Red,
            _ => Magenta,
        }
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Level {}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_uppercase();
        match name.as_str() {
            "" => Err(format!("Invalid level: '{}'", s)),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "DEBUG" => Ok(Level::Debug),
            _ => Ok(Level::Custom(name)),
        }
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Level::custom(s)
    }
}
