//! Error types for the diary logger

use std::path::Path;

pub type Result<T> = std::result::Result<T, DiaryError>;

/// Boxed error produced by an ERROR handler that raises
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    /// IO error with context
    #[error("IO error while {operation} '{path}': {source}")]
    IoOperation {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error from the database sink
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Path could not be resolved to a text or database target
    #[error("Could not resolve '{path}' to a database or text file: {reason}")]
    Classification { path: String, reason: String },

    /// Formatter rejected when it was set
    #[error("Could not identify formatter {formatter:?}: {reason}")]
    InvalidFormatter { formatter: String, reason: String },

    /// Template placeholder names a field the record does not have
    #[error("Template references missing field '{field}'")]
    MissingField { field: String },

    /// Record has no formatter to render with
    #[error("Record has no formatter; use its debug representation instead")]
    FormatterUnavailable,

    /// Operation needs the background writer
    #[error("In order to {operation} async mode must be enabled")]
    AsyncRequired { operation: String },

    /// A sink panicked while handling a record
    #[error("Sink '{sink}' panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// The writer thread panicked
    #[error("Writer thread panicked: {0}")]
    WriterPanicked(String),

    /// Database requested without a database target
    #[error("Cannot set a database without a database file")]
    NoDatabase,

    /// Logger already closed
    #[error("Logger already closed")]
    LoggerStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Error raised on purpose by a severity handler
    #[error("{0}")]
    Raised(#[source] BoxError),
}

impl DiaryError {
    /// Create an IO operation error with path context
    pub fn io_operation(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        DiaryError::IoOperation {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Create a path classification error
    pub fn classification(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        DiaryError::Classification {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid formatter error
    pub fn invalid_formatter(formatter: impl Into<String>, reason: impl Into<String>) -> Self {
        DiaryError::InvalidFormatter {
            formatter: formatter.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing template field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        DiaryError::MissingField {
            field: field.into(),
        }
    }

    /// Create an async-mode-required error
    pub fn async_required(operation: impl Into<String>) -> Self {
        DiaryError::AsyncRequired {
            operation: operation.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        DiaryError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised on purpose by a severity handler
    pub fn is_raised(&self) -> bool {
        matches!(self, DiaryError::Raised(_))
    }

    /// Borrow the raised error as a concrete type
    pub fn raised_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            DiaryError::Raised(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DiaryError::classification("/tmp/app.csv", "unknown extension 'csv'");
        assert!(matches!(err, DiaryError::Classification { .. }));

        let err = DiaryError::config("encoding", "unknown label");
        assert!(matches!(err, DiaryError::InvalidConfiguration { .. }));

        let err = DiaryError::missing_field("user");
        assert!(matches!(err, DiaryError::MissingField { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = DiaryError::classification("/tmp/app.csv", "unknown extension 'csv'");
        assert_eq!(
            err.to_string(),
            "Could not resolve '/tmp/app.csv' to a database or text file: unknown extension 'csv'"
        );

        let err = DiaryError::invalid_formatter("{payload", "unclosed placeholder");
        assert_eq!(
            err.to_string(),
            "Could not identify formatter \"{payload\": unclosed placeholder"
        );

        assert_eq!(
            DiaryError::async_required("set a timer").to_string(),
            "In order to set a timer async mode must be enabled"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = DiaryError::io_operation("opening log file", "/var/log/diary.txt", io_err);

        assert!(matches!(err, DiaryError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("/var/log/diary.txt"));
    }

    #[test]
    fn test_raised_downcast() {
        #[derive(Debug, thiserror::Error)]
        #[error("quota exceeded: {0}")]
        struct QuotaError(String);

        let err = DiaryError::Raised(Box::new(QuotaError("disk".into())));
        assert!(err.is_raised());
        assert_eq!(err.to_string(), "quota exceeded: disk");
        assert!(err.raised_as::<QuotaError>().is_some());
        assert!(DiaryError::NoDatabase.raised_as::<QuotaError>().is_none());
    }
}
