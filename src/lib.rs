//! # Diary
//!
//! A small embeddable logger that appends formatted lines to a text file
//! and inserts rows into a SQLite database, either from the calling thread
//! or from a single background writer thread.
//!
//! ## Features
//!
//! - **One path, two targets**: a directory gets `diary.txt` and `diary.db`;
//!   a file path is classified by its extension
//! - **Async by default**: callers enqueue, one writer thread owns the sinks,
//!   `close()` drains everything that was accepted
//! - **Severities with side effects**: WARN and ERROR can append a stack
//!   trace, ERROR can hand an error back to the caller after the record is
//!   persisted
//! - **Formatters**: built-in line formats, `{field}` templates, or closures
//!
//! ```no_run
//! use diary::prelude::*;
//!
//! let logger = Logger::open("logs/")?;
//! logger.info("hello")?;
//! logger.close()?;
//! # Ok::<(), diary::DiaryError>(())
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        DiaryError, DiaryMetrics, Formatter, IntoRecord, Level, LevelOptions, LineFormat, Log,
        Logger, LoggerBuilder, LoggerConfig, Producer, Record, Result, Severity, Template,
        WorkerState,
    };
    pub use crate::sinks::{DefaultSchema, Schema};
}

pub use crate::core::{
    BoxError, DiaryError, DiaryMetrics, ErrorFactory, FormatFn, Formatter, IntoRecord, Level,
    LevelOptions, LineFormat, Log, Logger, LoggerBuilder, LoggerConfig, Producer, Record, Result,
    Severity, Sink, Targets, Template, WorkerState, WriteErrorCallback,
};
pub use sinks::{ConsoleSink, DatabaseSink, DefaultSchema, FileSink, Schema};
