//! Core logger types and traits

pub mod config;
pub mod error;
pub mod formatter;
pub mod level;
pub mod line_format;
pub mod logger;
pub mod metrics;
pub mod queue;
pub mod record;
pub mod severity;
pub mod sink;
pub mod target;
pub mod timer;
pub mod worker;

pub use config::LoggerConfig;
pub use error::{BoxError, DiaryError, Result};
pub use formatter::{FormatFn, Formatter, Template};
pub use level::Level;
pub use line_format::LineFormat;
pub use logger::{Log, Logger, LoggerBuilder, Producer};
pub use metrics::DiaryMetrics;
pub use queue::{DeliveryQueue, Message};
pub use record::{display_timestamp, IntoRecord, Record};
pub use severity::{ErrorFactory, Handler, LevelOptions, Severity};
pub use sink::{PendingSink, Sink, SinkOpener, SinkSet};
pub use target::{Targets, DEFAULT_DB_NAME, DEFAULT_FILE_NAME};
pub use timer::RepeatedTimer;
pub use worker::{AsyncWriter, WorkerState, WriteContext, WriteErrorCallback};
