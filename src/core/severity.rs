//! Severity dispatch
//!
//! A [`Severity`] composes a level's handler with whatever reporter the logger
//! supplies at call time. The handler may mutate the record (appending a stack
//! trace) and may fail on purpose (ERROR with `raises`); either way the record
//! is handed to the reporter exactly once before the handler's outcome reaches
//! the caller. Handler panics are reported the same way and then resumed.

use super::error::{BoxError, DiaryError, Result};
use super::level::Level;
use super::record::Record;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Builds the error an ERROR handler raises from the record payload
pub type ErrorFactory = Arc<dyn Fn(String) -> BoxError + Send + Sync>;

/// Level-specific side effect run before the record is reported
pub type Handler = Arc<dyn Fn(&mut Record, &LevelOptions) -> Result<()> + Send + Sync>;

/// Per-call options for severity handlers
#[derive(Clone, Default)]
pub struct LevelOptions {
    /// Append the current call stack to the payload (WARN, ERROR)
    pub log_trace: bool,
    /// Raise after reporting (ERROR)
    pub raises: Option<ErrorFactory>,
}

impl LevelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that make ERROR raise a plain error carrying the payload
    pub fn raising() -> Self {
        Self::new().raises()
    }

    #[must_use]
    pub fn log_trace(mut self, enabled: bool) -> Self {
        self.log_trace = enabled;
        self
    }

    #[must_use]
    pub fn raises(self) -> Self {
        self.raises_with(|message| message.into())
    }

    /// Raise an error of the caller's choosing, built from the payload text
    #[must_use]
    pub fn raises_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(String) -> BoxError + Send + Sync + 'static,
    {
        self.raises = Some(Arc::new(factory));
        self
    }
}

impl fmt::Debug for LevelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelOptions")
            .field("log_trace", &self.log_trace)
            .field("raises", &self.raises.is_some())
            .finish()
    }
}

/// A level paired with its handler.
///
/// Stateless apart from the shared handler, so one value can be dispatched
/// any number of times from any number of threads.
#[derive(Clone)]
pub struct Severity {
    level: Level,
    handler: Handler,
}

impl Severity {
    /// Compose a handler into a dispatchable severity
    pub fn new<H>(level: Level, handler: H) -> Self
    where
        H: Fn(&mut Record, &LevelOptions) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            level,
            handler: Arc::new(handler),
        }
    }

    pub fn info() -> Self {
        Self::new(Level::Info, |_, _| Ok(()))
    }

    pub fn warn() -> Self {
        Self::new(Level::Warn, |record, options| {
            if options.log_trace {
                append_trace(record);
            }
            Ok(())
        })
    }

    pub fn error() -> Self {
        Self::new(Level::Error, |record, options| {
            if options.log_trace {
                append_trace(record);
            }
            match options.raises {
                Some(ref factory) => Err(DiaryError::Raised(factory(record.payload_text()))),
                None => Ok(()),
            }
        })
    }

    pub fn debug() -> Self {
        Self::new(Level::Debug, |_, _| Ok(()))
    }

    /// Severity for a caller-defined level, without side effects
    pub fn custom(name: impl AsRef<str>) -> Self {
        Self::new(Level::custom(name), |_, _| Ok(()))
    }

    /// Built-in severity for a level; custom levels get a no-op handler
    pub fn for_level(level: &Level) -> Self {
        match Level::custom(level.as_str()) {
            Level::Info => Self::info(),
            Level::Warn => Self::warn(),
            Level::Error => Self::error(),
            Level::Debug => Self::debug(),
            custom @ Level::Custom(_) => Self::new(custom, |_, _| Ok(())),
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Run the handler, report the record, then surface the handler's outcome.
    ///
    /// A reporter failure wins over a handler failure: the record was not
    /// persisted, which is what the caller needs to hear about.
    pub fn dispatch<R>(&self, mut record: Record, reporter: R, options: &LevelOptions) -> Result<()>
    where
        R: FnOnce(Record) -> Result<()>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(&mut record, options)));
        let reported = reporter(record);

        match outcome {
            Ok(handled) => {
                reported?;
                handled
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl fmt::Debug for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Severity").field("level", &self.level).finish()
    }
}

fn append_trace(record: &mut Record) {
    let trace = Backtrace::force_capture();
    record.append_to_payload(&format!("Stack trace:\n{}", trace));
}
