//! Logger facade

use super::{
    config::LoggerConfig,
    error::{DiaryError, Result},
    formatter::Formatter,
    metrics::DiaryMetrics,
    queue::DeliveryQueue,
    record::{IntoRecord, Record},
    severity::{LevelOptions, Severity},
    sink::{PendingSink, Sink, SinkSet},
    target::Targets,
    timer::RepeatedTimer,
    worker::{AsyncWriter, WorkerState, WriteContext, WriteErrorCallback},
};
use crate::sinks::{file::resolve_encoding, ConsoleSink, DatabaseSink, DefaultSchema, FileSink, Schema};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Logging operations shared by [`Logger`] and [`Producer`].
///
/// Implementors provide [`Log::log_with`]; the level wrappers set the
/// record's level before dispatching, so a prepared [`Record`] passed to
/// `warn` is logged as WARN whatever level it was built with.
pub trait Log {
    /// Wrap `content` in a record (existing records keep their level) and
    /// run it through `severity`.
    fn log_with(
        &self,
        content: impl IntoRecord,
        severity: &Severity,
        options: &LevelOptions,
    ) -> Result<()>;

    /// Whether `debug` calls are logged
    fn debug_enabled(&self) -> bool;

    fn log(&self, content: impl IntoRecord, severity: &Severity) -> Result<()> {
        self.log_with(content, severity, &LevelOptions::new())
    }

    fn info(&self, content: impl IntoRecord) -> Result<()> {
        self.info_with(content, &LevelOptions::new())
    }

    fn info_with(&self, content: impl IntoRecord, options: &LevelOptions) -> Result<()> {
        log_at(self, content, Severity::info(), options)
    }

    fn warn(&self, content: impl IntoRecord) -> Result<()> {
        self.warn_with(content, &LevelOptions::new())
    }

    fn warn_with(&self, content: impl IntoRecord, options: &LevelOptions) -> Result<()> {
        log_at(self, content, Severity::warn(), options)
    }

    fn error(&self, content: impl IntoRecord) -> Result<()> {
        self.error_with(content, &LevelOptions::new())
    }

    /// Log at ERROR; with [`LevelOptions::raises`] the record is persisted
    /// first and then returned to the caller as [`DiaryError::Raised`].
    fn error_with(&self, content: impl IntoRecord, options: &LevelOptions) -> Result<()> {
        log_at(self, content, Severity::error(), options)
    }

    fn debug(&self, content: impl IntoRecord) -> Result<()> {
        self.debug_with(content, &LevelOptions::new())
    }

    /// Log at DEBUG; nothing happens, not even record creation, when debug is disabled
    fn debug_with(&self, content: impl IntoRecord, options: &LevelOptions) -> Result<()> {
        if !self.debug_enabled() {
            return Ok(());
        }
        log_at(self, content, Severity::debug(), options)
    }
}

fn log_at<L: Log + ?Sized>(
    logger: &L,
    content: impl IntoRecord,
    severity: Severity,
    options: &LevelOptions,
) -> Result<()> {
    let level = severity.level().clone();
    let mut record = content.into_record(level.clone());
    record.set_level(level);
    logger.log_with(record, &severity, options)
}

/// Cloneable handle that logs through an async logger's delivery queue.
///
/// Timer callbacks receive one of these, so everything they log goes
/// through the queue and reaches the sinks on the writer thread.
#[derive(Clone)]
pub struct Producer {
    queue: DeliveryQueue,
    debug_enabled: bool,
}

impl Log for Producer {
    fn log_with(
        &self,
        content: impl IntoRecord,
        severity: &Severity,
        options: &LevelOptions,
    ) -> Result<()> {
        let record = content.into_record(severity.level().clone());
        severity.dispatch(record, |record| self.queue.add(record), options)
    }

    fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("stopped", &self.queue.is_stopped())
            .field("debug_enabled", &self.debug_enabled)
            .finish()
    }
}

enum Delivery {
    /// Sinks written by the calling thread; `None` once closed
    Sync(Mutex<Option<SinkSet>>),
    Async(AsyncWriter),
}

/// Writes records to a text file, a SQLite database, or both.
///
/// # Example
///
/// ```no_run
/// use diary::prelude::*;
///
/// let logger = Logger::builder("logs/").build()?;
/// logger.info("service started")?;
/// logger.warn_with("disk almost full", &LevelOptions::new().log_trace(true))?;
/// logger.close()?;
/// # Ok::<(), diary::DiaryError>(())
/// ```
pub struct Logger {
    targets: Targets,
    debug_enabled: bool,
    delivery: Delivery,
    timer: Mutex<TimerSlot>,
    context: WriteContext,
}

/// The running timer; `closed` refuses new ones once close has begun
#[derive(Default)]
struct TimerSlot {
    timer: Option<RepeatedTimer>,
    closed: bool,
}

impl Logger {
    /// Create a builder for a logger at `path`
    ///
    /// `path` may be a directory (both a text file and a database are
    /// created inside it), an existing text or database file, or a path
    /// that does not exist yet (classified by its extension).
    #[must_use]
    pub fn builder(path: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(path)
    }

    /// Build a logger at `path` with the default configuration
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(path).build()
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// The database target, or [`DiaryError::NoDatabase`]
    pub fn database_path(&self) -> Result<&Path> {
        self.targets.database_path()
    }

    pub fn is_async(&self) -> bool {
        matches!(self.delivery, Delivery::Async(_))
    }

    pub fn metrics(&self) -> &DiaryMetrics {
        &self.context.metrics
    }

    /// The last record that went through the sinks
    pub fn last_logged(&self) -> Option<Record> {
        self.context.last_logged.lock().clone()
    }

    pub fn worker_state(&self) -> WorkerState {
        match self.delivery {
            Delivery::Async(ref writer) => writer.state(),
            Delivery::Sync(ref sinks) => {
                if sinks.lock().is_some() {
                    WorkerState::NotStarted
                } else {
                    WorkerState::Stopped
                }
            }
        }
    }

    /// A handle feeding this logger's queue from other threads
    pub fn producer(&self) -> Result<Producer> {
        match self.delivery {
            Delivery::Async(ref writer) => Ok(Producer {
                queue: writer.queue().clone(),
                debug_enabled: self.debug_enabled,
            }),
            Delivery::Sync(_) => Err(DiaryError::async_required("create a producer")),
        }
    }

    /// Run `func` every `interval` on a timer thread, replacing any previous timer.
    ///
    /// Only available in async mode. The callback logs through the
    /// [`Producer`] it is given; its errors are reported on stderr.
    pub fn set_timer<F>(&self, interval: Duration, mut func: F) -> Result<()>
    where
        F: FnMut(&Producer) -> Result<()> + Send + 'static,
    {
        let producer = match self.producer() {
            Ok(producer) => producer,
            Err(_) => return Err(DiaryError::async_required("set a timer")),
        };

        // Checked and installed under the slot lock so close cannot slip in between
        let mut slot = self.timer.lock();
        if slot.closed || producer.queue.is_stopped() {
            return Err(DiaryError::LoggerStopped);
        }

        let metrics = Arc::clone(&self.context.metrics);
        let timer = RepeatedTimer::start(interval, move || {
            metrics.record_timer_tick();
            if let Err(e) = func(&producer) {
                eprintln!("[DIARY ERROR] Timer callback failed: {}", e);
            }
        })?;

        let previous = slot.timer.replace(timer);
        drop(slot);
        if let Some(mut previous) = previous {
            previous.cancel();
        }
        Ok(())
    }

    /// Stop the timer, if one is running
    pub fn cancel_timer(&self) {
        let timer = self.timer.lock().timer.take();
        if let Some(mut timer) = timer {
            timer.cancel();
        }
    }

    /// Stop the timer, write every pending record and release the sinks.
    ///
    /// Safe to call more than once; later calls return immediately. Logging
    /// after close fails with [`DiaryError::LoggerStopped`].
    pub fn close(&self) -> Result<()> {
        let timer = {
            let mut slot = self.timer.lock();
            slot.closed = true;
            slot.timer.take()
        };
        if let Some(mut timer) = timer {
            timer.cancel();
        }

        match self.delivery {
            Delivery::Async(ref writer) => writer.join(),
            Delivery::Sync(ref sinks) => {
                let sinks = sinks.lock().take();
                match sinks {
                    Some(mut sinks) => sinks.close_all(),
                    None => Ok(()),
                }
            }
        }
    }

    fn write_now(&self, sinks: &Mutex<Option<SinkSet>>, record: Record) -> Result<()> {
        let mut guard = sinks.lock();
        let sinks = guard.as_mut().ok_or(DiaryError::LoggerStopped)?;

        let result = sinks
            .write_strict(&record)
            .and_then(|()| sinks.flush_all());
        match result {
            Ok(()) => {
                self.context.metrics.record_written();
                *self.context.last_logged.lock() = Some(record);
            }
            Err(_) => {
                self.context.metrics.record_failed();
                self.context.metrics.record_write_failure();
            }
        }
        result
    }
}

impl Log for Logger {
    fn log_with(
        &self,
        content: impl IntoRecord,
        severity: &Severity,
        options: &LevelOptions,
    ) -> Result<()> {
        let record = content.into_record(severity.level().clone());
        match self.delivery {
            Delivery::Async(ref writer) => {
                severity.dispatch(record, |record| writer.queue().add(record), options)
            }
            Delivery::Sync(ref sinks) => {
                severity.dispatch(record, |record| self.write_now(sinks, record), options)
            }
        }
    }

    fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("targets", &self.targets)
            .field("async", &self.is_async())
            .field("debug_enabled", &self.debug_enabled)
            .field("worker_state", &self.worker_state())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[DIARY ERROR] Failed to close logger: {}", e);
        }

        let failed = self.context.metrics.failed();
        if failed > 0 {
            eprintln!(
                "[DIARY WARNING] Logger shut down with {} records not fully written",
                failed
            );
        }
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```no_run
/// use diary::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder("service.log")
///     .async_mode(false)
///     .debug_enabled(false)
///     .formatter(Formatter::template("{level} {timestamp:%H:%M:%S} {payload}")?)
///     .on_write_error(Arc::new(|err, _record| eprintln!("ALERT: {}", err)))
///     .build()?;
/// # Ok::<(), diary::DiaryError>(())
/// ```
pub struct LoggerBuilder {
    path: PathBuf,
    config: LoggerConfig,
    formatter: Option<Formatter>,
    schema: Arc<dyn Schema>,
    on_write_error: Option<WriteErrorCallback>,
}

impl LoggerBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: LoggerConfig::default(),
            formatter: None,
            schema: Arc::new(DefaultSchema),
            on_write_error: None,
        }
    }

    /// Replace every serializable setting at once
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.config.db_name = name.into();
        self
    }

    /// Write from a background thread (default) or from the calling thread
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, enabled: bool) -> Self {
        self.config.async_mode = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn debug_enabled(mut self, enabled: bool) -> Self {
        self.config.debug_enabled = enabled;
        self
    }

    /// Text file encoding label, e.g. `utf-8`, `latin1`, `shift_jis`
    #[must_use = "builder methods return a new value"]
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.config.encoding = label.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn also_print(mut self, enabled: bool) -> Self {
        self.config.also_print = enabled;
        self
    }

    /// Default formatter for records that carry none; overrides `config.format`
    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Table layout for the database sink
    #[must_use = "builder methods return a new value"]
    pub fn schema<S: Schema + 'static>(mut self, schema: S) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    /// Called for every sink failure on the writer thread
    #[must_use = "builder methods return a new value"]
    pub fn on_write_error(mut self, callback: WriteErrorCallback) -> Self {
        self.on_write_error = Some(callback);
        self
    }

    /// Resolve the path, open the sinks and start the writer in async mode
    pub fn build(self) -> Result<Logger> {
        let config = self.config;
        config.validate()?;

        let targets = Targets::resolve(&self.path, &config.file_name, &config.db_name)?;
        let formatter = match self.formatter {
            Some(formatter) => formatter,
            None => config.formatter()?,
        };

        let mut context = WriteContext::new(Arc::new(DiaryMetrics::new()));
        context.on_write_error = self.on_write_error;

        let mut pending = Vec::new();
        if let Some(ref text) = targets.text {
            let encoding = resolve_encoding(&config.encoding)?;
            pending.push(PendingSink::ready(FileSink::with_encoding(
                text,
                formatter.clone(),
                encoding,
            )?));
        }
        if let Some(ref database) = targets.database {
            DatabaseSink::touch(database)?;
            if config.async_mode {
                // The connection is opened by the writer thread that will own it
                let path = database.clone();
                let schema = Arc::clone(&self.schema);
                pending.push(PendingSink::deferred("database", move || {
                    let sink = DatabaseSink::with_schema(path, schema)?;
                    Ok(Box::new(sink) as Box<dyn Sink>)
                }));
            } else {
                let sink = DatabaseSink::with_schema(targets.database_path()?, self.schema)?;
                pending.push(PendingSink::ready(sink));
            }
        }
        if config.also_print {
            pending.push(PendingSink::ready(ConsoleSink::new(formatter)));
        }

        let delivery = if config.async_mode {
            Delivery::Async(AsyncWriter::spawn(pending, context.clone())?)
        } else {
            Delivery::Sync(Mutex::new(Some(SinkSet::open_strict(pending)?)))
        };

        Ok(Logger {
            targets,
            debug_enabled: config.debug_enabled,
            delivery,
            timer: Mutex::new(TimerSlot::default()),
            context,
        })
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("formatter", &self.formatter)
            .finish()
    }
}
