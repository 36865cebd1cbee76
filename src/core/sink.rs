//! Sink trait and the ordered set of sinks a logger writes to

use super::error::{panic_message, DiaryError, Result};
use super::record::Record;
use std::panic::{self, AssertUnwindSafe};

/// A persistence target for finished records.
///
/// Sinks are owned by exactly one thread at a time (the writer thread in
/// async mode), so they only need to be `Send`.
pub trait Sink: Send {
    fn write(&mut self, record: &Record) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;

    /// Release the underlying handle; called once after the last write
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}

/// Opens a sink on the thread that will own it
pub type SinkOpener = Box<dyn FnOnce() -> Result<Box<dyn Sink>> + Send>;

/// A sink that is either open already or will be opened by its owner
pub enum PendingSink {
    Ready(Box<dyn Sink>),
    Deferred { name: String, open: SinkOpener },
}

impl PendingSink {
    pub fn ready<S: Sink + 'static>(sink: S) -> Self {
        PendingSink::Ready(Box::new(sink))
    }

    pub fn deferred<F>(name: impl Into<String>, open: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Sink>> + Send + 'static,
    {
        PendingSink::Deferred {
            name: name.into(),
            open: Box::new(open),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PendingSink::Ready(sink) => sink.name(),
            PendingSink::Deferred { name, .. } => name,
        }
    }
}

/// Sinks in write order (file, database, console)
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn Sink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every pending sink; sinks that fail to open are reported and skipped
    pub fn open<F>(pending: Vec<PendingSink>, mut on_error: F) -> Self
    where
        F: FnMut(&str, DiaryError),
    {
        let mut set = Self::new();
        for sink in pending {
            match sink {
                PendingSink::Ready(sink) => set.sinks.push(sink),
                PendingSink::Deferred { name, open } => match open() {
                    Ok(sink) => set.sinks.push(sink),
                    Err(e) => on_error(&name, e),
                },
            }
        }
        set
    }

    /// Open every pending sink, failing on the first error
    pub fn open_strict(pending: Vec<PendingSink>) -> Result<Self> {
        let mut set = Self::new();
        for sink in pending {
            let sink = match sink {
                PendingSink::Ready(sink) => sink,
                PendingSink::Deferred { open, .. } => open()?,
            };
            set.sinks.push(sink);
        }
        Ok(set)
    }

    pub fn push(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Hand the record to every sink in order.
    ///
    /// Each sink is isolated: an error or panic in one is passed to
    /// `on_error` and the remaining sinks still receive the record.
    /// Returns how many sinks accepted it.
    pub fn write_all<F>(&mut self, record: &Record, mut on_error: F) -> usize
    where
        F: FnMut(&str, DiaryError),
    {
        let mut accepted = 0;
        for sink in self.sinks.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| sink.write(record)));
            let failure = match result {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(payload) => Some(DiaryError::SinkPanicked {
                    sink: sink.name().to_string(),
                    message: panic_message(payload.as_ref()),
                }),
            };
            match failure {
                Some(e) => on_error(sink.name(), e),
                None => accepted += 1,
            }
        }
        accepted
    }

    /// Hand the record to every sink in order and return the first error
    pub fn write_strict(&mut self, record: &Record) -> Result<()> {
        let mut first = None;
        self.write_all(record, |_, e| {
            first.get_or_insert(e);
        });
        first.map_or(Ok(()), Err)
    }

    pub fn flush_all(&mut self) -> Result<()> {
        let mut first = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// Close and drop every sink, returning the first error
    pub fn close_all(&mut self) -> Result<()> {
        let mut first = None;
        for mut sink in self.sinks.drain(..) {
            if let Err(e) = sink.close() {
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
