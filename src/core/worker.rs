//! Background writer thread
//!
//! The writer is the only thread that touches its sinks. Sinks that must not
//! cross threads (the SQLite connection) are opened by the writer itself
//! before its first receive.

use super::error::{panic_message, DiaryError, Result};
use super::metrics::DiaryMetrics;
use super::queue::{DeliveryQueue, Message};
use super::record::Record;
use super::sink::{PendingSink, SinkSet};
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Callback for records a sink failed to persist (`None` when a sink failed to open)
pub type WriteErrorCallback = Arc<dyn Fn(&DiaryError, Option<&Record>) + Send + Sync>;

/// Lifecycle of a writer thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    NotStarted,
    Running,
    Draining,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::NotStarted => "not started",
            WorkerState::Running => "running",
            WorkerState::Draining => "draining",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// State shared between the logger and whichever thread writes records
#[derive(Clone)]
pub struct WriteContext {
    pub metrics: Arc<DiaryMetrics>,
    pub last_logged: Arc<Mutex<Option<Record>>>,
    pub on_write_error: Option<WriteErrorCallback>,
}

impl WriteContext {
    pub fn new(metrics: Arc<DiaryMetrics>) -> Self {
        Self {
            metrics,
            last_logged: Arc::new(Mutex::new(None)),
            on_write_error: None,
        }
    }

    /// Write through every sink, containing failures.
    ///
    /// A record counts as written only when every sink took it; it becomes
    /// the last logged record when at least one did.
    pub(crate) fn deliver(&self, sinks: &mut SinkSet, record: Record) {
        let accepted = sinks.write_all(&record, |sink, e| self.report(sink, &e, Some(&record)));
        if accepted > 0 && accepted == sinks.len() {
            self.metrics.record_written();
        } else {
            self.metrics.record_failed();
        }
        if accepted > 0 {
            *self.last_logged.lock() = Some(record);
        }
    }

    pub(crate) fn report(&self, sink: &str, error: &DiaryError, record: Option<&Record>) {
        self.metrics.record_write_failure();
        match record {
            Some(_) => eprintln!("[DIARY ERROR] Sink '{}' failed: {}", sink, error),
            None => eprintln!("[DIARY ERROR] Could not open sink '{}': {}", sink, error),
        }
        if let Some(ref callback) = self.on_write_error {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(error, record))) {
                eprintln!(
                    "[DIARY ERROR] Write error callback panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

/// Owns the writer thread and the producer side of its queue
pub struct AsyncWriter {
    queue: DeliveryQueue,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<RwLock<WorkerState>>,
}

impl AsyncWriter {
    /// Spawn the writer; it opens deferred sinks, then drains until `Stop`
    pub fn spawn(pending: Vec<PendingSink>, context: WriteContext) -> Result<Self> {
        let (queue, receiver) = DeliveryQueue::new(Arc::clone(&context.metrics));
        let state = Arc::new(RwLock::new(WorkerState::NotStarted));
        let state_clone = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("diary-writer".to_string())
            .spawn(move || Self::run(receiver, pending, context, state_clone))?;

        Ok(Self {
            queue,
            handle: Mutex::new(Some(handle)),
            state,
        })
    }

    fn run(
        receiver: Receiver<Message>,
        pending: Vec<PendingSink>,
        context: WriteContext,
        state: Arc<RwLock<WorkerState>>,
    ) {
        {
            let mut state = state.write();
            if *state == WorkerState::NotStarted {
                *state = WorkerState::Running;
            }
        }

        let mut sinks = SinkSet::open(pending, |name, e| context.report(name, &e, None));

        loop {
            match receiver.recv() {
                Ok(Message::Record(record)) => {
                    context.deliver(&mut sinks, record);
                    if receiver.is_empty() {
                        if let Err(e) = sinks.flush_all() {
                            eprintln!("[DIARY ERROR] Flush failed: {}", e);
                        }
                    }
                }
                // Sentinel or every producer gone
                Ok(Message::Stop) | Err(_) => break,
            }
        }

        if let Err(e) = sinks.close_all() {
            eprintln!("[DIARY ERROR] Failed to close sinks during shutdown: {}", e);
        }
        *state.write() = WorkerState::Stopped;
    }

    pub fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    /// Enqueue the stop sentinel and wait for the writer to exit.
    ///
    /// Every record accepted before the sentinel is written first. Safe to
    /// call repeatedly and from several threads: later callers wait for the
    /// first join to finish and then return.
    pub fn join(&self) -> Result<()> {
        let mut handle = self.handle.lock();
        let Some(worker) = handle.take() else {
            return Ok(());
        };

        if worker.thread().id() == thread::current().id() {
            // Joining from a sink would deadlock; the loop ends on the sentinel anyway
            self.queue.stop();
            return Ok(());
        }

        {
            let mut state = self.state.write();
            if *state != WorkerState::Stopped {
                *state = WorkerState::Draining;
            }
        }
        self.queue.stop();

        worker.join().map_err(|payload| {
            *self.state.write() = WorkerState::Stopped;
            let message = panic_message(payload.as_ref());
            eprintln!("[DIARY CRITICAL] Writer thread panicked: {}", message);
            DiaryError::WriterPanicked(message)
        })
    }
}
