//! Delivery queue between caller threads and the writer thread
//!
//! Unbounded FIFO over a crossbeam channel. Producers never block; the single
//! consumer blocks while the queue is empty. Shutdown is a `Stop` sentinel
//! placed behind every record accepted before it, so draining up to the
//! sentinel drains everything.

use super::error::{DiaryError, Result};
use super::metrics::DiaryMetrics;
use super::record::Record;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Entry carried by the delivery queue
#[derive(Debug)]
pub enum Message {
    Record(Record),
    Stop,
}

/// Producer side of the delivery queue; cheap to clone
#[derive(Clone)]
pub struct DeliveryQueue {
    sender: Sender<Message>,
    // Read-locked by producers, write-locked once to enqueue the sentinel:
    // no record can land behind `Stop`.
    stopped: Arc<RwLock<bool>>,
    metrics: Arc<DiaryMetrics>,
}

impl DeliveryQueue {
    /// Create the queue and the receiver for its single consumer
    pub fn new(metrics: Arc<DiaryMetrics>) -> (Self, Receiver<Message>) {
        let (sender, receiver) = unbounded();
        let queue = Self {
            sender,
            stopped: Arc::new(RwLock::new(false)),
            metrics,
        };
        (queue, receiver)
    }

    /// Append a record to the tail.
    ///
    /// Only fails once the queue has been stopped.
    pub fn add(&self, record: Record) -> Result<()> {
        let stopped = self.stopped.read();
        if *stopped {
            return Err(DiaryError::LoggerStopped);
        }
        self.sender
            .send(Message::Record(record))
            .map_err(|_| DiaryError::LoggerStopped)?;
        self.metrics.record_enqueued();
        Ok(())
    }

    /// Enqueue the stop sentinel; returns `false` if it was already enqueued
    pub fn stop(&self) -> bool {
        let mut stopped = self.stopped.write();
        if *stopped {
            return false;
        }
        *stopped = true;
        // The consumer may already be gone; there is nothing left to stop then
        let _ = self.sender.send(Message::Stop);
        true
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.read()
    }

    /// Entries waiting for the consumer
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}
