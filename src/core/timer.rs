//! Fixed-period timer thread

use super::error::Result;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Runs a callback every `interval` on its own thread until cancelled.
///
/// The first call happens one full interval after [`RepeatedTimer::start`].
/// Cancelling wakes the thread immediately instead of waiting out the
/// current period.
pub struct RepeatedTimer {
    interval: Duration,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatedTimer {
    pub fn start<F>(interval: Duration, mut func: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stop_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("diary-timer".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => func(),
                    // Cancelled, or the owner is gone
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            interval,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the timer and wait for an in-flight callback to return
    pub fn cancel(&mut self) {
        drop(self.stop.take());

        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                // Cancelled from inside the callback; the loop exits on its own
                return;
            }
            if handle.join().is_err() {
                eprintln!("[DIARY ERROR] Timer thread panicked");
            }
        }
    }
}

impl Drop for RepeatedTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_timer_fires_repeatedly() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);

        let mut timer = RepeatedTimer::start(Duration::from_millis(10), move || {
            ticks_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(timer.is_running());

        thread::sleep(Duration::from_millis(120));
        timer.cancel();

        assert!(ticks.load(Ordering::SeqCst) >= 3);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_clone = Arc::clone(&ticks);

        let mut timer = RepeatedTimer::start(Duration::from_millis(5), move || {
            ticks_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        thread::sleep(Duration::from_millis(30));
        timer.cancel();
        let after_cancel = ticks.load(Ordering::SeqCst);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
        // Second cancel is a no-op
        timer.cancel();
    }

    #[test]
    fn test_cancel_does_not_wait_for_interval() {
        let mut timer = RepeatedTimer::start(Duration::from_secs(3600), || {}).unwrap();
        let start = std::time::Instant::now();
        timer.cancel();
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_runs_on_named_thread() {
        let name = Arc::new(parking_lot::Mutex::new(None));
        let name_clone = Arc::clone(&name);

        let timer = RepeatedTimer::start(Duration::from_millis(5), move || {
            *name_clone.lock() = thread::current().name().map(String::from);
        })
        .unwrap();
        thread::sleep(Duration::from_millis(40));
        drop(timer);

        assert_eq!(name.lock().as_deref(), Some("diary-timer"));
    }
}
