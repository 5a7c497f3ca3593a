use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Requests cancellation of a playback run. Handed to signal handlers;
/// cloneable and safe to fire from any thread, any number of times.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    tx: Sender<()>,
}

impl CancelHandle {
    /// Flag the run as cancelled and wake a pending pacing wait.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.tx.try_send(());
    }
}

/// Observer half held by the playback driver.
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wait out `timeout` unless cancellation arrives first. Returns
    /// whether the run has been cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                self.is_cancelled()
            }
        }
    }
}

/// Create a connected handle/token pair for one run.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let flag = Arc::new(AtomicBool::new(false));
    let (tx, rx) = bounded(1);
    (
        CancelHandle {
            flag: Arc::clone(&flag),
            tx,
        },
        CancelToken { flag, rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn wait_times_out_when_not_cancelled() {
        let (_handle, token) = cancel_pair();
        assert!(!token.wait(Duration::from_millis(1)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancellation_is_observed_without_waiting() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        let started = Instant::now();
        assert!(token.wait(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn cancellation_interrupts_a_pending_wait() {
        let (handle, token) = cancel_pair();
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            handle.cancel();
        });
        let started = Instant::now();
        assert!(token.wait(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        waker.join().unwrap();
    }

    #[test]
    fn repeated_cancels_are_harmless() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        handle.cancel();
        handle.clone().cancel();
        assert!(token.is_cancelled());
        assert!(token.wait(Duration::from_millis(1)));
    }
}
