use tracing::{debug, warn};

use midiloop_midi::panic_messages;

use crate::driver::MidiSink;

/// Owns the opened output for one run and guarantees the reset burst is
/// sent before the port goes away, no matter how the run ends.
///
/// `shutdown` is idempotent: the sink is taken out on the first call and
/// later calls find nothing to do. `Drop` backstops error paths that
/// never reach the explicit call.
pub struct Session<S: MidiSink> {
    sink: Option<S>,
}

impl<S: MidiSink> Session<S> {
    /// Wrap a freshly opened sink.
    pub fn new(sink: S) -> Self {
        Self { sink: Some(sink) }
    }

    /// The held sink, unless the session has already been torn down.
    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Send the full panic burst and release the sink. Safe to call any
    /// number of times; only the first does anything.
    pub fn shutdown(&mut self) {
        let Some(mut sink) = self.sink.take() else {
            return;
        };
        debug!("sending controller reset burst");
        for message in panic_messages() {
            if let Err(err) = sink.send(&message) {
                warn!(error = %err, "failed to send reset message");
                break;
            }
        }
    }
}

impl<S: MidiSink> Drop for Session<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records sends into shared storage that outlives the session.
    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<Vec<u8>>>>);

    impl MidiSink for SharedSink {
        fn send(&mut self, bytes: &[u8]) -> Result<()> {
            self.0.borrow_mut().push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn shutdown_sends_the_full_burst_once() {
        let sink = SharedSink::default();
        let mut session = Session::new(sink.clone());
        session.shutdown();
        assert_eq!(sink.0.borrow().len(), 64);
        assert_eq!(sink.0.borrow()[0], vec![0xB0, 120, 0]);

        session.shutdown();
        assert_eq!(sink.0.borrow().len(), 64);
    }

    #[test]
    fn drop_runs_the_burst_when_shutdown_was_never_called() {
        let sink = SharedSink::default();
        {
            let _session = Session::new(sink.clone());
        }
        assert_eq!(sink.0.borrow().len(), 64);
    }

    #[test]
    fn drop_after_shutdown_does_not_send_twice() {
        let sink = SharedSink::default();
        {
            let mut session = Session::new(sink.clone());
            session.shutdown();
        }
        assert_eq!(sink.0.borrow().len(), 64);
    }

    #[test]
    fn sink_is_gone_after_shutdown() {
        let mut session = Session::new(SharedSink::default());
        assert!(session.sink_mut().is_some());
        session.shutdown();
        assert!(session.sink_mut().is_none());
    }
}
