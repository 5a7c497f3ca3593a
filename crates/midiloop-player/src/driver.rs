use std::time::Instant;

use anyhow::Result;
use tracing::debug;

use midiloop_midi::OutputHandle;

use crate::cancel::CancelToken;
use crate::song::Song;

/// Destination for raw MIDI bytes. The seam between the driver and the
/// opened port, and what tests substitute.
pub trait MidiSink {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}

impl MidiSink for OutputHandle {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        OutputHandle::send(self, bytes).map_err(Into::into)
    }
}

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All requested passes finished.
    Completed,
    /// A cancellation request aborted the run.
    Cancelled,
}

/// Streams a song's events to a sink in real time.
pub struct Player {
    loop_playback: bool,
}

impl Player {
    pub fn new(loop_playback: bool) -> Self {
        Self { loop_playback }
    }

    /// Play the song once, or over and over when looping is enabled.
    /// Returns as soon as cancellation is observed; send failures
    /// propagate unretried.
    pub fn play(
        &self,
        song: &Song,
        sink: &mut dyn MidiSink,
        cancel: &CancelToken,
    ) -> Result<Outcome> {
        loop {
            if self.play_pass(song, sink, cancel)? == Outcome::Cancelled {
                return Ok(Outcome::Cancelled);
            }
            if !self.loop_playback {
                return Ok(Outcome::Completed);
            }
        }
    }

    /// One pass over the song, paced by the events' encoded offsets.
    fn play_pass(
        &self,
        song: &Song,
        sink: &mut dyn MidiSink,
        cancel: &CancelToken,
    ) -> Result<Outcome> {
        println!("length: {:.2}s", song.duration().as_secs_f64());
        let started = Instant::now();
        for event in song.events() {
            let due = started + event.offset;
            let now = Instant::now();
            let cancelled = if due > now {
                cancel.wait(due - now)
            } else {
                cancel.is_cancelled()
            };
            if cancelled {
                return Ok(Outcome::Cancelled);
            }
            sink.send(&event.bytes)?;
            debug!(event = %event, "sent");
        }
        Ok(Outcome::Completed)
    }
}
