//! Decodes a Standard MIDI File into a flat, time-ordered event stream.
//!
//! Tracks are merged by absolute tick before the tempo map is applied,
//! so a tempo change in any track retimes every later event in the file.
//! Meta events contribute to timing and total length but produce no wire
//! event.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use midly::live::LiveEvent;
use midly::{MetaMessage, Smf, Timing, TrackEventKind};

/// 120 BPM, the SMF default when no tempo event is present.
const DEFAULT_MICROS_PER_BEAT: f64 = 500_000.0;

/// One wire event with its absolute offset from the start of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    /// Delivery time relative to playback start.
    pub offset: Duration,
    /// Raw bytes, ready for the output port.
    pub bytes: Vec<u8>,
}

impl fmt::Display for TimedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s ", self.offset.as_secs_f64())?;
        match LiveEvent::parse(&self.bytes) {
            Ok(event) => write!(f, "{event:?}"),
            Err(_) => write!(f, "{:02x?}", self.bytes),
        }
    }
}

/// A decoded MIDI file: time-ordered events plus the nominal length.
pub struct Song {
    events: Vec<TimedEvent>,
    duration: Duration,
}

impl Song {
    /// Read and decode the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read MIDI file {}", path.display()))?;
        Self::from_bytes(&data)
            .with_context(|| format!("{} is not a valid MIDI file", path.display()))
    }

    /// Decode an SMF from raw file contents.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data).context("failed to parse SMF data")?;
        Self::from_smf(&smf)
    }

    fn from_smf(smf: &Smf) -> Result<Self> {
        // Merge all tracks into one absolutely-ticked stream. The sort is
        // stable, so events sharing a tick keep their track order.
        let mut merged: Vec<(u64, &TrackEventKind)> = Vec::new();
        for track in &smf.tracks {
            let mut at_tick = 0u64;
            for event in track {
                at_tick += u64::from(event.delta.as_int());
                merged.push((at_tick, &event.kind));
            }
        }
        merged.sort_by_key(|(tick, _)| *tick);

        let mut micros_per_beat = DEFAULT_MICROS_PER_BEAT;
        let mut clock = 0.0f64;
        let mut last_tick = 0u64;
        let mut events = Vec::new();
        for (tick, kind) in merged {
            let delta = (tick - last_tick) as f64;
            clock += delta * seconds_per_tick(smf.header.timing, micros_per_beat);
            last_tick = tick;

            if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = kind {
                micros_per_beat = f64::from(tempo.as_int());
            }
            if let Some(live) = kind.as_live_event() {
                let mut bytes = Vec::new();
                live.write_std(&mut bytes)
                    .context("failed to encode MIDI event")?;
                events.push(TimedEvent {
                    offset: Duration::from_secs_f64(clock),
                    bytes,
                });
            }
        }

        Ok(Self {
            events,
            duration: Duration::from_secs_f64(clock),
        })
    }

    /// Events of one pass, in delivery order.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Total nominal length, end-of-track metas included.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

fn seconds_per_tick(timing: Timing, micros_per_beat: f64) -> f64 {
    match timing {
        Timing::Metrical(ppq) => micros_per_beat / 1_000_000.0 / f64::from(ppq.as_int()),
        Timing::Timecode(fps, subframes) => 1.0 / (f64::from(fps.as_f32()) * f64::from(subframes)),
    }
}
