//! Playback core: MIDI file decoding, the real-time playback driver and
//! the session lifecycle that guarantees a controller-reset burst on
//! every exit path.

mod cancel;
mod driver;
mod session;
mod song;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use driver::{MidiSink, Outcome, Player};
pub use session::Session;
pub use song::{Song, TimedEvent};
