//! MIDI output transport built on the `midir` crate.
//!
//! Covers everything between the command line and the wire: backend (API)
//! identification, output-port enumeration and matching, opening real and
//! virtual ports, raw-byte transmission, and the standard channel-mode
//! reset ("panic") burst.

use thiserror::Error;

mod api;
mod output;
mod panic;

pub use api::{compiled_apis, resolve_api, MidiApi};
pub use output::{open_output, output_ports, OutputHandle, PortSelector};
pub use panic::panic_messages;

/// Errors produced while dealing with MIDI backends and ports.
#[derive(Debug, Error)]
pub enum MidiPortError {
    /// The requested API is not part of this build.
    #[error("no MIDI API matching '{0}' is available in this build")]
    UnknownApi(String),
    /// No output port matched the given index or name fragment.
    #[error("no MIDI output port matching '{0}'")]
    UnknownPort(String),
    /// Virtual output ports cannot be created on this platform.
    #[error("virtual MIDI output ports are not supported on this platform")]
    VirtualUnsupported,
    /// Opening the output connection failed.
    #[error("failed to open MIDI output: {0}")]
    Connect(String),
    /// Transmitting a message failed.
    #[error("failed to send MIDI message: {0}")]
    Send(String),
    /// Backend specific failure with additional context.
    #[error("backend error: {0}")]
    Backend(String),
}
