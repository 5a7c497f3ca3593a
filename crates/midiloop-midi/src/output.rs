use std::convert::Infallible;
use std::str::FromStr;

use midir::{MidiOutput, MidiOutputConnection};
#[cfg(unix)]
use midir::os::unix::VirtualOutput;
use tracing::info;

use crate::MidiPortError;

/// How the user picked an output port on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    /// Numeric port index.
    Index(usize),
    /// Case-insensitive substring of a port name.
    Name(String),
}

impl FromStr for PortSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => PortSelector::Index(index),
            Err(_) => PortSelector::Name(s.to_owned()),
        })
    }
}

/// Handle to an open MIDI output connection.
pub struct OutputHandle {
    port_name: String,
    connection: MidiOutputConnection,
}

impl OutputHandle {
    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Send a raw MIDI message over the port.
    pub fn send(&mut self, bytes: &[u8]) -> Result<(), MidiPortError> {
        self.connection
            .send(bytes)
            .map_err(|err| MidiPortError::Send(err.to_string()))
    }
}

/// Enumerate the names of the available output ports.
pub fn output_ports(client: &str) -> Result<Vec<String>, MidiPortError> {
    let output = MidiOutput::new(client).map_err(|err| MidiPortError::Backend(err.to_string()))?;
    let names = output
        .ports()
        .iter()
        .enumerate()
        .map(|(index, port)| {
            output
                .port_name(port)
                .unwrap_or_else(|_| format!("Port {index}"))
        })
        .collect();
    Ok(names)
}

/// Open an output port. With a selector the port is matched by index or
/// name fragment; without one a virtual output port is created.
pub fn open_output(
    client: &str,
    selector: Option<&PortSelector>,
) -> Result<OutputHandle, MidiPortError> {
    let output = MidiOutput::new(client).map_err(|err| MidiPortError::Backend(err.to_string()))?;
    let Some(selector) = selector else {
        return open_virtual(output, client);
    };

    let ports = output.ports();
    let names: Vec<String> = ports
        .iter()
        .enumerate()
        .map(|(index, port)| {
            output
                .port_name(port)
                .unwrap_or_else(|_| format!("Port {index}"))
        })
        .collect();
    let index = match_port(&names, selector)?;
    let port_name = names[index].clone();
    let connection = output
        .connect(&ports[index], "output")
        .map_err(|err| MidiPortError::Connect(err.to_string()))?;
    info!(port = %port_name, "opened MIDI output port");
    Ok(OutputHandle {
        port_name,
        connection,
    })
}

fn match_port(names: &[String], selector: &PortSelector) -> Result<usize, MidiPortError> {
    match selector {
        PortSelector::Index(index) if *index < names.len() => Ok(*index),
        PortSelector::Index(index) => Err(MidiPortError::UnknownPort(index.to_string())),
        PortSelector::Name(fragment) => {
            let query = fragment.to_ascii_lowercase();
            names
                .iter()
                .position(|name| name.to_ascii_lowercase().contains(&query))
                .ok_or_else(|| MidiPortError::UnknownPort(fragment.clone()))
        }
    }
}

#[cfg(unix)]
fn open_virtual(output: MidiOutput, client: &str) -> Result<OutputHandle, MidiPortError> {
    let connection = output
        .create_virtual("output")
        .map_err(|err| MidiPortError::Connect(err.to_string()))?;
    info!(client, "created virtual MIDI output port");
    Ok(OutputHandle {
        port_name: format!("{client} (virtual)"),
        connection,
    })
}

#[cfg(not(unix))]
fn open_virtual(_output: MidiOutput, _client: &str) -> Result<OutputHandle, MidiPortError> {
    Err(MidiPortError::VirtualUnsupported)
}
