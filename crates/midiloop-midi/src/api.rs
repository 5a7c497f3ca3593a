use std::fmt;

use crate::MidiPortError;

/// Identifier for a MIDI backend. `midir` binds exactly one backend per
/// platform at compile time, so the available set is fixed for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiApi {
    /// ALSA sequencer (Linux default).
    Alsa,
    /// JACK MIDI (Linux with the `jack` feature).
    Jack,
    /// CoreMIDI (macOS).
    CoreMidi,
    /// Windows MultiMedia.
    WinMm,
}

impl MidiApi {
    /// Human readable backend name, as shown by `--list`.
    pub fn display_name(self) -> &'static str {
        match self {
            MidiApi::Alsa => "ALSA",
            MidiApi::Jack => "JACK",
            MidiApi::CoreMidi => "CoreMIDI",
            MidiApi::WinMm => "Windows MultiMedia",
        }
    }
}

impl fmt::Display for MidiApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Backends compiled into this build.
pub fn compiled_apis() -> Vec<MidiApi> {
    let mut apis = Vec::new();
    #[cfg(all(target_os = "linux", feature = "jack"))]
    apis.push(MidiApi::Jack);
    #[cfg(all(target_os = "linux", not(feature = "jack")))]
    apis.push(MidiApi::Alsa);
    #[cfg(target_os = "macos")]
    apis.push(MidiApi::CoreMidi);
    #[cfg(target_os = "windows")]
    apis.push(MidiApi::WinMm);
    apis
}

/// Resolve a backend name from the command line. `default` picks the
/// platform's compiled backend; anything else must match a compiled
/// backend's display name by case-insensitive substring.
pub fn resolve_api(name: &str) -> Result<MidiApi, MidiPortError> {
    let apis = compiled_apis();
    if name.eq_ignore_ascii_case("default") {
        return apis
            .first()
            .copied()
            .ok_or_else(|| MidiPortError::UnknownApi(name.to_owned()));
    }
    find_api(&apis, name).ok_or_else(|| MidiPortError::UnknownApi(name.to_owned()))
}

fn find_api(apis: &[MidiApi], query: &str) -> Option<MidiApi> {
    let query = query.to_ascii_lowercase();
    apis.iter()
        .copied()
        .find(|api| api.display_name().to_ascii_lowercase().contains(&query))
}
