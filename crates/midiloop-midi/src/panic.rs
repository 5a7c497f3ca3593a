//! The standard MIDI channel-mode reset burst.

const CONTROL_CHANGE: u8 = 0xB0;
const PITCH_BEND: u8 = 0xE0;

const ALL_SOUND_OFF: u8 = 120;
const RESET_ALL_CONTROLLERS: u8 = 121;
const ALL_NOTES_OFF: u8 = 123;

/// Messages that leave a device in a known-safe state: for each of the
/// 16 channels, all sound off, all notes off, reset all controllers and
/// pitch bend back to center.
pub fn panic_messages() -> impl Iterator<Item = [u8; 3]> {
    (0u8..16).flat_map(|channel| {
        [
            [CONTROL_CHANGE | channel, ALL_SOUND_OFF, 0],
            [CONTROL_CHANGE | channel, ALL_NOTES_OFF, 0],
            [CONTROL_CHANGE | channel, RESET_ALL_CONTROLLERS, 0],
            [PITCH_BEND | channel, 0x00, 0x40],
        ]
    })
}
