// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Wire protocol constant tables and SysEx frame layouts.

use strum::{EnumCount, EnumIter, FromRepr};

/// Number of channel strips on the control surface.
pub const CHANNEL_COUNT: u8 = 8;

/// Number of physical encoders per knob row (device row and track row).
pub const KNOB_COUNT: u8 = 8;

/// Number of logical banks a knob row is timeshared across.
///
/// Matches the host engine's polyphonic channel count per cable.
pub const BANK_COUNT: u8 = 16;

// Transport/mode button note numbers.
pub const BTN_PLAY: u8 = 0x5b;
pub const BTN_STOP: u8 = 0x5c;
pub const BTN_RECORD: u8 = 0x5d;
pub const BTN_UP: u8 = 0x5e;
pub const BTN_DOWN: u8 = 0x5f;
pub const BTN_BANK_RIGHT: u8 = 0x60;
pub const BTN_BANK_LEFT: u8 = 0x61;
pub const BTN_SHIFT: u8 = 0x62;
pub const BTN_TAP_TEMPO: u8 = 0x63;
pub const BTN_NUDGE_PLUS: u8 = 0x64;
pub const BTN_NUDGE_MINUS: u8 = 0x65;

// Global LED note numbers (channel 0 only, not part of the pad matrix).
pub const LED_MASTER: u8 = 0x50;
pub const LED_STOP_ALL_CLIPS: u8 = 0x51;
pub const LED_SCENE_LAUNCH_1: u8 = 0x52;
pub const LED_SCENE_LAUNCH_2: u8 = 0x53;
pub const LED_SCENE_LAUNCH_3: u8 = 0x54;
pub const LED_SCENE_LAUNCH_4: u8 = 0x55;
pub const LED_SCENE_LAUNCH_5: u8 = 0x56;
pub const LED_PAN: u8 = 0x57;
pub const LED_SEND_A: u8 = 0x58;
pub const LED_SEND_B: u8 = 0x59;
pub const LED_SEND_C: u8 = 0x5a;

// Control change numbers.
pub const CC_TRACK_LEVEL: u8 = 0x07;
pub const CC_MASTER_LEVEL: u8 = 0x0e;
pub const CC_CROSSFADER: u8 = 0x0f;
pub const CC_DEVICE_KNOB_BASE: u8 = 0x10;
pub const CC_DEVICE_KNOB_RING_BASE: u8 = 0x18;
pub const CC_CUE_LEVEL: u8 = 0x2f;
pub const CC_TRACK_KNOB_BASE: u8 = 0x30;
pub const CC_TRACK_KNOB_RING_BASE: u8 = 0x38;

// LED velocity codes.
pub const LED_VELOCITY_OFF: u8 = 0x00;
pub const LED_VELOCITY_ON: u8 = 0x01;
pub const LED_VELOCITY_BLINK: u8 = 0x02;
pub const LED_VELOCITY_RED: u8 = 0x03;
pub const LED_VELOCITY_RED_BLINK: u8 = 0x04;
pub const LED_VELOCITY_YELLOW: u8 = 0x05;
pub const LED_VELOCITY_YELLOW_BLINK: u8 = 0x06;

/// Per-channel LED pad positions.
///
/// The discriminants equal the wire note numbers. Each position
/// exists once per channel strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum PadLed {
    Record = 0x30,
    Solo = 0x31,
    Activator = 0x32,
    TrackSelect = 0x33,
    ClipStop = 0x34,
    ClipLaunch1 = 0x35,
    ClipLaunch2 = 0x36,
    ClipLaunch3 = 0x37,
    ClipLaunch4 = 0x38,
    ClipLaunch5 = 0x39,
    ClipTrack = 0x3a,
    DeviceOnOff = 0x3b,
    Left = 0x3c,
    Right = 0x3d,
    DetailView = 0x3e,
    RecQuantize = 0x3f,
    MidiOverdub = 0x40,
    Metronome = 0x41,
}

impl PadLed {
    #[must_use]
    pub const fn note(self) -> u8 {
        self as u8
    }

    /// Zero-based position within the pad column, for array indexing.
    #[must_use]
    pub const fn position(self) -> usize {
        (self as u8 - Self::Record as u8) as usize
    }
}

/// Universal SysEx device inquiry, safe to emit repeatedly.
pub const DEVICE_INQUIRY: [u8; 6] = [0xf0, 0x7e, 0x00, 0x06, 0x01, 0xf7];

/// Byte offset of the manufacturer-assigned device id within an
/// identity response frame.
pub const IDENTITY_DEVICE_ID_OFFSET: usize = 13;

const IDENTITY_SUB_ID1_OFFSET: usize = 3;
const IDENTITY_SUB_ID2_OFFSET: usize = 4;

/// Extract the device id from a universal identity response.
///
/// Returns `None` for SysEx frames that do not match the response
/// header or that are too short for the documented id offset. Such
/// frames are recoverable no-ops, never a fault.
#[must_use]
pub fn identity_response_device_id(bytes: &[u8]) -> Option<u8> {
    if bytes.first() != Some(&0xf0)
        || bytes.get(IDENTITY_SUB_ID1_OFFSET) != Some(&0x06)
        || bytes.get(IDENTITY_SUB_ID2_OFFSET) != Some(&0x02)
    {
        return None;
    }
    bytes.get(IDENTITY_DEVICE_ID_OFFSET).copied()
}

/// Handshake-completion frame echoing the confirmed device id back,
/// switching the device into its host-controlled mode.
#[must_use]
pub const fn introduce_frame(device_id: u8) -> [u8; 12] {
    [
        0xf0, 0x47, device_id, 0x73, 0x60, 0x00, 0x04, 0x42, 0x00, 0x01, 0x00, 0xf7,
    ]
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn pad_led_note_round_trip() {
        for pad in PadLed::iter() {
            assert_eq!(Some(pad), PadLed::from_repr(pad.note()));
        }
        assert_eq!(Some(PadLed::Record), PadLed::from_repr(0x30));
        assert_eq!(Some(PadLed::Metronome), PadLed::from_repr(0x41));
        assert_eq!(None, PadLed::from_repr(0x2f));
        assert_eq!(None, PadLed::from_repr(0x42));
    }

    #[test]
    fn pad_led_positions_are_contiguous() {
        for (position, pad) in PadLed::iter().enumerate() {
            assert_eq!(position, pad.position());
        }
    }

    #[test]
    fn identity_response_matching() {
        let mut response = vec![0u8; 15];
        response[0] = 0xf0;
        response[3] = 0x06;
        response[4] = 0x02;
        response[13] = 0x05;
        response[14] = 0xf7;
        assert_eq!(Some(0x05), identity_response_device_id(&response));

        // Inquiry (sub-id2 0x01) is not a response.
        assert_eq!(None, identity_response_device_id(&DEVICE_INQUIRY));
        // Too short for the id offset.
        assert_eq!(
            None,
            identity_response_device_id(&[0xf0, 0x7e, 0x00, 0x06, 0x02, 0xf7])
        );
        assert_eq!(None, identity_response_device_id(&[]));
    }

    #[test]
    fn introduce_frame_layout() {
        let frame = introduce_frame(0x05);
        assert_eq!(12, frame.len());
        assert_eq!(0xf0, frame[0]);
        assert_eq!(0x47, frame[1]);
        assert_eq!(0x05, frame[2]);
        assert_eq!(0xf7, frame[11]);
    }
}
