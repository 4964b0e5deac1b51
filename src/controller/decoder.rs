// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Classifies inbound channel messages and routes them to the
//! semantic handlers. Owns the modal (shift) and relative-encoder
//! decoding rules.

use super::{
    bank::BankMode,
    state::{ControlStateStore, KnobRow},
};
use crate::{
    input::{ButtonInput, StepEncoderInput},
    midi::{ControlMessage, MessagePayload},
    protocol::{
        BTN_BANK_LEFT, BTN_BANK_RIGHT, BTN_SHIFT, CC_CROSSFADER, CC_CUE_LEVEL,
        CC_DEVICE_KNOB_BASE, CC_MASTER_LEVEL, CC_TRACK_KNOB_BASE, CC_TRACK_LEVEL, CHANNEL_COUNT,
        KNOB_COUNT, PadLed,
    },
};

/// Dispatch one inbound message. Unknown statuses, notes, and
/// controller numbers are dropped silently.
pub(crate) fn dispatch(
    message: &ControlMessage,
    store: &mut ControlStateStore,
    mode: &mut BankMode,
) {
    match message.payload {
        MessagePayload::NoteOn {
            channel,
            note,
            velocity,
        } => {
            // Zero-velocity note-ons are releases by MIDI convention.
            if ButtonInput::from_u7(velocity).is_pressed() {
                on_note_on(channel, note, store, mode);
            } else {
                on_note_off(channel, note, store, mode);
            }
        }
        MessagePayload::NoteOff { channel, note, .. } => {
            on_note_off(channel, note, store, mode);
        }
        MessagePayload::ControlChange {
            channel,
            controller,
            value,
        } => {
            on_control_change(channel, controller, value, store, mode);
        }
        // SysEx frames belong to the handshake, not to this decoder.
        MessagePayload::SysEx(_) => {}
    }
}

fn on_note_on(channel: u8, note: u8, store: &mut ControlStateStore, mode: &mut BankMode) {
    match note {
        BTN_BANK_RIGHT => mode.bank_right(),
        BTN_BANK_LEFT => mode.bank_left(),
        BTN_SHIFT => mode.set_shifted(true),
        _ => {
            let Some(pad) = PadLed::from_repr(note) else {
                log::debug!("Dropping unmapped note-on {note:#04x} on channel {channel}");
                return;
            };
            if channel >= CHANNEL_COUNT {
                return;
            }
            let led = store.led_mut(pad, channel);
            if mode.is_shifted() {
                // Arms or disarms toggle mode for subsequent presses,
                // with no visible state change on this press.
                led.flip_toggle_latch();
            } else if led.is_toggle_latched() {
                led.set_lit(!led.is_lit());
            } else {
                // Momentary press, cleared again by the note-off.
                led.set_lit(true);
            }
        }
    }
}

fn on_note_off(channel: u8, note: u8, store: &mut ControlStateStore, mode: &mut BankMode) {
    match note {
        // Releasing shift always leaves the modal state, regardless
        // of any toggle latches.
        BTN_SHIFT => mode.set_shifted(false),
        BTN_BANK_RIGHT | BTN_BANK_LEFT => {}
        _ => {
            let Some(pad) = PadLed::from_repr(note) else {
                return;
            };
            if channel >= CHANNEL_COUNT {
                return;
            }
            let led = store.led_mut(pad, channel);
            if !led.is_toggle_latched() {
                led.set_lit(false);
            }
        }
    }
}

fn on_control_change(
    channel: u8,
    controller: u8,
    value: u8,
    store: &mut ControlStateStore,
    mode: &mut BankMode,
) {
    match controller {
        // Plain scalar levels: unconditional absolute updates, pushed
        // to the consumer every cycle without dirty tracking.
        CC_TRACK_LEVEL => {
            if channel < CHANNEL_COUNT {
                store.set_track_level(channel, value);
            }
        }
        CC_MASTER_LEVEL => store.set_master_level(value),
        CC_CROSSFADER => store.set_crossfader_level(value),
        CC_CUE_LEVEL => {
            let StepEncoderInput { delta } = StepEncoderInput::from_u7(value);
            if delta != 0 {
                store.apply_cue_delta(delta);
            }
        }
        _ if (CC_DEVICE_KNOB_BASE..CC_DEVICE_KNOB_BASE + KNOB_COUNT).contains(&controller) => {
            on_knob(KnobRow::Device, controller - CC_DEVICE_KNOB_BASE, value, store, mode);
        }
        _ if (CC_TRACK_KNOB_BASE..CC_TRACK_KNOB_BASE + KNOB_COUNT).contains(&controller) => {
            on_knob(KnobRow::Track, controller - CC_TRACK_KNOB_BASE, value, store, mode);
        }
        _ => {
            log::debug!("Dropping unmapped control change {controller:#04x} on channel {channel}");
        }
    }
}

fn on_knob(row: KnobRow, knob: u8, value: u8, store: &mut ControlStateStore, mode: &mut BankMode) {
    let bank = mode.bank();
    if mode.is_shifted() {
        // Under shift the raw value is only a direction hint for
        // cycling the ring display type: compared against the
        // last-seen raw value, smaller cycles backward, larger or
        // equal cycles forward.
        //
        // The hint is read from the device knob row for both rows.
        // TODO: Should the track knob row compare against its own
        // last-seen value instead?
        let last_seen = store.knob(KnobRow::Device, knob, bank).midi_value();
        store.knob_mut(row, knob, bank).cycle_ring_type(value >= last_seen);
    } else {
        store.knob_mut(row, knob, bank).set_midi_value(value);
    }
}
