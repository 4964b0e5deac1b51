// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Rate-limited, dirty-flag-driven resynchronization of the device's
//! LEDs and knob ring displays.
//!
//! Naive per-event echo would flood the physical MIDI link and cause
//! visible display lag, so outbound traffic runs on a fixed-period
//! accumulator timer decoupled from the (much faster) processing
//! cycle rate.

use strum::IntoEnumIterator as _;

use super::{
    bank::BankMode,
    state::{ControlStateStore, KnobRow},
};
use crate::{
    midi::{ControlMessage, MidiMessageSink, TimeStamp},
    protocol::{
        CC_DEVICE_KNOB_BASE, CC_DEVICE_KNOB_RING_BASE, CC_TRACK_KNOB_BASE,
        CC_TRACK_KNOB_RING_BASE, CHANNEL_COUNT, KNOB_COUNT, LED_VELOCITY_ON, PadLed,
    },
    OutputResult,
};

/// Fixed refresh period in seconds, independent of the cycle rate.
pub(crate) const REFRESH_PERIOD: f32 = 1.0 / 30.0;

const fn knob_cc(row: KnobRow, knob: u8) -> u8 {
    match row {
        KnobRow::Device => CC_DEVICE_KNOB_BASE + knob,
        KnobRow::Track => CC_TRACK_KNOB_BASE + knob,
    }
}

const fn ring_cc(row: KnobRow, knob: u8) -> u8 {
    match row {
        KnobRow::Device => CC_DEVICE_KNOB_RING_BASE + knob,
        KnobRow::Track => CC_TRACK_KNOB_RING_BASE + knob,
    }
}

#[derive(Debug, Default)]
pub(crate) struct OutputScheduler {
    accumulated_seconds: f32,
}

impl OutputScheduler {
    /// Advance the timer and flush once per elapsed refresh period.
    pub(crate) fn process(
        &mut self,
        ts: TimeStamp,
        elapsed_seconds: f32,
        store: &mut ControlStateStore,
        mode: &mut BankMode,
        sink: &mut impl MidiMessageSink,
    ) -> OutputResult<()> {
        self.accumulated_seconds += elapsed_seconds;
        if self.accumulated_seconds < REFRESH_PERIOD {
            return Ok(());
        }
        self.accumulated_seconds = 0.0;
        Self::flush(ts, store, mode, sink)
    }

    /// Push dirty state to the device, or everything in the current
    /// bank after a bank change or reconnect.
    fn flush(
        ts: TimeStamp,
        store: &mut ControlStateStore,
        mode: &mut BankMode,
        sink: &mut impl MidiMessageSink,
    ) -> OutputResult<()> {
        let bank = mode.bank();
        let full_resync = mode.take_bank_changed();
        for row in [KnobRow::Device, KnobRow::Track] {
            for knob in 0..KNOB_COUNT {
                let slot = store.knob(row, knob, bank);
                let push_ring = full_resync || slot.ring_dirty();
                let push_value = full_resync || slot.value_dirty();
                if push_ring {
                    sink.send_message(&ControlMessage::control_change(
                        ts,
                        0,
                        ring_cc(row, knob),
                        slot.ring_type().to_u7(),
                    ))?;
                }
                if push_value {
                    sink.send_message(&ControlMessage::control_change(
                        ts,
                        0,
                        knob_cc(row, knob),
                        slot.midi_value(),
                    ))?;
                }
                if push_ring || push_value {
                    store.knob_mut(row, knob, bank).clear_dirty();
                }
            }
        }
        for channel in 0..CHANNEL_COUNT {
            for pad in PadLed::iter() {
                let led = store.led(pad, channel);
                if !led.dirty() {
                    continue;
                }
                let message = if led.is_lit() {
                    ControlMessage::note_on(ts, channel, pad.note(), LED_VELOCITY_ON)
                } else {
                    ControlMessage::note_off(ts, channel, pad.note())
                };
                sink.send_message(&message)?;
                store.led_mut(pad, channel).clear_dirty();
            }
        }
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.accumulated_seconds = 0.0;
    }
}
