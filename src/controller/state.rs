// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! The authoritative mapping from (control identity x bank x channel)
//! to current values, dirty flags, and derived output levels.

use crate::{
    input::SliderInput,
    output::RingType,
    protocol::{BANK_COUNT, CHANNEL_COUNT, KNOB_COUNT, PadLed},
};
use strum::EnumCount as _;

/// Full-scale derived output level, in the host engine's unit.
pub(crate) const FULL_SCALE: f32 = 10.0;

fn u7_to_scaled(midi_value: u8) -> f32 {
    SliderInput::from_u7(midi_value).to_scaled(FULL_SCALE)
}

/// Selects one of the two physical encoder rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnobRow {
    Device,
    Track,
}

/// One physical encoder timeshared across banks.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KnobSlot {
    midi_value: u8,
    ring_type: RingType,
    value_dirty: bool,
    ring_dirty: bool,
}

impl KnobSlot {
    #[must_use]
    pub(crate) const fn midi_value(&self) -> u8 {
        self.midi_value
    }

    #[must_use]
    pub(crate) const fn ring_type(&self) -> RingType {
        self.ring_type
    }

    /// Absolute update, deduplicated: an unchanged raw value raises
    /// no new dirty flag and causes no output chatter.
    pub(crate) fn set_midi_value(&mut self, midi_value: u8) {
        if self.midi_value == midi_value {
            return;
        }
        self.midi_value = midi_value;
        self.value_dirty = true;
    }

    /// Cycle the ring display type in the given direction.
    ///
    /// Changing the ring type requires re-pushing the value as well,
    /// since the device's visual representation depends on both.
    pub(crate) fn cycle_ring_type(&mut self, forward: bool) {
        self.ring_type = if forward {
            self.ring_type.cycle_forward()
        } else {
            self.ring_type.cycle_backward()
        };
        self.ring_dirty = true;
        self.value_dirty = true;
    }

    #[must_use]
    pub(crate) const fn value_dirty(&self) -> bool {
        self.value_dirty
    }

    #[must_use]
    pub(crate) const fn ring_dirty(&self) -> bool {
        self.ring_dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.value_dirty = false;
        self.ring_dirty = false;
    }

    fn reset(&mut self) {
        self.midi_value = 0;
        self.ring_type = RingType::Single;
        self.value_dirty = true;
        self.ring_dirty = true;
    }
}

/// One LED pad position on one channel strip.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LedSlot {
    lit: bool,
    toggle_latched: bool,
    dirty: bool,
}

impl LedSlot {
    #[must_use]
    pub(crate) const fn is_lit(&self) -> bool {
        self.lit
    }

    #[must_use]
    pub(crate) const fn is_toggle_latched(&self) -> bool {
        self.toggle_latched
    }

    /// Arm or disarm toggle mode without a visible state change.
    pub(crate) fn flip_toggle_latch(&mut self) {
        self.toggle_latched = !self.toggle_latched;
    }

    pub(crate) fn set_lit(&mut self, lit: bool) {
        if self.lit == lit {
            return;
        }
        self.lit = lit;
        self.dirty = true;
    }

    #[must_use]
    pub(crate) const fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn reset(&mut self) {
        self.lit = false;
        self.toggle_latched = false;
        self.dirty = true;
    }
}

const KNOBS: usize = KNOB_COUNT as usize;
const BANKS: usize = BANK_COUNT as usize;
const CHANNELS: usize = CHANNEL_COUNT as usize;

/// Owns every control value the host engine reads per cycle.
///
/// All state is created zeroed at construction and reset to the same
/// canonical state on every confirmed device handshake.
#[derive(Debug)]
pub(crate) struct ControlStateStore {
    device_knobs: [[KnobSlot; KNOBS]; BANKS],
    track_knobs: [[KnobSlot; KNOBS]; BANKS],
    leds: [[LedSlot; PadLed::COUNT]; CHANNELS],
    track_levels: [u8; CHANNELS],
    master_level: u8,
    crossfader_level: u8,
    cue_level: u8,
}

impl Default for ControlStateStore {
    fn default() -> Self {
        Self {
            device_knobs: [[KnobSlot::default(); KNOBS]; BANKS],
            track_knobs: [[KnobSlot::default(); KNOBS]; BANKS],
            leds: [[LedSlot::default(); PadLed::COUNT]; CHANNELS],
            track_levels: [0; CHANNELS],
            master_level: 0,
            crossfader_level: 0,
            cue_level: 0,
        }
    }
}

impl ControlStateStore {
    #[must_use]
    pub(crate) fn knob(&self, row: KnobRow, knob: u8, bank: u8) -> &KnobSlot {
        let knobs = match row {
            KnobRow::Device => &self.device_knobs,
            KnobRow::Track => &self.track_knobs,
        };
        &knobs[bank as usize][knob as usize]
    }

    #[must_use]
    pub(crate) fn knob_mut(&mut self, row: KnobRow, knob: u8, bank: u8) -> &mut KnobSlot {
        let knobs = match row {
            KnobRow::Device => &mut self.device_knobs,
            KnobRow::Track => &mut self.track_knobs,
        };
        &mut knobs[bank as usize][knob as usize]
    }

    #[must_use]
    pub(crate) fn led(&self, pad: PadLed, channel: u8) -> &LedSlot {
        &self.leds[channel as usize][pad.position()]
    }

    #[must_use]
    pub(crate) fn led_mut(&mut self, pad: PadLed, channel: u8) -> &mut LedSlot {
        &mut self.leds[channel as usize][pad.position()]
    }

    pub(crate) fn set_track_level(&mut self, channel: u8, midi_value: u8) {
        self.track_levels[channel as usize] = midi_value;
    }

    pub(crate) fn set_master_level(&mut self, midi_value: u8) {
        self.master_level = midi_value;
    }

    pub(crate) fn set_crossfader_level(&mut self, midi_value: u8) {
        self.crossfader_level = midi_value;
    }

    /// Apply a signed relative delta to the cue level, bounded to the
    /// 7-bit range. The headroom check keeps the stored value from
    /// ever leaving [0, 127], whatever the delta magnitude.
    pub(crate) fn apply_cue_delta(&mut self, delta: i32) {
        if delta > 0 {
            let headroom = i32::from(0x7f - self.cue_level);
            self.cue_level += u8::try_from(delta.min(headroom)).unwrap_or(0);
        } else {
            let floor = i32::from(self.cue_level);
            self.cue_level -= u8::try_from((-delta).min(floor)).unwrap_or(0);
        }
    }

    #[must_use]
    pub(crate) const fn cue_level(&self) -> u8 {
        self.cue_level
    }

    /// Reset every slot to the canonical zero state and force all
    /// dirty flags so the next scheduler pass repaints the device.
    pub(crate) fn reset(&mut self) {
        for bank in 0..BANKS {
            for knob in 0..KNOBS {
                self.device_knobs[bank][knob].reset();
                self.track_knobs[bank][knob].reset();
            }
        }
        for channel in &mut self.leds {
            for led in channel {
                led.reset();
            }
        }
        self.track_levels = [0; CHANNELS];
        self.master_level = 0;
        self.crossfader_level = 0;
        self.cue_level = 0;
    }

    // Derived output levels, pure functions of the latest raw values.

    #[must_use]
    pub(crate) fn knob_level(&self, row: KnobRow, knob: u8, bank: u8) -> f32 {
        u7_to_scaled(self.knob(row, knob, bank).midi_value())
    }

    #[must_use]
    pub(crate) fn track_level(&self, channel: u8) -> f32 {
        u7_to_scaled(self.track_levels[channel as usize])
    }

    #[must_use]
    pub(crate) fn master_level(&self) -> f32 {
        u7_to_scaled(self.master_level)
    }

    #[must_use]
    pub(crate) fn crossfader_level(&self) -> f32 {
        u7_to_scaled(self.crossfader_level)
    }

    #[must_use]
    pub(crate) fn cue_level_scaled(&self) -> f32 {
        u7_to_scaled(self.cue_level)
    }

    #[must_use]
    pub(crate) fn led_gate(&self, pad: PadLed, channel: u8) -> f32 {
        if self.led(pad, channel).is_lit() {
            FULL_SCALE
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn knob_value_update_is_deduplicated() {
        let mut store = ControlStateStore::default();
        let slot = store.knob_mut(KnobRow::Device, 0, 0);

        slot.set_midi_value(42);
        assert!(slot.value_dirty());
        slot.clear_dirty();

        // Re-sending the unchanged value must not raise the flag again.
        slot.set_midi_value(42);
        assert!(!slot.value_dirty());

        slot.set_midi_value(43);
        assert!(slot.value_dirty());
    }

    #[test]
    fn ring_type_change_dirties_value_too() {
        let mut store = ControlStateStore::default();
        let slot = store.knob_mut(KnobRow::Track, 3, 1);

        slot.cycle_ring_type(true);
        assert_eq!(RingType::Volume, slot.ring_type());
        assert!(slot.ring_dirty());
        assert!(slot.value_dirty());
    }

    #[test]
    fn derived_level_tracks_raw_value() {
        let mut store = ControlStateStore::default();
        store.knob_mut(KnobRow::Device, 2, 0).set_midi_value(127);
        assert!(approx_eq!(
            f32,
            FULL_SCALE,
            store.knob_level(KnobRow::Device, 2, 0)
        ));

        store.knob_mut(KnobRow::Device, 2, 0).set_midi_value(0);
        assert!(approx_eq!(f32, 0.0, store.knob_level(KnobRow::Device, 2, 0)));
    }

    #[test]
    fn cue_delta_is_bounded() {
        let mut store = ControlStateStore::default();
        store.apply_cue_delta(60);
        assert_eq!(60, store.cue_level());

        store.apply_cue_delta(16);
        assert_eq!(76, store.cue_level());

        store.apply_cue_delta(-1);
        assert_eq!(75, store.cue_level());

        // Headroom check: never exceeds 127 ...
        store.apply_cue_delta(63);
        assert_eq!(127, store.cue_level());
        store.apply_cue_delta(1);
        assert_eq!(127, store.cue_level());

        // ... and never drops below 0.
        store.apply_cue_delta(-64);
        assert_eq!(63, store.cue_level());
        store.apply_cue_delta(-64);
        assert_eq!(0, store.cue_level());
        store.apply_cue_delta(-1);
        assert_eq!(0, store.cue_level());
    }

    #[test]
    fn reset_zeroes_everything_and_forces_dirty() {
        let mut store = ControlStateStore::default();
        store.knob_mut(KnobRow::Device, 0, 0).set_midi_value(42);
        store.knob_mut(KnobRow::Device, 0, 0).clear_dirty();
        store.led_mut(PadLed::Record, 2).set_lit(true);
        store.led_mut(PadLed::Record, 2).clear_dirty();
        store.apply_cue_delta(10);

        store.reset();

        let slot = store.knob(KnobRow::Device, 0, 0);
        assert_eq!(0, slot.midi_value());
        assert_eq!(RingType::Single, slot.ring_type());
        assert!(slot.value_dirty());
        assert!(slot.ring_dirty());
        assert!(!store.led(PadLed::Record, 2).is_lit());
        assert!(store.led(PadLed::Record, 2).dirty());
        assert_eq!(0, store.cue_level());
    }
}
