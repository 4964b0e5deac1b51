// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! The owned controller object tying the protocol state machine
//! together.
//!
//! Single-threaded, synchronous, cooperative: all decoding and state
//! mutation happens inline during the host's per-cycle callback. The
//! inbound queue is drained fully each cycle; outbound refresh runs
//! on the scheduler's accumulator timer.

mod bank;
mod decoder;
mod handshake;
mod scheduler;
mod state;

#[cfg(test)]
mod tests;

use self::{
    bank::BankMode,
    handshake::DeviceHandshake,
    scheduler::OutputScheduler,
    state::{ControlStateStore, KnobRow},
};
use crate::{
    midi::{ControlMessage, MessagePayload, MidiMessageSink, MidiMessageSource, TimeStamp},
    output::RingType,
    protocol::{
        BANK_COUNT, CC_DEVICE_KNOB_BASE, CC_DEVICE_KNOB_RING_BASE, CHANNEL_COUNT, KNOB_COUNT,
        LED_VELOCITY_ON, PadLed,
    },
};

/// Per-cycle context provided by the host engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleArgs {
    /// Monotonic frame counter.
    pub frame: u64,
    /// Elapsed time since the previous cycle, in seconds.
    pub elapsed_seconds: f32,
    /// Level of the manual "resend identity inquiry" control.
    pub inquire: bool,
    /// Level of the manual "run self-test" control.
    pub self_test: bool,
}

/// Rising-edge detector for the manual controls.
#[derive(Debug, Default)]
struct EdgeTrigger {
    held: bool,
}

impl EdgeTrigger {
    fn process(&mut self, level: bool) -> bool {
        let triggered = level && !self.held;
        self.held = level;
        triggered
    }
}

/// Protocol translator between the MIDI transport and the host
/// engine's named control values.
///
/// Owns all mutable protocol state exclusively; no ambient or static
/// state, no locking.
#[derive(Debug, Default)]
pub struct Vpc40Controller {
    store: ControlStateStore,
    mode: BankMode,
    handshake: DeviceHandshake,
    scheduler: OutputScheduler,
    inquire_trigger: EdgeTrigger,
    self_test_trigger: EdgeTrigger,
}

impl Vpc40Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one processing cycle: handle manual triggers, drain and
    /// decode all pending inbound messages, then let the scheduler
    /// flush dirty state back to the device.
    ///
    /// Nothing in here is fatal. Outbound send failures are logged
    /// and the cycle continues.
    pub fn process_cycle(
        &mut self,
        args: &CycleArgs,
        source: &mut impl MidiMessageSource,
        sink: &mut impl MidiMessageSink,
    ) {
        let ts = TimeStamp::new(args.frame);
        if self.inquire_trigger.process(args.inquire) {
            if let Err(err) = self.handshake.send_identity_request(ts, sink) {
                log::warn!("Failed to send identity inquiry: {err}");
            }
        }
        if self.self_test_trigger.process(args.self_test) {
            if let Err(err) = Self::send_self_test(ts, sink) {
                log::warn!("Failed to send self-test sequence: {err}");
            }
        }
        while let Some(message) = source.try_pop_message() {
            log::trace!("Inbound message: {message:?}");
            if let MessagePayload::SysEx(bytes) = &message.payload {
                match self.handshake.try_accept(ts, bytes, sink) {
                    Ok(true) => self.resync_after_handshake(),
                    Ok(false) => {}
                    Err(err) => {
                        log::warn!("Failed to answer identity response: {err}");
                        if self.handshake.confirmed_device_id().is_some() {
                            self.resync_after_handshake();
                        }
                    }
                }
                continue;
            }
            decoder::dispatch(&message, &mut self.store, &mut self.mode);
        }
        if let Err(err) =
            self.scheduler
                .process(ts, args.elapsed_seconds, &mut self.store, &mut self.mode, sink)
        {
            log::warn!("Failed to refresh device state: {err}");
        }
    }

    /// Full re-initialization after a confirmed handshake: canonical
    /// zero state, bank 0, and a forced repaint of the whole surface.
    fn resync_after_handshake(&mut self) {
        log::info!("Resetting control state after confirmed handshake");
        self.store.reset();
        self.mode.reset();
        self.mode.force_bank_changed();
        self.scheduler.reset();
    }

    /// Fixed diagnostic sequence: one pad LED on, one ring display
    /// switched to Pan, one ring value at mid-scale.
    fn send_self_test(ts: TimeStamp, sink: &mut impl MidiMessageSink) -> crate::OutputResult<()> {
        sink.send_message(&ControlMessage::note_on(
            ts,
            0,
            PadLed::Record.note(),
            LED_VELOCITY_ON,
        ))?;
        sink.send_message(&ControlMessage::control_change(
            ts,
            0,
            CC_DEVICE_KNOB_RING_BASE,
            RingType::Pan.to_u7(),
        ))?;
        sink.send_message(&ControlMessage::control_change(
            ts,
            0,
            CC_DEVICE_KNOB_BASE,
            64,
        ))?;
        Ok(())
    }

    // Derived values read by the host engine every cycle. Indices
    // wrap instead of erroring, like everything else in this core.

    #[must_use]
    pub fn device_knob_level(&self, knob: u8, bank: u8) -> f32 {
        self.store
            .knob_level(KnobRow::Device, knob % KNOB_COUNT, bank % BANK_COUNT)
    }

    #[must_use]
    pub fn track_knob_level(&self, knob: u8, bank: u8) -> f32 {
        self.store
            .knob_level(KnobRow::Track, knob % KNOB_COUNT, bank % BANK_COUNT)
    }

    #[must_use]
    pub fn track_fader_level(&self, channel: u8) -> f32 {
        self.store.track_level(channel % CHANNEL_COUNT)
    }

    #[must_use]
    pub fn master_level(&self) -> f32 {
        self.store.master_level()
    }

    #[must_use]
    pub fn crossfader_level(&self) -> f32 {
        self.store.crossfader_level()
    }

    #[must_use]
    pub fn cue_level(&self) -> f32 {
        self.store.cue_level_scaled()
    }

    #[must_use]
    pub fn led_gate(&self, pad: PadLed, channel: u8) -> f32 {
        self.store.led_gate(pad, channel % CHANNEL_COUNT)
    }

    #[must_use]
    pub const fn current_bank(&self) -> u8 {
        self.mode.bank()
    }

    #[must_use]
    pub const fn is_shifted(&self) -> bool {
        self.mode.is_shifted()
    }

    /// The confirmed device id, or `None` while the handshake is
    /// outstanding.
    #[must_use]
    pub const fn device_id(&self) -> Option<u8> {
        self.handshake.confirmed_device_id()
    }
}
