// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

use std::collections::VecDeque;

use float_cmp::approx_eq;

use super::scheduler::REFRESH_PERIOD;
use super::*;
use crate::protocol::{
    BTN_BANK_LEFT, BTN_BANK_RIGHT, BTN_SHIFT, CC_CROSSFADER, CC_TRACK_KNOB_BASE,
    CC_TRACK_KNOB_RING_BASE, DEVICE_INQUIRY, introduce_frame,
};

fn identity_response(device_id: u8) -> ControlMessage {
    let mut bytes = vec![0u8; 15];
    bytes[0] = 0xf0;
    bytes[3] = 0x06;
    bytes[4] = 0x02;
    bytes[13] = device_id;
    bytes[14] = 0xf7;
    ControlMessage::sys_ex(TimeStamp::default(), bytes)
}

/// Run one cycle feeding the given messages, without firing the
/// refresh timer.
fn feed(controller: &mut Vpc40Controller, messages: &[ControlMessage]) -> Vec<ControlMessage> {
    let mut source: VecDeque<_> = messages.iter().cloned().collect();
    let mut sink = Vec::new();
    controller.process_cycle(&CycleArgs::default(), &mut source, &mut sink);
    sink
}

/// Run one empty cycle with enough elapsed time to fire the refresh
/// timer, returning everything the scheduler pushed.
fn tick(controller: &mut Vpc40Controller) -> Vec<ControlMessage> {
    let args = CycleArgs {
        elapsed_seconds: REFRESH_PERIOD,
        ..Default::default()
    };
    let mut source = VecDeque::new();
    let mut sink = Vec::new();
    controller.process_cycle(&args, &mut source, &mut sink);
    sink
}

fn note_on(channel: u8, note: u8) -> ControlMessage {
    ControlMessage::note_on(TimeStamp::default(), channel, note, 0x7f)
}

fn note_off(channel: u8, note: u8) -> ControlMessage {
    ControlMessage::note_off(TimeStamp::default(), channel, note)
}

fn cc(channel: u8, controller: u8, value: u8) -> ControlMessage {
    ControlMessage::control_change(TimeStamp::default(), channel, controller, value)
}

#[test]
fn handshake_confirms_resets_and_repaints() {
    let mut controller = Vpc40Controller::new();

    // Some state accumulated before the device (re)connects.
    feed(&mut controller, &[cc(0, CC_DEVICE_KNOB_BASE, 100)]);
    assert!(controller.device_knob_level(0, 0) > 0.0);

    let sent = feed(&mut controller, &[identity_response(0x05)]);

    assert_eq!(Some(0x05), controller.device_id());
    assert_eq!(1, sent.len());
    assert_eq!(
        MessagePayload::SysEx(introduce_frame(0x05).to_vec()),
        sent[0].payload
    );
    // Knob slots report the canonical zero state on the very next read.
    assert!(approx_eq!(f32, 0.0, controller.device_knob_level(0, 0)));

    // The following refresh repaints the whole surface: ring type and
    // value for every knob of bank 0.
    let pushed = tick(&mut controller);
    let ring_pushes = pushed
        .iter()
        .filter(|message| {
            matches!(
                message.payload,
                MessagePayload::ControlChange { controller, value, .. }
                    if (CC_DEVICE_KNOB_RING_BASE..CC_DEVICE_KNOB_RING_BASE + KNOB_COUNT)
                        .contains(&controller)
                        && value == RingType::Single.to_u7()
            )
        })
        .count();
    assert_eq!(usize::from(KNOB_COUNT), ring_pushes);
}

#[test]
fn unconfirmed_identity_persists_without_retry() {
    let mut controller = Vpc40Controller::new();
    for _ in 0..100 {
        let sent = tick(&mut controller);
        assert!(sent.is_empty());
    }
    assert_eq!(None, controller.device_id());

    // Still fully operable for direct control while unconfirmed.
    feed(&mut controller, &[cc(0, CC_CROSSFADER, 127)]);
    assert!(approx_eq!(f32, 10.0, controller.crossfader_level()));
}

#[test]
fn manual_inquiry_fires_on_the_rising_edge_only() {
    let mut controller = Vpc40Controller::new();
    let args = CycleArgs {
        inquire: true,
        ..Default::default()
    };

    let mut sink = Vec::new();
    let mut source = VecDeque::new();
    controller.process_cycle(&args, &mut source, &mut sink);
    controller.process_cycle(&args, &mut source, &mut sink);

    let inquiries = sink
        .iter()
        .filter(|message| message.payload == MessagePayload::SysEx(DEVICE_INQUIRY.to_vec()))
        .count();
    assert_eq!(1, inquiries);
}

#[test]
fn self_test_emits_the_diagnostic_sequence() {
    let mut controller = Vpc40Controller::new();
    let args = CycleArgs {
        self_test: true,
        ..Default::default()
    };

    let mut sink = Vec::new();
    let mut source = VecDeque::new();
    controller.process_cycle(&args, &mut source, &mut sink);

    assert_eq!(3, sink.len());
    assert_eq!(
        MessagePayload::NoteOn {
            channel: 0,
            note: PadLed::Record.note(),
            velocity: LED_VELOCITY_ON,
        },
        sink[0].payload
    );
    assert_eq!(
        MessagePayload::ControlChange {
            channel: 0,
            controller: CC_DEVICE_KNOB_RING_BASE,
            value: RingType::Pan.to_u7(),
        },
        sink[1].payload
    );
    assert_eq!(
        MessagePayload::ControlChange {
            channel: 0,
            controller: CC_DEVICE_KNOB_BASE,
            value: 64,
        },
        sink[2].payload
    );
}

#[test]
fn repeated_absolute_knob_value_pushes_once() {
    let mut controller = Vpc40Controller::new();

    feed(&mut controller, &[cc(0, CC_DEVICE_KNOB_BASE, 42)]);
    assert_eq!(1, tick(&mut controller).len());

    // The identical value again: no dirty flag, no output chatter.
    feed(&mut controller, &[cc(0, CC_DEVICE_KNOB_BASE, 42)]);
    assert!(tick(&mut controller).is_empty());

    feed(&mut controller, &[cc(0, CC_DEVICE_KNOB_BASE, 43)]);
    assert_eq!(1, tick(&mut controller).len());
}

#[test]
fn returning_to_a_bank_resyncs_its_knobs() {
    let mut controller = Vpc40Controller::new();

    // Fill knob 0 of bank 1, flush, and leave the bank again.
    feed(&mut controller, &[note_on(0, BTN_BANK_RIGHT)]);
    feed(&mut controller, &[cc(0, CC_TRACK_KNOB_BASE, 42)]);
    tick(&mut controller);
    feed(&mut controller, &[note_on(0, BTN_BANK_LEFT)]);
    tick(&mut controller);

    // Re-entering bank 1 must repaint knob 0 with ring type and
    // value, even though no new input event touched it.
    feed(&mut controller, &[note_on(0, BTN_BANK_RIGHT)]);
    let pushed = tick(&mut controller);
    assert!(pushed.iter().any(|message| message.payload
        == MessagePayload::ControlChange {
            channel: 0,
            controller: CC_TRACK_KNOB_BASE,
            value: 42,
        }));
    assert!(pushed.iter().any(|message| message.payload
        == MessagePayload::ControlChange {
            channel: 0,
            controller: CC_TRACK_KNOB_RING_BASE,
            value: RingType::Single.to_u7(),
        }));
}

#[test]
fn toggle_pad_scenario_end_to_end() {
    let mut controller = Vpc40Controller::new();
    let pad = PadLed::Record;

    // With shift held, one press arms toggle mode without a visible
    // state change.
    feed(&mut controller, &[note_on(0, BTN_SHIFT)]);
    feed(&mut controller, &[note_on(2, pad.note()), note_off(2, pad.note())]);
    assert!(approx_eq!(f32, 0.0, controller.led_gate(pad, 2)));

    feed(&mut controller, &[note_off(0, BTN_SHIFT)]);
    assert!(!controller.is_shifted());

    // Toggled on, then off, without releases in between.
    feed(&mut controller, &[note_on(2, pad.note())]);
    assert!(approx_eq!(f32, 10.0, controller.led_gate(pad, 2)));
    feed(&mut controller, &[note_on(2, pad.note())]);
    assert!(approx_eq!(f32, 0.0, controller.led_gate(pad, 2)));
}

#[test]
fn derived_reads_wrap_out_of_range_indices() {
    let mut controller = Vpc40Controller::new();
    feed(&mut controller, &[cc(0, CC_DEVICE_KNOB_BASE, 127)]);

    assert!(approx_eq!(
        f32,
        controller.device_knob_level(0, 0),
        controller.device_knob_level(KNOB_COUNT, BANK_COUNT)
    ));
    // Never panics, whatever the host asks for.
    let _ = controller.track_fader_level(200);
    let _ = controller.led_gate(PadLed::Metronome, 200);
}
