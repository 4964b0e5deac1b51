// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! The MIDI wire message abstraction and the transport boundary.
//!
//! The transport is an external collaborator: it delivers discrete,
//! well-formed messages and accepts discrete outbound messages. No
//! byte-level framing or partial-frame reassembly happens here.

use std::collections::VecDeque;

use crate::OutputResult;

#[cfg(feature = "midir")]
pub mod midir;

pub const STATUS_NOTE_OFF: u8 = 0x8;
pub const STATUS_NOTE_ON: u8 = 0x9;
pub const STATUS_CC: u8 = 0xb;

/// Monotonic frame counter provided by the host engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
pub struct TimeStamp(u64);

impl TimeStamp {
    #[must_use]
    pub const fn new(frame: u64) -> Self {
        Self(frame)
    }

    #[must_use]
    pub const fn frame(self) -> u64 {
        self.0
    }
}

/// A discrete protocol event, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMessage {
    pub ts: TimeStamp,
    pub payload: MessagePayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: u8,
    },
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    SysEx(Vec<u8>),
}

impl ControlMessage {
    #[must_use]
    pub const fn note_on(ts: TimeStamp, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            ts,
            payload: MessagePayload::NoteOn {
                channel,
                note,
                velocity,
            },
        }
    }

    #[must_use]
    pub const fn note_off(ts: TimeStamp, channel: u8, note: u8) -> Self {
        Self {
            ts,
            payload: MessagePayload::NoteOff {
                channel,
                note,
                velocity: 0x00,
            },
        }
    }

    #[must_use]
    pub const fn control_change(ts: TimeStamp, channel: u8, controller: u8, value: u8) -> Self {
        Self {
            ts,
            payload: MessagePayload::ControlChange {
                channel,
                controller,
                value,
            },
        }
    }

    #[must_use]
    pub const fn sys_ex(ts: TimeStamp, bytes: Vec<u8>) -> Self {
        Self {
            ts,
            payload: MessagePayload::SysEx(bytes),
        }
    }

    /// Decode a discrete wire message as delivered by the transport.
    ///
    /// Returns `None` for status bytes this core does not consume,
    /// i.e. unknown messages are dropped silently.
    #[must_use]
    pub fn try_from_bytes(ts: TimeStamp, bytes: &[u8]) -> Option<Self> {
        if bytes.first() == Some(&0xf0) {
            return Some(Self::sys_ex(ts, bytes.to_vec()));
        }
        let [status, data1, data2] = *bytes else {
            return None;
        };
        let channel = status & 0x0f;
        let payload = match status >> 4 {
            STATUS_NOTE_ON => MessagePayload::NoteOn {
                channel,
                note: data1 & 0x7f,
                velocity: data2 & 0x7f,
            },
            STATUS_NOTE_OFF => MessagePayload::NoteOff {
                channel,
                note: data1 & 0x7f,
                velocity: data2 & 0x7f,
            },
            STATUS_CC => MessagePayload::ControlChange {
                channel,
                controller: data1 & 0x7f,
                value: data2 & 0x7f,
            },
            _ => {
                return None;
            }
        };
        Some(Self { ts, payload })
    }

    /// Encode into the discrete wire format accepted by the transport.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.payload {
            MessagePayload::NoteOn {
                channel,
                note,
                velocity,
            } => vec![STATUS_NOTE_ON << 4 | (channel & 0x0f), *note, *velocity],
            MessagePayload::NoteOff {
                channel,
                note,
                velocity,
            } => vec![STATUS_NOTE_OFF << 4 | (channel & 0x0f), *note, *velocity],
            MessagePayload::ControlChange {
                channel,
                controller,
                value,
            } => vec![STATUS_CC << 4 | (channel & 0x0f), *controller, *value],
            MessagePayload::SysEx(bytes) => bytes.clone(),
        }
    }
}

/// Non-blocking source of inbound messages.
///
/// Drained fully once per processing cycle. Backpressure is bounded
/// by the transport's own queue capacity, not handled here.
pub trait MidiMessageSource {
    fn try_pop_message(&mut self) -> Option<ControlMessage>;
}

impl MidiMessageSource for VecDeque<ControlMessage> {
    fn try_pop_message(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}

/// Fire-and-forget outbound message sink without delivery confirmation.
pub trait MidiMessageSink {
    fn send_message(&mut self, message: &ControlMessage) -> OutputResult<()>;
}

impl MidiMessageSink for Vec<ControlMessage> {
    fn send_message(&mut self, message: &ControlMessage) -> OutputResult<()> {
        self.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_channel_messages() {
        let ts = TimeStamp::new(42);
        assert_eq!(
            Some(ControlMessage::note_on(ts, 2, 0x30, 0x7f)),
            ControlMessage::try_from_bytes(ts, &[0x92, 0x30, 0x7f])
        );
        assert_eq!(
            Some(ControlMessage::note_off(ts, 2, 0x30)),
            ControlMessage::try_from_bytes(ts, &[0x82, 0x30, 0x00])
        );
        assert_eq!(
            Some(ControlMessage::control_change(ts, 0, 0x10, 0x40)),
            ControlMessage::try_from_bytes(ts, &[0xb0, 0x10, 0x40])
        );
    }

    #[test]
    fn decode_sys_ex() {
        let ts = TimeStamp::default();
        let bytes = [0xf0, 0x7e, 0x00, 0x06, 0x02, 0xf7];
        let message = ControlMessage::try_from_bytes(ts, &bytes).unwrap();
        assert_eq!(MessagePayload::SysEx(bytes.to_vec()), message.payload);
        assert_eq!(bytes.to_vec(), message.to_bytes());
    }

    #[test]
    fn unknown_status_is_dropped() {
        let ts = TimeStamp::default();
        // Pitch bend and friends are not part of this protocol.
        assert_eq!(None, ControlMessage::try_from_bytes(ts, &[0xe0, 0x00, 0x40]));
        assert_eq!(None, ControlMessage::try_from_bytes(ts, &[0x92, 0x30]));
        assert_eq!(None, ControlMessage::try_from_bytes(ts, &[]));
    }

    #[test]
    fn encode_channel_messages() {
        let ts = TimeStamp::new(1);
        assert_eq!(
            vec![0x90, 0x30, 0x01],
            ControlMessage::note_on(ts, 0, 0x30, 0x01).to_bytes()
        );
        assert_eq!(
            vec![0x87, 0x30, 0x00],
            ControlMessage::note_off(ts, 7, 0x30).to_bytes()
        );
        assert_eq!(
            vec![0xb0, 0x18, 0x03],
            ControlMessage::control_change(ts, 0, 0x18, 0x03).to_bytes()
        );
    }
}
