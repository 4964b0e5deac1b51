// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! SysEx identity handshake.
//!
//! There is no timeout or retry: if the device never responds, the
//! controller stays in the unconfirmed state (still operable for
//! direct knob/LED control) until the host retriggers the inquiry.

use crate::{
    midi::{ControlMessage, MidiMessageSink, TimeStamp},
    protocol::{DEVICE_INQUIRY, identity_response_device_id, introduce_frame},
    OutputResult,
};

#[derive(Debug, Default)]
pub(crate) struct DeviceHandshake {
    device_id: u8,
    confirmed: bool,
}

impl DeviceHandshake {
    /// The manufacturer-assigned device id, once confirmed.
    #[must_use]
    pub(crate) const fn confirmed_device_id(&self) -> Option<u8> {
        if self.confirmed {
            Some(self.device_id)
        } else {
            None
        }
    }

    /// Emit the universal identity inquiry.
    ///
    /// Idempotent and safe to invoke repeatedly. Any previously
    /// confirmed identity is invalidated until a response arrives.
    pub(crate) fn send_identity_request(
        &mut self,
        ts: TimeStamp,
        sink: &mut impl MidiMessageSink,
    ) -> OutputResult<()> {
        self.confirmed = false;
        sink.send_message(&ControlMessage::sys_ex(ts, DEVICE_INQUIRY.to_vec()))
    }

    /// Inspect an inbound SysEx frame.
    ///
    /// On an identity response, confirms the device id, echoes the
    /// introduce frame back, and returns `true` so the caller can
    /// perform the full state resync. All other frames (including
    /// malformed or short ones) are recoverable no-ops.
    pub(crate) fn try_accept(
        &mut self,
        ts: TimeStamp,
        bytes: &[u8],
        sink: &mut impl MidiMessageSink,
    ) -> OutputResult<bool> {
        let Some(device_id) = identity_response_device_id(bytes) else {
            log::debug!("Ignoring unrecognized SysEx frame: {bytes:02x?}");
            return Ok(false);
        };
        if self.confirmed && self.device_id != device_id {
            log::info!(
                "Device id changed: {old:#04x} -> {new:#04x}",
                old = self.device_id,
                new = device_id
            );
        }
        self.device_id = device_id;
        self.confirmed = true;
        log::info!("Confirmed device id {device_id:#04x}");
        sink.send_message(&ControlMessage::sys_ex(
            ts,
            introduce_frame(device_id).to_vec(),
        ))?;
        Ok(true)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
