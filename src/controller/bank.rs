// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Bank and shift-modifier state.
//!
//! The surface exposes far fewer knobs than the host has logical
//! channels; banking timeshares each physical encoder across
//! [`BANK_COUNT`](crate::protocol::BANK_COUNT) logical channels, and
//! the shift modifier remaps the same control codes at dispatch time.

use crate::protocol::BANK_COUNT;

#[derive(Debug, Default)]
pub(crate) struct BankMode {
    bank: u8,
    shifted: bool,
    bank_changed: bool,
}

impl BankMode {
    /// Currently active bank index.
    #[must_use]
    pub(crate) const fn bank(&self) -> u8 {
        self.bank
    }

    #[must_use]
    pub(crate) const fn is_shifted(&self) -> bool {
        self.shifted
    }

    /// Wraps to 0 past the maximum, never clamps.
    pub(crate) fn bank_right(&mut self) {
        self.bank = (self.bank + 1) % BANK_COUNT;
        self.bank_changed = true;
    }

    /// Wraps to the maximum below 0, never clamps.
    pub(crate) fn bank_left(&mut self) {
        self.bank = (self.bank + BANK_COUNT - 1) % BANK_COUNT;
        self.bank_changed = true;
    }

    pub(crate) fn set_shifted(&mut self, shifted: bool) {
        self.shifted = shifted;
    }

    /// Force the next scheduler pass to resync the whole bank, e.g.
    /// after a confirmed handshake.
    pub(crate) fn force_bank_changed(&mut self) {
        self.bank_changed = true;
    }

    /// Consume the bank-change latch. Raised by any bank transition,
    /// cleared by exactly one caller per transition.
    #[must_use]
    pub(crate) fn take_bank_changed(&mut self) -> bool {
        std::mem::take(&mut self.bank_changed)
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
