// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Input primitives decoded from 7-bit MIDI data bytes.


/// A simple two-state button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonInput {
    Pressed,
    Released,
}

impl ButtonInput {
    #[must_use]
    pub const fn from_u7(data2: u8) -> Self {
        if data2 == 0x00 {
            Self::Released
        } else {
            Self::Pressed
        }
    }

    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// An absolute fader or knob position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderInput {
    /// Position in the interval [0, 1]
    pub position: f32,
}

impl SliderInput {
    pub const MIN_POSITION: f32 = 0.0;
    pub const MAX_POSITION: f32 = 1.0;

    #[must_use]
    pub fn from_u7(data2: u8) -> Self {
        debug_assert!(data2 <= 0x7f);
        let position = f32::from(data2) / 127.0;
        Self { position }
    }

    /// Scale the position into the consumer's unit range.
    ///
    /// The result is clamped, i.e. out-of-range raw values can
    /// never produce an out-of-range level.
    #[must_use]
    pub fn to_scaled(self, full_scale: f32) -> f32 {
        full_scale * self.position.clamp(Self::MIN_POSITION, Self::MAX_POSITION)
    }
}

/// An endless encoder that sends discrete delta values when rotated
/// in CW (positive) or CCW (negative) direction.
///
/// The 7-bit wire encoding is two's complement: values up to 0x3f
/// are positive deltas, values from 0x40 upwards are negative deltas
/// of magnitude `0x80 - value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEncoderInput {
    pub delta: i32,
}

impl StepEncoderInput {
    #[must_use]
    pub const fn from_u7(data2: u8) -> Self {
        debug_assert!(data2 <= 0x7f);
        let delta = if data2 < 0x40 {
            data2 as i32
        } else {
            data2 as i32 - 0x80
        };
        Self { delta }
    }
}
