// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Outbound value types for the device's LEDs and knob ring displays.

use std::borrow::Cow;

use strum::{EnumCount, EnumIter, FromRepr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("disconnected")]
    Disconnected,
    #[error("send: {msg}")]
    Send { msg: Cow<'static, str> },
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Simple LED
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedOutput {
    #[default]
    Off,
    On,
}

impl LedOutput {
    #[must_use]
    pub const fn from_bool(lit: bool) -> Self {
        if lit {
            Self::On
        } else {
            Self::Off
        }
    }
}

/// Display mode of a knob's LED ring.
///
/// The discriminants equal the 7-bit codes expected by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum RingType {
    /// A single lit segment at the value position.
    #[default]
    Single = 0x01,
    /// All segments lit from the left up to the value position.
    Volume = 0x02,
    /// Segments lit from the center towards the value position.
    Pan = 0x03,
}

impl RingType {
    #[must_use]
    pub const fn to_u7(self) -> u8 {
        self as u8
    }

    /// Next ring type in the cycle `Single -> Volume -> Pan -> Single`.
    #[must_use]
    pub const fn cycle_forward(self) -> Self {
        match self {
            Self::Single => Self::Volume,
            Self::Volume => Self::Pan,
            Self::Pan => Self::Single,
        }
    }

    /// Next ring type in the cycle `Single -> Pan -> Volume -> Single`.
    #[must_use]
    pub const fn cycle_backward(self) -> Self {
        match self {
            Self::Single => Self::Pan,
            Self::Pan => Self::Volume,
            Self::Volume => Self::Single,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn ring_type_codes() {
        assert_eq!(0x01, RingType::Single.to_u7());
        assert_eq!(0x02, RingType::Volume.to_u7());
        assert_eq!(0x03, RingType::Pan.to_u7());
        for ring_type in RingType::iter() {
            assert_eq!(Some(ring_type), RingType::from_repr(ring_type.to_u7()));
        }
    }

    #[test]
    fn ring_type_cycles_are_closed() {
        for start in RingType::iter() {
            let mut forward = start;
            let mut backward = start;
            for _ in 0..RingType::COUNT {
                forward = forward.cycle_forward();
                backward = backward.cycle_backward();
            }
            assert_eq!(start, forward);
            assert_eq!(start, backward);
        }
    }

    #[test]
    fn ring_type_cycle_order() {
        assert_eq!(RingType::Volume, RingType::Single.cycle_forward());
        assert_eq!(RingType::Pan, RingType::Volume.cycle_forward());
        assert_eq!(RingType::Pan, RingType::Single.cycle_backward());
        assert_eq!(RingType::Volume, RingType::Pan.cycle_backward());
    }
}
