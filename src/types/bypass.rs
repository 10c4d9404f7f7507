// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bypass valve position.

use std::fmt;

use crate::error::ValueError;

/// Position of the heat-exchanger bypass valve as a percentage.
///
/// 0 is fully closed (all air passes the heat exchanger), 100 fully open.
///
/// # Examples
///
/// ```
/// use ecostream_lib::types::BypassPosition;
///
/// let half = BypassPosition::new(50).unwrap();
/// assert_eq!(half.value(), 50);
/// assert!(BypassPosition::CLOSED.is_closed());
/// assert!(BypassPosition::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BypassPosition(u8);

impl BypassPosition {
    /// Fully closed.
    pub const CLOSED: Self = Self(0);

    /// Fully open.
    pub const OPEN: Self = Self(100);

    /// Creates a position.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a position, clamping to 100.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` at position 0.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BypassPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for BypassPosition {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
