// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Summer comfort target temperature.

use std::fmt;

use crate::error::ValueError;

/// Target indoor temperature for summer comfort, in whole degrees Celsius.
///
/// The unit accepts 10 °C to 30 °C in steps of one degree.
///
/// # Examples
///
/// ```
/// use ecostream_lib::types::ComfortTemperature;
///
/// let target = ComfortTemperature::new(22).unwrap();
/// assert_eq!(target.celsius(), 22);
///
/// // Fractions are dropped, like the unit does
/// assert_eq!(ComfortTemperature::from_celsius(22.7).unwrap().celsius(), 22);
///
/// assert!(ComfortTemperature::new(31).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComfortTemperature(u8);

impl ComfortTemperature {
    /// Lowest accepted target.
    pub const MIN: Self = Self(10);

    /// Highest accepted target.
    pub const MAX: Self = Self(30);

    /// Adjustment step in degrees.
    pub const STEP: u8 = 1;

    /// Creates a target temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` outside 10–30 °C.
    pub fn new(celsius: u8) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&celsius) {
            return Err(Self::out_of_range(i64::from(celsius)));
        }
        Ok(Self(celsius))
    }

    /// Creates a target from a fractional temperature, truncating toward zero.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the truncated value is outside
    /// 10–30 °C or the input is not finite.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_celsius(celsius: f64) -> Result<Self, ValueError> {
        if !celsius.is_finite() {
            return Err(Self::out_of_range(0));
        }
        let whole = celsius.trunc() as i64;
        u8::try_from(whole)
            .map_err(|_| Self::out_of_range(whole))
            .and_then(Self::new)
    }

    /// Returns the temperature in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> u8 {
        self.0
    }

    fn out_of_range(actual: i64) -> ValueError {
        ValueError::OutOfRange {
            min: i64::from(Self::MIN.0),
            max: i64::from(Self::MAX.0),
            actual,
        }
    }
}

impl fmt::Display for ComfortTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} °C", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_full_range() {
        for celsius in 10..=30 {
            assert_eq!(ComfortTemperature::new(celsius).unwrap().celsius(), celsius);
        }
    }

    #[test]
    fn rejects_outside_range() {
        assert!(ComfortTemperature::new(9).is_err());
        assert!(ComfortTemperature::new(31).is_err());
        assert!(ComfortTemperature::from_celsius(-5.0).is_err());
        assert!(ComfortTemperature::from_celsius(f64::NAN).is_err());
    }

    #[test]
    fn from_celsius_truncates() {
        assert_eq!(ComfortTemperature::from_celsius(30.9).unwrap(), ComfortTemperature::MAX);
        assert!(ComfortTemperature::from_celsius(9.99).is_err());
    }
}
