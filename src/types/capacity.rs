// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Airflow capacity range and percentage mapping.

use crate::error::ValueError;
use crate::state::{DeviceState, fields};

/// The unit's configured airflow range in m³/h.
///
/// Maps user-facing percentages onto airflow setpoints and back. Every
/// whole m³/h in the range is a distinct speed, so a range of 50–350 has
/// 301 speeds. Percentages map up with ceiling rounding; setpoints map down
/// with floor rounding.
///
/// # Examples
///
/// ```
/// use ecostream_lib::types::CapacityRange;
///
/// let range = CapacityRange::new(50, 350).unwrap();
/// assert_eq!(range.speed_count(), 301);
/// assert_eq!(range.qset_for_percentage(100).unwrap(), 350);
/// assert_eq!(range.qset_for_percentage(50).unwrap(), 200);
/// assert_eq!(range.percentage_for_qset(200.0), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacityRange {
    min: u16,
    max: u16,
}

impl CapacityRange {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `min` exceeds `max`.
    pub fn new(min: u16, max: u16) -> Result<Self, ValueError> {
        if min > max {
            return Err(ValueError::OutOfRange {
                min: i64::from(min),
                max: i64::from(u16::MAX),
                actual: i64::from(max),
            });
        }
        Ok(Self { min, max })
    }

    /// Reads `config.capacity_min` and `config.capacity_max`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingField` if either has not been reported,
    /// or `ValueError::OutOfRange` if they are inconsistent.
    pub fn from_state(state: &DeviceState) -> Result<Self, ValueError> {
        let read = |path: &crate::state::FieldPath| {
            state
                .integer(path)
                .and_then(|value| u16::try_from(value).ok())
                .ok_or_else(|| ValueError::MissingField(path.to_string()))
        };
        Self::new(read(&fields::CAPACITY_MIN)?, read(&fields::CAPACITY_MAX)?)
    }

    /// Lowest setpoint in m³/h.
    #[must_use]
    pub const fn min(&self) -> u16 {
        self.min
    }

    /// Highest setpoint in m³/h.
    #[must_use]
    pub const fn max(&self) -> u16 {
        self.max
    }

    /// Number of distinct speeds.
    #[must_use]
    pub fn speed_count(&self) -> u32 {
        u32::from(self.max) - u32::from(self.min) + 1
    }

    /// Returns `true` if `qset` lies within the range.
    #[must_use]
    pub fn contains(&self, qset: u16) -> bool {
        (self.min..=self.max).contains(&qset)
    }

    /// Converts a percentage into an airflow setpoint.
    ///
    /// The result is clamped to the range, so 0 % yields the minimum
    /// airflow rather than switching the unit off.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percentage` exceeds 100.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn qset_for_percentage(&self, percentage: u8) -> Result<u16, ValueError> {
        if percentage > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(percentage),
            });
        }
        let states = f64::from(self.speed_count());
        let offset = f64::from(self.min) - 1.0;
        let ranged = (states * f64::from(percentage) / 100.0 + offset).ceil();
        let clamped = ranged.clamp(f64::from(self.min), f64::from(self.max));
        Ok(clamped as u16)
    }

    /// Converts an airflow setpoint into a percentage, clamped to 0–100.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage_for_qset(&self, qset: f64) -> u8 {
        let states = f64::from(self.speed_count());
        let offset = f64::from(self.min) - 1.0;
        let percentage = ((qset - offset) * 100.0 / states).floor();
        percentage.clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::StateUpdate;

    #[test]
    fn rejects_inverted_range() {
        assert!(CapacityRange::new(350, 50).is_err());
        assert!(CapacityRange::new(100, 100).is_ok());
    }

    #[test]
    fn percentage_mapping_rounds_up() {
        let range = CapacityRange::new(50, 350).unwrap();
        assert_eq!(range.qset_for_percentage(1).unwrap(), 53);
        assert_eq!(range.qset_for_percentage(33).unwrap(), 149);
        assert!(range.qset_for_percentage(101).is_err());
    }

    #[test]
    fn zero_percent_clamps_to_minimum() {
        let range = CapacityRange::new(50, 350).unwrap();
        assert_eq!(range.qset_for_percentage(0).unwrap(), 50);
    }

    #[test]
    fn qset_mapping_rounds_down_and_clamps() {
        let range = CapacityRange::new(50, 350).unwrap();
        assert_eq!(range.percentage_for_qset(350.0), 100);
        assert_eq!(range.percentage_for_qset(50.0), 0);
        assert_eq!(range.percentage_for_qset(140.0), 30);
        assert_eq!(range.percentage_for_qset(500.0), 100);
        assert_eq!(range.percentage_for_qset(0.0), 0);
    }

    #[test]
    fn full_width_range_counts_every_speed() {
        let range = CapacityRange::new(0, u16::MAX).unwrap();
        assert_eq!(range.speed_count(), 65_536);
        assert_eq!(range.qset_for_percentage(100).unwrap(), u16::MAX);
        assert_eq!(range.percentage_for_qset(f64::from(u16::MAX)), 100);
        assert_eq!(range.percentage_for_qset(0.0), 0);
    }

    #[test]
    fn from_state_requires_both_bounds() {
        let mut state = DeviceState::new();
        state.merge(StateUpdate::from_value(json!({"config": {"capacity_min": 50}})).unwrap());
        assert_eq!(
            CapacityRange::from_state(&state),
            Err(ValueError::MissingField("config.capacity_max".to_string()))
        );

        state.merge(StateUpdate::from_value(json!({"config": {"capacity_max": 350}})).unwrap());
        assert_eq!(
            CapacityRange::from_state(&state).unwrap(),
            CapacityRange::new(50, 350).unwrap()
        );
    }
}
