// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed view.

use crate::command::FanSpeedCommand;
use crate::error::ValueError;
use crate::state::{DeviceState, fields};
use crate::types::{CapacityRange, FanPreset};

/// Percentage used by [`FanControl::turn_on`] when none is given.
pub const DEFAULT_TURN_ON_PERCENTAGE: u8 = 100;

/// View of the fans as a single speed-controlled device.
///
/// Speeds are airflow setpoints within the unit's capacity range and are
/// exposed as percentages of that range. Every setter returns a
/// [`FanSpeedCommand`], which overrides the airflow for half an hour.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{DeviceState, StateUpdate};
/// use ecostream_lib::view::FanControl;
///
/// let mut state = DeviceState::new();
/// state.merge(StateUpdate::parse(r#"{
///     "config": {"capacity_min": 50, "capacity_max": 350},
///     "status": {"qset": 200}
/// }"#).unwrap());
///
/// let fan = FanControl::new(&state).unwrap();
/// assert_eq!(fan.percentage(), Some(50));
/// assert_eq!(fan.set_percentage(100).unwrap().qset(), 350);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FanControl<'a> {
    state: &'a DeviceState,
    range: CapacityRange,
}

impl<'a> FanControl<'a> {
    /// Views the fans in `state`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingField` until the capacity range has been
    /// reported, or `ValueError::OutOfRange` if it is inconsistent.
    pub fn new(state: &'a DeviceState) -> Result<Self, ValueError> {
        Ok(Self {
            state,
            range: CapacityRange::from_state(state)?,
        })
    }

    /// Airflow range of the unit.
    #[must_use]
    pub const fn range(&self) -> CapacityRange {
        self.range
    }

    /// Current airflow setpoint in m³/h.
    #[must_use]
    pub fn qset(&self) -> Option<f64> {
        self.state.number(&fields::QSET)
    }

    /// Current speed as a percentage of the range.
    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        self.qset().map(|qset| self.range.percentage_for_qset(qset))
    }

    /// Number of distinct speeds.
    #[must_use]
    pub fn speed_count(&self) -> u32 {
        self.range.speed_count()
    }

    /// Airflow configured for `preset`.
    #[must_use]
    pub fn preset_qset(&self, preset: FanPreset) -> Option<u16> {
        self.state
            .integer(&preset.setpoint_field())
            .and_then(|value| u16::try_from(value).ok())
    }

    /// The preset whose airflow matches the current setpoint, if any.
    #[must_use]
    pub fn current_preset(&self) -> Option<FanPreset> {
        let qset = self.state.integer(&fields::QSET)?;
        FanPreset::ALL
            .into_iter()
            .find(|preset| self.preset_qset(*preset).is_some_and(|value| i64::from(value) == qset))
    }

    /// Command that sets the speed to `percentage` of the range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percentage` exceeds 100.
    pub fn set_percentage(&self, percentage: u8) -> Result<FanSpeedCommand, ValueError> {
        Ok(FanSpeedCommand::new(self.range.qset_for_percentage(percentage)?))
    }

    /// Command that runs the fans at `percentage`, or full speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `percentage` exceeds 100.
    pub fn turn_on(&self, percentage: Option<u8>) -> Result<FanSpeedCommand, ValueError> {
        self.set_percentage(percentage.unwrap_or(DEFAULT_TURN_ON_PERCENTAGE))
    }

    /// Command that drops the fans to the lowest airflow.
    ///
    /// The unit cannot stop its fans, so this is the minimum setpoint.
    #[must_use]
    pub const fn turn_off(&self) -> FanSpeedCommand {
        FanSpeedCommand::new(self.range.min())
    }

    /// Command that selects `preset`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingField` if the preset's airflow has not
    /// been reported.
    pub fn set_preset(&self, preset: FanPreset) -> Result<FanSpeedCommand, ValueError> {
        self.preset_qset(preset)
            .map(FanSpeedCommand::new)
            .ok_or_else(|| ValueError::MissingField(preset.setpoint_field().to_string()))
    }
}
