// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Summer comfort and schedule settings.

use super::{Command, CommandPayload};
use crate::state::fields;
use crate::types::ComfortTemperature;

/// Configures summer comfort, which opens the bypass to cool the house
/// with outside air when the indoor temperature exceeds the target.
///
/// # Examples
///
/// ```
/// use ecostream_lib::command::{Command, SummerComfortCommand};
/// use ecostream_lib::types::ComfortTemperature;
///
/// let cmd = SummerComfortCommand::SetTemperature(ComfortTemperature::new(22).unwrap());
/// assert_eq!(cmd.payload().to_json(), serde_json::json!({"config": {"sum_com_temp": 22}}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummerComfortCommand {
    /// Turns summer comfort on or off.
    SetEnabled(bool),
    /// Changes the target indoor temperature.
    SetTemperature(ComfortTemperature),
}

impl Command for SummerComfortCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::SetEnabled(_) => "summer_comfort",
            Self::SetTemperature(_) => "summer_comfort_temperature",
        }
    }

    fn payload(&self) -> CommandPayload {
        match self {
            Self::SetEnabled(enabled) => CommandPayload::new().with(&fields::SUM_COM_ENABLED, *enabled),
            Self::SetTemperature(target) => {
                CommandPayload::new().with(&fields::SUM_COM_TEMP, target.celsius())
            }
        }
    }
}

/// Enables or disables the unit's weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCommand {
    enabled: bool,
}

impl ScheduleCommand {
    /// Enables the schedule.
    #[must_use]
    pub const fn enable() -> Self {
        Self { enabled: true }
    }

    /// Disables the schedule.
    #[must_use]
    pub const fn disable() -> Self {
        Self { enabled: false }
    }

    /// Returns whether the command enables the schedule.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Command for ScheduleCommand {
    fn name(&self) -> &'static str {
        "schedule"
    }

    fn payload(&self) -> CommandPayload {
        CommandPayload::new().with(&fields::SCHEDULE_ENABLED, self.enabled)
    }
}
