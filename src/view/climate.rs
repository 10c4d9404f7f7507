// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Summer comfort view.

use crate::command::SummerComfortCommand;
use crate::error::ValueError;
use crate::state::{DeviceState, fields};
use crate::types::ComfortTemperature;

/// Whether summer comfort is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComfortMode {
    /// Summer comfort cools with outside air.
    Cool,
    /// Summer comfort is disabled.
    Off,
}

/// What summer comfort is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComfortAction {
    /// The bypass is open.
    Cooling,
    /// The bypass is closed.
    Idle,
}

/// Summer comfort presented as a cooling-only thermostat.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{DeviceState, StateUpdate};
/// use ecostream_lib::view::{ComfortAction, ComfortMode, SummerComfort};
///
/// let mut state = DeviceState::new();
/// state.merge(StateUpdate::parse(r#"{
///     "config": {"sum_com_enabled": true, "sum_com_temp": 23},
///     "status": {"bypass_pos": 100, "sensor_temp_eta": 24.5}
/// }"#).unwrap());
///
/// let comfort = SummerComfort::new(&state);
/// assert_eq!(comfort.mode(), Some(ComfortMode::Cool));
/// assert_eq!(comfort.action(), Some(ComfortAction::Cooling));
/// assert_eq!(comfort.target_temperature(), Some(23.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SummerComfort<'a> {
    state: &'a DeviceState,
}

impl<'a> SummerComfort<'a> {
    /// Views summer comfort in `state`.
    #[must_use]
    pub const fn new(state: &'a DeviceState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn mode(&self) -> Option<ComfortMode> {
        self.state
            .boolean(&fields::SUM_COM_ENABLED)
            .map(|enabled| if enabled { ComfortMode::Cool } else { ComfortMode::Off })
    }

    #[must_use]
    pub fn action(&self) -> Option<ComfortAction> {
        self.state.number(&fields::BYPASS_POS).map(|position| {
            if position > 0.0 {
                ComfortAction::Cooling
            } else {
                ComfortAction::Idle
            }
        })
    }

    /// Return air temperature in °C.
    #[must_use]
    pub fn current_temperature(&self) -> Option<f64> {
        self.state.number(&fields::SENSOR_TEMP_ETA)
    }

    /// Target indoor temperature in °C.
    #[must_use]
    pub fn target_temperature(&self) -> Option<f64> {
        self.state.number(&fields::SUM_COM_TEMP)
    }

    /// Command that switches summer comfort to `mode`.
    #[must_use]
    pub const fn set_mode(mode: ComfortMode) -> SummerComfortCommand {
        SummerComfortCommand::SetEnabled(matches!(mode, ComfortMode::Cool))
    }

    /// Command that sets the target. Fractions are truncated.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` outside 10–30 °C.
    pub fn set_temperature(celsius: f64) -> Result<SummerComfortCommand, ValueError> {
        ComfortTemperature::from_celsius(celsius).map(SummerComfortCommand::SetTemperature)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::command::Command;
    use crate::state::StateUpdate;

    #[test]
    fn disabled_and_closed() {
        let mut state = DeviceState::new();
        state.merge(
            StateUpdate::from_value(json!({
                "config": {"sum_com_enabled": false},
                "status": {"bypass_pos": 0}
            }))
            .unwrap(),
        );
        let comfort = SummerComfort::new(&state);
        assert_eq!(comfort.mode(), Some(ComfortMode::Off));
        assert_eq!(comfort.action(), Some(ComfortAction::Idle));
        assert_eq!(comfort.current_temperature(), None);
    }

    #[test]
    fn set_temperature_truncates() {
        let cmd = SummerComfort::set_temperature(22.9).unwrap();
        assert_eq!(cmd.payload().to_json(), json!({"config": {"sum_com_temp": 22}}));
        assert!(SummerComfort::set_temperature(35.0).is_err());
    }

    #[test]
    fn set_mode_toggles_enabled_flag() {
        assert_eq!(
            SummerComfort::set_mode(ComfortMode::Cool),
            SummerComfortCommand::SetEnabled(true)
        );
        assert_eq!(
            SummerComfort::set_mode(ComfortMode::Off).payload().to_json(),
            json!({"config": {"sum_com_enabled": false}})
        );
    }
}
