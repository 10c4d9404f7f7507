// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::state::{FieldPath, fields};

/// One of the three airflow setpoints stored on the unit.
///
/// # Examples
///
/// ```
/// use ecostream_lib::types::FanPreset;
///
/// let preset: FanPreset = "mid".parse().unwrap();
/// assert_eq!(preset, FanPreset::Mid);
/// assert_eq!(preset.setpoint_field().to_string(), "config.setpoint_mid");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanPreset {
    /// `config.setpoint_low`
    Low,
    /// `config.setpoint_mid`
    Mid,
    /// `config.setpoint_high`
    High,
}

impl FanPreset {
    /// All presets from lowest to highest airflow.
    pub const ALL: [Self; 3] = [Self::Low, Self::Mid, Self::High];

    /// Returns the preset name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    /// Returns the config field holding this preset's airflow.
    #[must_use]
    pub const fn setpoint_field(self) -> FieldPath {
        match self {
            Self::Low => fields::SETPOINT_LOW,
            Self::Mid => fields::SETPOINT_MID,
            Self::High => fields::SETPOINT_HIGH,
        }
    }
}

impl fmt::Display for FanPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanPreset {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValueError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<FanPreset>().unwrap(), FanPreset::High);
        assert_eq!(" low ".parse::<FanPreset>().unwrap(), FanPreset::Low);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "turbo".parse::<FanPreset>(),
            Err(ValueError::UnknownPreset("turbo".to_string()))
        );
    }

    #[test]
    fn each_preset_has_its_own_field() {
        assert_eq!(FanPreset::Low.setpoint_field(), fields::SETPOINT_LOW);
        assert_eq!(FanPreset::High.setpoint_field(), fields::SETPOINT_HIGH);
    }
}
