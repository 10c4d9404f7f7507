// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement units.

use std::fmt;

/// Unit of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Airflow, m³/h.
    CubicMetersPerHour,
    /// Duration, s.
    Seconds,
    /// Rotational speed, rpm.
    RevolutionsPerMinute,
    /// Concentration, ppm.
    PartsPerMillion,
    /// Concentration, ppb.
    PartsPerBillion,
    /// Relative humidity, %.
    Percent,
    /// Temperature, °C.
    Celsius,
    /// Signal strength, dBm.
    DecibelMilliwatts,
}

impl Unit {
    /// Returns the display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CubicMetersPerHour => "m³/h",
            Self::Seconds => "s",
            Self::RevolutionsPerMinute => "rpm",
            Self::PartsPerMillion => "ppm",
            Self::PartsPerBillion => "ppb",
            Self::Percent => "%",
            Self::Celsius => "°C",
            Self::DecibelMilliwatts => "dBm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
