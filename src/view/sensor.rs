// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric and binary readings.

use std::fmt;

use crate::state::{DeviceState, FieldPath, fields};
use crate::types::Unit;

/// Error type the unit reports when the filters are due.
pub const FILTER_ERROR: &str = "ERROR_FILTER";

/// A numeric reading taken straight from one field.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{DeviceState, StateUpdate};
/// use ecostream_lib::view::{SENSORS, sensor};
///
/// let mut state = DeviceState::new();
/// state.merge(StateUpdate::parse(r#"{"status":{"qset":140}}"#).unwrap());
///
/// let qset = sensor("qset").unwrap();
/// assert_eq!(qset.read(&state), Some(140.0));
/// assert_eq!(qset.reading(&state).unwrap().to_string(), "140 m³/h");
/// assert!(SENSORS.len() > 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSensor {
    key: &'static str,
    name: &'static str,
    path: FieldPath,
    unit: Option<Unit>,
}

impl FieldSensor {
    /// Describes a sensor over `path`.
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, path: FieldPath, unit: Option<Unit>) -> Self {
        Self {
            key,
            name,
            path,
            unit,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field the sensor reads.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Unit of the value.
    #[must_use]
    pub const fn unit(&self) -> Option<Unit> {
        self.unit
    }

    /// Returns the current value, once reported.
    #[must_use]
    pub fn read(&self, state: &DeviceState) -> Option<f64> {
        state.number(&self.path)
    }

    /// Returns the current value with its unit.
    #[must_use]
    pub fn reading(&self, state: &DeviceState) -> Option<SensorReading> {
        self.read(state).map(|value| SensorReading {
            key: self.key,
            value,
            unit: self.unit,
        })
    }
}

/// A value read by a [`FieldSensor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Key of the sensor.
    pub key: &'static str,
    /// The value.
    pub value: f64,
    /// Unit of the value.
    pub unit: Option<Unit>,
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{} {unit}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Every numeric reading the unit exposes.
pub static SENSORS: [FieldSensor; 13] = [
    FieldSensor::new("qset", "Airflow setpoint", fields::QSET, Some(Unit::CubicMetersPerHour)),
    FieldSensor::new(
        "override_set_time_left",
        "Override time left",
        fields::OVERRIDE_SET_TIME_LEFT,
        Some(Unit::Seconds),
    ),
    FieldSensor::new(
        "fan_eha_speed",
        "Exhaust fan speed",
        fields::FAN_EHA_SPEED,
        Some(Unit::RevolutionsPerMinute),
    ),
    FieldSensor::new(
        "fan_sup_speed",
        "Supply fan speed",
        fields::FAN_SUP_SPEED,
        Some(Unit::RevolutionsPerMinute),
    ),
    FieldSensor::new("sensor_eco2_eta", "eCO2 return", fields::SENSOR_ECO2_ETA, Some(Unit::PartsPerMillion)),
    FieldSensor::new("sensor_rh_eta", "Humidity return", fields::SENSOR_RH_ETA, Some(Unit::Percent)),
    FieldSensor::new(
        "sensor_temp_eha",
        "Exhaust air temperature",
        fields::SENSOR_TEMP_EHA,
        Some(Unit::Celsius),
    ),
    FieldSensor::new(
        "sensor_temp_eta",
        "Return air temperature",
        fields::SENSOR_TEMP_ETA,
        Some(Unit::Celsius),
    ),
    FieldSensor::new(
        "sensor_temp_oda",
        "Outside air temperature",
        fields::SENSOR_TEMP_ODA,
        Some(Unit::Celsius),
    ),
    FieldSensor::new("sensor_tvoc_eta", "TVOC return", fields::SENSOR_TVOC_ETA, Some(Unit::PartsPerBillion)),
    FieldSensor::new("bypass_pos", "Bypass position", fields::BYPASS_POS, Some(Unit::Percent)),
    FieldSensor::new("rssi", "Wi-Fi signal", fields::WIFI_RSSI, Some(Unit::DecibelMilliwatts)),
    FieldSensor::new("uptime", "Uptime", fields::UPTIME, Some(Unit::Seconds)),
];

/// Looks up a sensor by key.
#[must_use]
pub fn sensor(key: &str) -> Option<&'static FieldSensor> {
    SENSORS.iter().find(|sensor| sensor.key == key)
}

/// Returns every reading currently known.
#[must_use]
pub fn readings(state: &DeviceState) -> Vec<SensorReading> {
    SENSORS.iter().filter_map(|sensor| sensor.reading(state)).collect()
}

/// Returns whether frost protection is active.
#[must_use]
pub fn frost_protection(state: &DeviceState) -> Option<bool> {
    state.boolean(&fields::FROST_PROTECTION)
}

/// Returns whether the unit asks for a filter replacement.
///
/// `None` until the unit has reported its error list.
#[must_use]
pub fn filter_replacement_due(state: &DeviceState) -> Option<bool> {
    state.get(&fields::ERRORS)?;
    Some(state.has_error(FILTER_ERROR))
}
