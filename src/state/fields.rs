// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Well-known field paths.

use super::{FieldPath, Section};

// ========== comm_wifi ==========

/// Network name the unit is joined to.
pub const WIFI_SSID: FieldPath = FieldPath::new(Section::CommWifi, "ssid");
/// Received signal strength in dBm.
pub const WIFI_RSSI: FieldPath = FieldPath::new(Section::CommWifi, "rssi");
/// IP address on the Wi-Fi interface.
pub const WIFI_IP: FieldPath = FieldPath::new(Section::CommWifi, "wifi_ip");

// ========== system ==========

/// User-assigned unit name.
pub const SYSTEM_NAME: FieldPath = FieldPath::new(Section::System, "system_name");
/// Seconds since boot.
pub const UPTIME: FieldPath = FieldPath::new(Section::System, "uptime");

// ========== config ==========

pub const MAN_OVERRIDE_SET: FieldPath = FieldPath::new(Section::Config, "man_override_set");
pub const MAN_OVERRIDE_SET_TIME: FieldPath = FieldPath::new(Section::Config, "man_override_set_time");
pub const MAN_OVERRIDE_BYPASS: FieldPath = FieldPath::new(Section::Config, "man_override_bypass");
pub const MAN_OVERRIDE_BYPASS_TIME: FieldPath =
    FieldPath::new(Section::Config, "man_override_bypass_time");
pub const SUM_COM_ENABLED: FieldPath = FieldPath::new(Section::Config, "sum_com_enabled");
pub const SUM_COM_TEMP: FieldPath = FieldPath::new(Section::Config, "sum_com_temp");
pub const SCHEDULE_ENABLED: FieldPath = FieldPath::new(Section::Config, "schedule_enabled");
pub const FILTER_DATETIME: FieldPath = FieldPath::new(Section::Config, "filter_datetime");
pub const CAPACITY_MIN: FieldPath = FieldPath::new(Section::Config, "capacity_min");
pub const CAPACITY_MAX: FieldPath = FieldPath::new(Section::Config, "capacity_max");
pub const SETPOINT_LOW: FieldPath = FieldPath::new(Section::Config, "setpoint_low");
pub const SETPOINT_MID: FieldPath = FieldPath::new(Section::Config, "setpoint_mid");
pub const SETPOINT_HIGH: FieldPath = FieldPath::new(Section::Config, "setpoint_high");

// ========== status ==========

/// Current airflow setpoint in m³/h.
pub const QSET: FieldPath = FieldPath::new(Section::Status, "qset");
/// Bypass valve position, 0 (closed) to 100 (open).
pub const BYPASS_POS: FieldPath = FieldPath::new(Section::Status, "bypass_pos");
pub const FROST_PROTECTION: FieldPath = FieldPath::new(Section::Status, "frost_protection");
/// Active error records.
pub const ERRORS: FieldPath = FieldPath::new(Section::Status, "errors");
pub const OVERRIDE_SET_TIME_LEFT: FieldPath =
    FieldPath::new(Section::Status, "override_set_time_left");
pub const FAN_EHA_SPEED: FieldPath = FieldPath::new(Section::Status, "fan_eha_speed");
pub const FAN_SUP_SPEED: FieldPath = FieldPath::new(Section::Status, "fan_sup_speed");
pub const SENSOR_ECO2_ETA: FieldPath = FieldPath::new(Section::Status, "sensor_eco2_eta");
pub const SENSOR_RH_ETA: FieldPath = FieldPath::new(Section::Status, "sensor_rh_eta");
pub const SENSOR_TEMP_EHA: FieldPath = FieldPath::new(Section::Status, "sensor_temp_eha");
pub const SENSOR_TEMP_ETA: FieldPath = FieldPath::new(Section::Status, "sensor_temp_eta");
pub const SENSOR_TEMP_ODA: FieldPath = FieldPath::new(Section::Status, "sensor_temp_oda");
pub const SENSOR_TVOC_ETA: FieldPath = FieldPath::new(Section::Status, "sensor_tvoc_eta");
