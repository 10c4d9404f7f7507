// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed projections over [`DeviceState`](crate::state::DeviceState).
//!
//! Views borrow a state snapshot and read it; they never talk to the unit.
//! Setters return commands, which are sent through
//! [`Ecostream::execute`](crate::Ecostream::execute).
//!
//! | View | Reads | Produces |
//! |------|-------|----------|
//! | [`FanControl`] | `qset`, capacity range, presets | [`FanSpeedCommand`](crate::command::FanSpeedCommand) |
//! | [`BypassValve`] | `bypass_pos`, bypass override | [`BypassCommand`](crate::command::BypassCommand) |
//! | [`SummerComfort`] | `sum_com_*`, return air temperature | [`SummerComfortCommand`](crate::command::SummerComfortCommand) |
//! | [`ScheduleSwitch`] | `schedule_enabled` | [`ScheduleCommand`](crate::command::ScheduleCommand) |
//! | [`SENSORS`] | numeric status fields | |

mod bypass;
mod climate;
mod fan;
mod schedule;
mod sensor;

pub use bypass::{BypassValve, ValveMotion};
pub use climate::{ComfortAction, ComfortMode, SummerComfort};
pub use fan::{DEFAULT_TURN_ON_PERCENTAGE, FanControl};
pub use schedule::ScheduleSwitch;
pub use sensor::{
    FILTER_ERROR, FieldSensor, SENSORS, SensorReading, filter_replacement_due, frost_protection,
    readings, sensor,
};
