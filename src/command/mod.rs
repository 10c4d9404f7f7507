// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `EcoStream` command definitions.
//!
//! Every command is a partial configuration document: the unit applies the
//! fields it receives and leaves everything else alone. Typed commands
//! produce a [`CommandPayload`]; raw payloads can also be built directly.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Fields |
//! |-------------|---------|--------|
//! | [`FanSpeedCommand`] | Temporary airflow override | `man_override_set`, `man_override_set_time` |
//! | [`BypassCommand`] | Bypass valve override | `man_override_bypass`, `man_override_bypass_time` |
//! | [`SummerComfortCommand`] | Summer comfort mode and target | `sum_com_enabled`, `sum_com_temp` |
//! | [`ScheduleCommand`] | Weekly schedule on/off | `schedule_enabled` |
//! | [`FilterResetCommand`] | Next filter replacement date | `filter_datetime` |
//!
//! # Examples
//!
//! ```
//! use ecostream_lib::command::{Command, FanSpeedCommand};
//!
//! let cmd = FanSpeedCommand::new(200);
//! assert_eq!(cmd.name(), "fan_speed");
//! assert_eq!(cmd.payload().field_count(), 2);
//! ```

mod comfort;
mod maintenance;
mod payload;
mod ventilation;

pub use comfort::{ScheduleCommand, SummerComfortCommand};
pub use maintenance::{FILTER_INTERVAL, FilterResetCommand};
pub use payload::CommandPayload;
pub use ventilation::{BYPASS_OVERRIDE, BypassCommand, DEFAULT_FAN_OVERRIDE, FanSpeedCommand};

/// A command that can be sent to an `EcoStream` unit.
pub trait Command {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the configuration delta to send.
    fn payload(&self) -> CommandPayload;
}

impl Command for CommandPayload {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn payload(&self) -> CommandPayload {
        self.clone()
    }
}
