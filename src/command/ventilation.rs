// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Airflow and bypass overrides.

use std::time::Duration;

use super::{Command, CommandPayload};
use crate::state::fields;
use crate::types::BypassPosition;

/// How long a manual airflow override lasts unless specified.
pub const DEFAULT_FAN_OVERRIDE: Duration = Duration::from_secs(30 * 60);

/// How long a manual bypass override lasts.
pub const BYPASS_OVERRIDE: Duration = Duration::from_secs(24 * 60 * 60);

/// Temporarily overrides the airflow setpoint.
///
/// The unit returns to its schedule once the override time runs out.
///
/// # Examples
///
/// ```
/// use ecostream_lib::command::{Command, FanSpeedCommand};
///
/// let cmd = FanSpeedCommand::new(140);
/// assert_eq!(
///     cmd.payload().to_json(),
///     serde_json::json!({"config": {"man_override_set": 140, "man_override_set_time": 1800}})
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanSpeedCommand {
    qset: u16,
    duration: Duration,
}

impl FanSpeedCommand {
    /// Overrides the airflow to `qset` m³/h for [`DEFAULT_FAN_OVERRIDE`].
    #[must_use]
    pub const fn new(qset: u16) -> Self {
        Self {
            qset,
            duration: DEFAULT_FAN_OVERRIDE,
        }
    }

    /// Sets how long the override lasts. Sub-second parts are dropped.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Returns the requested airflow in m³/h.
    #[must_use]
    pub const fn qset(&self) -> u16 {
        self.qset
    }

    /// Returns the override duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Command for FanSpeedCommand {
    fn name(&self) -> &'static str {
        "fan_speed"
    }

    fn payload(&self) -> CommandPayload {
        CommandPayload::new()
            .with(&fields::MAN_OVERRIDE_SET, self.qset)
            .with(&fields::MAN_OVERRIDE_SET_TIME, self.duration.as_secs())
    }
}

/// Moves the bypass valve.
///
/// Opening the valve holds the position for [`BYPASS_OVERRIDE`]. Closing it
/// clears the override so the unit's own bypass control takes over again.
///
/// # Examples
///
/// ```
/// use ecostream_lib::command::{BypassCommand, Command};
/// use ecostream_lib::types::BypassPosition;
///
/// let close = BypassCommand::new(BypassPosition::CLOSED);
/// assert_eq!(
///     close.payload().to_json(),
///     serde_json::json!({"config": {"man_override_bypass": 0, "man_override_bypass_time": 0}})
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BypassCommand {
    position: BypassPosition,
}

impl BypassCommand {
    /// Moves the valve to `position`.
    #[must_use]
    pub const fn new(position: BypassPosition) -> Self {
        Self { position }
    }

    /// Fully opens the valve.
    #[must_use]
    pub const fn open() -> Self {
        Self::new(BypassPosition::OPEN)
    }

    /// Closes the valve and releases the override.
    #[must_use]
    pub const fn close() -> Self {
        Self::new(BypassPosition::CLOSED)
    }

    /// Returns the requested position.
    #[must_use]
    pub const fn position(&self) -> BypassPosition {
        self.position
    }
}

impl Command for BypassCommand {
    fn name(&self) -> &'static str {
        "bypass"
    }

    fn payload(&self) -> CommandPayload {
        let hold = if self.position.is_closed() {
            0
        } else {
            BYPASS_OVERRIDE.as_secs()
        };
        CommandPayload::new()
            .with(&fields::MAN_OVERRIDE_BYPASS, self.position.value())
            .with(&fields::MAN_OVERRIDE_BYPASS_TIME, hold)
    }
}
