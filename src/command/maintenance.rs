// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Maintenance actions.

use chrono::{DateTime, Months, Utc};

use super::{Command, CommandPayload};
use crate::state::fields;

/// Interval between filter replacements.
pub const FILTER_INTERVAL: Months = Months::new(3);

/// Acknowledges a filter replacement by scheduling the next one.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use ecostream_lib::command::{Command, FilterResetCommand};
///
/// let replaced = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
/// let cmd = FilterResetCommand::replaced_at(replaced);
/// assert_eq!(cmd.next_replacement(), Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterResetCommand {
    next_replacement: DateTime<Utc>,
}

impl FilterResetCommand {
    /// Filters were replaced now.
    #[must_use]
    pub fn from_now() -> Self {
        Self::replaced_at(Utc::now())
    }

    /// Filters were replaced at `replaced`; the next replacement is due
    /// [`FILTER_INTERVAL`] later, clamped to the end of shorter months.
    #[must_use]
    pub fn replaced_at(replaced: DateTime<Utc>) -> Self {
        Self {
            next_replacement: replaced
                .checked_add_months(FILTER_INTERVAL)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Schedules the next replacement explicitly.
    #[must_use]
    pub const fn due_at(next_replacement: DateTime<Utc>) -> Self {
        Self { next_replacement }
    }

    /// Returns when the next replacement is due.
    #[must_use]
    pub const fn next_replacement(&self) -> DateTime<Utc> {
        self.next_replacement
    }
}

impl Command for FilterResetCommand {
    fn name(&self) -> &'static str {
        "filter_reset"
    }

    fn payload(&self) -> CommandPayload {
        CommandPayload::new().with(&fields::FILTER_DATETIME, self.next_replacement.timestamp())
    }
}
