// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh bookkeeping.

use chrono::{DateTime, Utc};

use crate::error::Error;

/// Whether a fetch is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    /// No fetch in progress.
    #[default]
    Idle,
    /// A fetch is waiting on the unit.
    Fetching,
}

/// Outcome history of the coordinator's fetches.
///
/// A failed fetch never clears the state; it is recorded here instead, so
/// observers can tell stale data from fresh data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshStatus {
    /// Current phase.
    pub phase: RefreshPhase,
    /// Error of the most recent fetch, if it failed.
    pub last_error: Option<Error>,
    /// When a fetch last succeeded.
    pub last_success: Option<DateTime<Utc>>,
    /// Failed fetches since the last success.
    pub consecutive_failures: u32,
    /// Successful fetches so far.
    pub fetch_count: u64,
}

impl RefreshStatus {
    /// Returns `true` if the most recent fetch failed.
    #[must_use]
    pub fn last_fetch_failed(&self) -> bool {
        self.last_error.is_some()
    }

    pub(crate) fn begin(&mut self) {
        self.phase = RefreshPhase::Fetching;
    }

    pub(crate) fn succeeded(&mut self, at: DateTime<Utc>) {
        self.phase = RefreshPhase::Idle;
        self.last_error = None;
        self.last_success = Some(at);
        self.consecutive_failures = 0;
        self.fetch_count += 1;
    }

    pub(crate) fn failed(&mut self, error: Error) {
        self.phase = RefreshPhase::Idle;
        self.last_error = Some(error);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub(crate) fn abandoned(&mut self) {
        self.phase = RefreshPhase::Idle;
    }
}
