// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device event types.

use crate::command::CommandPayload;
use crate::error::Error;
use crate::state::{DeviceState, FieldPath};

/// Events emitted by the refresh coordinator.
///
/// # Examples
///
/// ```
/// use ecostream_lib::event::DeviceEvent;
/// use ecostream_lib::state::{DeviceState, fields};
///
/// let event = DeviceEvent::refreshed(vec![fields::QSET], DeviceState::new());
/// assert!(event.is_refresh());
/// assert!(event.touches(&fields::QSET));
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A fetch completed and its message was merged.
    ///
    /// Emitted for every successful refresh, even when nothing changed, so
    /// observers can track freshness.
    Refreshed {
        /// Fields that differ from the previously published state.
        changed: Vec<FieldPath>,
        /// The merged state after the fetch.
        state: DeviceState,
    },

    /// A fetch failed. The previously known state is still valid.
    RefreshFailed {
        /// What went wrong.
        error: Error,
    },

    /// A configuration delta was handed to the unit.
    CommandSent {
        /// The delta that was sent.
        payload: CommandPayload,
    },
}

impl DeviceEvent {
    /// Creates a refreshed event.
    #[must_use]
    pub fn refreshed(changed: Vec<FieldPath>, state: DeviceState) -> Self {
        Self::Refreshed { changed, state }
    }

    /// Creates a refresh failed event.
    #[must_use]
    pub fn refresh_failed(error: Error) -> Self {
        Self::RefreshFailed { error }
    }

    /// Creates a command sent event.
    #[must_use]
    pub fn command_sent(payload: CommandPayload) -> Self {
        Self::CommandSent { payload }
    }

    /// Returns `true` for refresh outcomes, successful or not.
    #[must_use]
    pub fn is_refresh(&self) -> bool {
        matches!(self, Self::Refreshed { .. } | Self::RefreshFailed { .. })
    }

    /// Returns `true` if this event changed the value at `path`.
    #[must_use]
    pub fn touches(&self, path: &FieldPath) -> bool {
        match self {
            Self::Refreshed { changed, .. } => changed.contains(path),
            Self::CommandSent { payload } => payload.get(path).is_some(),
            Self::RefreshFailed { .. } => false,
        }
    }

    /// Returns the state carried by the event, if any.
    #[must_use]
    pub fn state(&self) -> Option<&DeviceState> {
        match self {
            Self::Refreshed { state, .. } => Some(state),
            _ => None,
        }
    }
}
