// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bypass valve view.

use crate::command::BypassCommand;
use crate::state::{DeviceState, fields};
use crate::types::BypassPosition;

/// Positions closer than this are considered equal.
const POSITION_TOLERANCE: f64 = 0.1;

/// Direction the valve is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveMotion {
    /// Moving towards a larger position.
    Opening,
    /// Moving towards position 0.
    Closing,
    /// Not moving, or the direction cannot be told.
    Idle,
}

/// Read-only view of the bypass valve.
///
/// # Examples
///
/// ```
/// use ecostream_lib::state::{DeviceState, StateUpdate};
/// use ecostream_lib::view::{BypassValve, ValveMotion};
///
/// let mut state = DeviceState::new();
/// state.merge(StateUpdate::parse(r#"{
///     "status": {"bypass_pos": 20},
///     "config": {"man_override_bypass": 100, "man_override_bypass_time": 86400}
/// }"#).unwrap());
///
/// let valve = BypassValve::new(&state);
/// assert_eq!(valve.position(), Some(20.0));
/// assert_eq!(valve.motion(), ValveMotion::Opening);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BypassValve<'a> {
    state: &'a DeviceState,
}

impl<'a> BypassValve<'a> {
    /// Views the valve in `state`.
    #[must_use]
    pub const fn new(state: &'a DeviceState) -> Self {
        Self { state }
    }

    /// Current position, 0 (closed) to 100 (open).
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.state.number(&fields::BYPASS_POS)
    }

    /// Position requested by the active override.
    #[must_use]
    pub fn target(&self) -> Option<f64> {
        if self.override_active() {
            self.state.number(&fields::MAN_OVERRIDE_BYPASS)
        } else {
            None
        }
    }

    /// Returns `true` while a manual bypass override is running.
    #[must_use]
    pub fn override_active(&self) -> bool {
        self.state
            .number(&fields::MAN_OVERRIDE_BYPASS_TIME)
            .is_some_and(|left| left > 0.0)
    }

    /// Returns `Some(true)` when the valve is fully closed.
    #[must_use]
    pub fn is_closed(&self) -> Option<bool> {
        self.position().map(|position| position <= 0.0)
    }

    /// Infers which way the valve is moving.
    ///
    /// With an override running, the position is compared against the
    /// override target. Without one, an open valve is closing unless summer
    /// comfort holds it open.
    #[must_use]
    pub fn motion(&self) -> ValveMotion {
        let Some(position) = self.position() else {
            return ValveMotion::Idle;
        };

        if self.override_active() {
            let Some(target) = self.state.number(&fields::MAN_OVERRIDE_BYPASS) else {
                return ValveMotion::Idle;
            };
            if (position - target).abs() < POSITION_TOLERANCE {
                ValveMotion::Idle
            } else if position > target {
                ValveMotion::Closing
            } else {
                ValveMotion::Opening
            }
        } else if self.state.boolean(&fields::SUM_COM_ENABLED) == Some(false) && position > 0.0 {
            ValveMotion::Closing
        } else {
            ValveMotion::Idle
        }
    }

    /// Command that moves the valve to `position`.
    #[must_use]
    pub const fn set_position(position: BypassPosition) -> BypassCommand {
        BypassCommand::new(position)
    }
}
