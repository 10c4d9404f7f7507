// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::command::ScheduleCommand;
use crate::state::{DeviceState, fields};

/// The weekly schedule as an on/off switch.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSwitch<'a> {
    state: &'a DeviceState,
}

impl<'a> ScheduleSwitch<'a> {
    #[must_use]
    pub const fn new(state: &'a DeviceState) -> Self {
        Self { state }
    }

    /// Returns whether the schedule is enabled, once reported.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.state.boolean(&fields::SCHEDULE_ENABLED)
    }

    #[must_use]
    pub const fn turn_on() -> ScheduleCommand {
        ScheduleCommand::enable()
    }

    #[must_use]
    pub const fn turn_off() -> ScheduleCommand {
        ScheduleCommand::disable()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::StateUpdate;

    #[test]
    fn reads_schedule_flag() {
        let mut state = DeviceState::new();
        assert_eq!(ScheduleSwitch::new(&state).is_on(), None);

        state.merge(StateUpdate::from_value(json!({"config": {"schedule_enabled": 1}})).unwrap());
        assert_eq!(ScheduleSwitch::new(&state).is_on(), Some(true));
        assert!(ScheduleSwitch::turn_on().enabled());
        assert!(!ScheduleSwitch::turn_off().enabled());
    }
}
