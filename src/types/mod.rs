// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type-safe values for `EcoStream` commands and readings.
//!
//! Constrained types validate on construction so that invalid values never
//! reach the unit.
//!
//! | Type | Range | Used by |
//! |------|-------|---------|
//! | [`BypassPosition`] | 0–100 % | bypass valve override |
//! | [`ComfortTemperature`] | 10–30 °C | summer comfort target |
//! | [`CapacityRange`] | `capacity_min`–`capacity_max` m³/h | fan percentage mapping |
//! | [`FanPreset`] | low / mid / high | fan presets |

mod bypass;
mod capacity;
mod preset;
mod temperature;
mod unit;

pub use bypass::BypassPosition;
pub use capacity::CapacityRange;
pub use preset::FanPreset;
pub use temperature::ComfortTemperature;
pub use unit::Unit;
