// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! The unit describes itself as a JSON document split into four
//! [`Section`]s. Every inbound frame is decoded into a [`StateUpdate`] and
//! merged into the [`DeviceState`], which only ever grows or overwrites
//! fields. Well-known paths live in [`fields`].

pub mod fields;

mod device_state;
mod section;
mod update;

pub use device_state::{DeviceErrorRecord, DeviceState};
pub use section::{FieldPath, Section};
pub use update::StateUpdate;

pub(crate) use update::{UnknownSections, decode_sections};

/// Fields of one section, keyed by wire name.
pub type Fields = serde_json::Map<String, serde_json::Value>;
