// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer notifications.
//!
//! The refresh coordinator publishes a [`DeviceEvent`] for every refresh
//! outcome and every command it sends. Observers that only care about the
//! latest state can use the coordinator's `watch` subscription instead.
//!
//! # Examples
//!
//! ```
//! use ecostream_lib::event::{DeviceEvent, EventBus};
//! use ecostream_lib::error::TransportError;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::refresh_failed(TransportError::Closed.into()));
//! assert!(rx.try_recv().unwrap().is_refresh());
//! ```

mod device_event;
mod event_bus;

pub use device_event::DeviceEvent;
pub use event_bus::EventBus;
