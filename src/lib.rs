// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `EcoStream` Lib - A Rust library to monitor and control BUVA `EcoStream`
//! ventilation units.
//!
//! The unit runs a WebSocket server on its local network. It pushes partial
//! JSON snapshots of its state and accepts partial configuration documents
//! as commands. This library keeps one connection per unit, merges every
//! snapshot into a complete [`DeviceState`], and refreshes it on a schedule.
//!
//! # Supported Features
//!
//! - **State tracking**: deep merge of partial snapshots, change detection
//! - **Refreshing**: 30 s baseline poll, on-demand refresh shared by all
//!   concurrent callers, verification refreshes after every command
//! - **Fan control**: airflow overrides by percentage or preset
//! - **Bypass valve**: manual overrides, movement detection
//! - **Summer comfort and schedule**: enable, disable, target temperature
//! - **Sensors**: temperatures, humidity, eCO2, TVOC, fan speeds, filter state
//!
//! # Quick Start
//!
//! ```no_run
//! use ecostream_lib::Ecostream;
//! use ecostream_lib::view::FanControl;
//!
//! #[tokio::main]
//! async fn main() -> ecostream_lib::Result<()> {
//!     // Connects, fetches once and starts polling
//!     // Returns (unit, initial_state) tuple
//!     let (unit, initial) = Ecostream::builder("10.0.0.5").build().await?;
//!     println!("connected to {}", unit.identity());
//!
//!     // Commands are derived from views of the current state
//!     let fan = FanControl::new(&initial)?;
//!     let state = unit.execute(&fan.set_percentage(60)?).await?;
//!     println!("airflow now {:?} m³/h", FanControl::new(&state)?.qset());
//!
//!     unit.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Observing Changes
//!
//! ```no_run
//! use ecostream_lib::Ecostream;
//! use ecostream_lib::view::readings;
//!
//! # async fn example() -> ecostream_lib::Result<()> {
//! let (unit, _) = Ecostream::builder("10.0.0.5").build().await?;
//!
//! let mut updates = unit.subscribe();
//! while updates.changed().await.is_ok() {
//!     for reading in readings(&updates.borrow_and_update()) {
//!         println!("{}: {reading}", reading.key);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower Layers
//!
//! The facade is built from two components that can be used directly:
//! [`DeviceLink`](link::DeviceLink) owns the connection and the merged
//! state, and [`RefreshCoordinator`](coordinator::RefreshCoordinator)
//! decides when to fetch. Both are generic over a
//! [`Connector`](transport::Connector), so tests can run against
//! [`MockConnector`](transport::MockConnector).

pub mod command;
pub mod config;
pub mod coordinator;
mod device;
pub mod error;
pub mod event;
pub mod link;
pub mod state;
pub mod transport;
pub mod types;
pub mod view;

pub use command::{
    BypassCommand, Command, CommandPayload, FanSpeedCommand, FilterResetCommand, ScheduleCommand,
    SummerComfortCommand,
};
pub use config::EcostreamConfig;
pub use coordinator::{RefreshCoordinator, RefreshSettings, RefreshStatus};
pub use device::{DeviceIdentity, Ecostream, EcostreamBuilder};
pub use error::{ConnectionError, Error, ProtocolError, Result, TransportError, ValueError};
pub use event::DeviceEvent;
pub use link::DeviceLink;
pub use state::{DeviceState, FieldPath, Section, StateUpdate};
pub use types::{BypassPosition, CapacityRange, ComfortTemperature, FanPreset};
