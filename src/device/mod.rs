// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level handle for one `EcoStream` unit.
//!
//! [`Ecostream`] ties a [`DeviceLink`] and its [`RefreshCoordinator`]
//! together behind one API: read the latest state, observe changes, and send
//! commands that are verified by refreshing right after.
//!
//! ```no_run
//! use ecostream_lib::Ecostream;
//! use ecostream_lib::command::BypassCommand;
//!
//! # async fn example() -> ecostream_lib::Result<()> {
//! let (unit, _) = Ecostream::builder("10.0.0.5").build().await?;
//!
//! let state = unit.execute(&BypassCommand::close()).await?;
//! println!("bypass at {:?}", state.number(&ecostream_lib::state::fields::BYPASS_POS));
//!
//! unit.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::EcostreamBuilder;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, watch};

#[cfg(feature = "websocket")]
use crate::config::EcostreamConfig;
use crate::command::{Command, CommandPayload};
use crate::coordinator::{RefreshCoordinator, RefreshStatus};
use crate::error::Error;
use crate::event::DeviceEvent;
use crate::link::DeviceLink;
use crate::state::DeviceState;
use crate::transport::{Connector, DeviceAddress};
#[cfg(feature = "websocket")]
use crate::transport::WebSocketConnector;

/// Who a unit is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    /// `system.system_name`, if the unit reported one.
    pub name: Option<String>,
    /// Where the unit was reached.
    pub address: DeviceAddress,
}

impl DeviceIdentity {
    pub(crate) fn from_state(state: &DeviceState, address: &DeviceAddress) -> Self {
        Self {
            name: state.system_name().map(str::to_owned),
            address: address.clone(),
        }
    }

    /// Stable identifier: the unit's name, or its address if unnamed.
    #[must_use]
    pub fn unique_id(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.address.to_string(),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A connected `EcoStream` unit.
///
/// Cloning is cheap; clones share the connection and the coordinator.
pub struct Ecostream<C: Connector> {
    coordinator: RefreshCoordinator<C>,
    identity: Arc<DeviceIdentity>,
}

impl<C: Connector> Clone for Ecostream<C> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            identity: Arc::clone(&self.identity),
        }
    }
}

#[cfg(feature = "websocket")]
impl Ecostream<WebSocketConnector> {
    /// Starts building a facade for the unit at `host`.
    #[must_use]
    pub fn builder(host: &str) -> EcostreamBuilder<WebSocketConnector> {
        EcostreamBuilder::websocket(EcostreamConfig::new(host))
    }

    /// Connects over WebSocket using `config` and starts polling.
    ///
    /// # Errors
    ///
    /// See [`EcostreamBuilder::build`].
    pub async fn connect(config: EcostreamConfig) -> Result<(Self, DeviceState), Error> {
        EcostreamBuilder::websocket(Ok(config)).build().await
    }
}

impl<C: Connector> Ecostream<C> {
    pub(crate) fn new(coordinator: RefreshCoordinator<C>, identity: DeviceIdentity) -> Self {
        Self {
            coordinator,
            identity: Arc::new(identity),
        }
    }

    /// Returns who the unit is, as learned during setup.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the latest merged state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.coordinator.state()
    }

    // ========== Refresh ==========

    /// Fetches now, or joins a fetch in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`Error::ShutDown`] after shutdown.
    pub async fn refresh(&self) -> Result<DeviceState, Error> {
        self.coordinator.refresh().await
    }

    /// Asks for a refresh without waiting for it.
    pub fn request_refresh(&self) {
        self.coordinator.request_refresh();
    }

    // ========== Commands ==========

    /// Sends a raw configuration delta and refreshes.
    ///
    /// # Errors
    ///
    /// Returns the send error, or [`Error::ShutDown`] after shutdown.
    pub async fn send_command(&self, payload: &CommandPayload) -> Result<DeviceState, Error> {
        self.coordinator.send_command(payload).await
    }

    /// Sends a typed command and refreshes.
    ///
    /// # Errors
    ///
    /// Returns the send error, or [`Error::ShutDown`] after shutdown.
    pub async fn execute<K: Command + ?Sized>(&self, command: &K) -> Result<DeviceState, Error> {
        let payload = command.payload();
        tracing::debug!(command = command.name(), unit = %self.identity.unique_id(), "Executing command");
        self.coordinator.send_command(&payload).await
    }

    // ========== Observation ==========

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.coordinator.subscribe()
    }

    /// Subscribes to refresh and command events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<DeviceEvent> {
        self.coordinator.events()
    }

    /// Returns the outcome history of fetches.
    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        self.coordinator.status()
    }

    // ========== Lifecycle ==========

    /// Replaces the connection with a fresh one to the same address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if dialling fails.
    pub async fn reconnect(&self) -> Result<(), Error> {
        self.link().reconnect().await
    }

    /// Stops all refreshing and closes the connection.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown();
        self.link().close().await;
        tracing::info!(unit = %self.identity.unique_id(), "EcoStream unit released");
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.coordinator.is_shut_down()
    }

    fn link(&self) -> &Arc<DeviceLink<C>> {
        self.coordinator.link()
    }
}

impl<C: Connector> fmt::Debug for Ecostream<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ecostream")
            .field("identity", &self.identity)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::command::FanSpeedCommand;
    use crate::state::fields;
    use crate::transport::MockConnector;

    async fn unit(mock: &MockConnector) -> Ecostream<MockConnector> {
        mock.push_json(&json!({"system": {"system_name": "Unit1"}, "status": {"qset": 140}}));
        let (unit, initial) = EcostreamBuilder::with_connector("10.0.0.5", mock.clone())
            .build_without_polling()
            .await
            .unwrap();
        assert_eq!(initial.number(&fields::QSET), Some(140.0));
        unit
    }

    #[test]
    fn unique_id_falls_back_to_address() {
        let address = DeviceAddress::parse("10.0.0.5:8080").unwrap();
        let unnamed = DeviceIdentity::from_state(&DeviceState::new(), &address);
        assert_eq!(unnamed.unique_id(), "10.0.0.5:8080");
        assert_eq!(unnamed.to_string(), "10.0.0.5:8080");

        let named = DeviceIdentity {
            name: Some("Unit1".to_string()),
            address,
        };
        assert_eq!(named.unique_id(), "Unit1");
        assert_eq!(named.to_string(), "Unit1 (10.0.0.5:8080)");
    }

    #[tokio::test]
    async fn identity_comes_from_initial_fetch() {
        let mock = MockConnector::new();
        let unit = unit(&mock).await;
        assert_eq!(unit.identity().unique_id(), "Unit1");
        assert_eq!(unit.state().system_name(), Some("Unit1"));
        unit.shutdown().await;
    }

    #[tokio::test]
    async fn execute_sends_payload_and_refreshes() {
        let mock = MockConnector::new();
        let unit = unit(&mock).await;

        mock.push_json(&json!({"status": {"qset": 200}}));
        let state = unit.execute(&FanSpeedCommand::new(200)).await.unwrap();

        assert_eq!(state.number(&fields::QSET), Some(200.0));
        assert_eq!(
            mock.sent_json(),
            vec![json!({"config": {"man_override_set": 200, "man_override_set_time": 1800}})]
        );
        unit.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_closes_and_rejects_further_use() {
        let mock = MockConnector::new();
        let unit = unit(&mock).await;
        unit.shutdown().await;

        assert!(unit.is_shut_down());
        assert!(matches!(unit.refresh().await, Err(Error::ShutDown)));
        assert!(!unit.link().is_connected().await);
    }

    #[tokio::test]
    async fn reconnect_dials_same_address() {
        let mock = MockConnector::new();
        let unit = unit(&mock).await;
        unit.reconnect().await.unwrap();

        assert_eq!(mock.connect_count(), 2);
        assert_eq!(mock.last_address(), Some(DeviceAddress::parse("10.0.0.5").unwrap()));
        unit.shutdown().await;
    }
}
