// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facade builder.

use std::sync::Arc;
use std::time::Duration;

use crate::config::EcostreamConfig;
use crate::coordinator::RefreshCoordinator;
use crate::device::{DeviceIdentity, Ecostream};
use crate::error::{ConnectionError, Error};
use crate::link::DeviceLink;
use crate::state::DeviceState;
use crate::transport::Connector;
#[cfg(feature = "websocket")]
use crate::transport::WebSocketConnector;

/// Builder for an [`Ecostream`] facade.
///
/// Created with [`Ecostream::builder`] for the WebSocket transport, or with
/// [`EcostreamBuilder::with_connector`] for any other [`Connector`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use ecostream_lib::Ecostream;
///
/// # async fn example() -> ecostream_lib::Result<()> {
/// // Connects, fetches once and starts polling
/// let (unit, initial) = Ecostream::builder("10.0.0.5")
///     .with_poll_interval(Duration::from_secs(60))
///     .build()
///     .await?;
/// println!("{} fields known", initial.field_count());
///
/// // Only checks that the unit answers
/// let identity = Ecostream::builder("10.0.0.6").probe().await?;
/// println!("found {}", identity.unique_id());
/// # unit.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EcostreamBuilder<C: Connector> {
    config: Result<EcostreamConfig, ConnectionError>,
    connector: C,
}

#[cfg(feature = "websocket")]
impl EcostreamBuilder<WebSocketConnector> {
    pub(crate) fn websocket(config: Result<EcostreamConfig, ConnectionError>) -> Self {
        let connector = match &config {
            Ok(config) => WebSocketConnector::new().with_connect_timeout(config.connect_timeout()),
            Err(_) => WebSocketConnector::new(),
        };
        Self { config, connector }
    }

    /// Sets the time allowed for the TCP connect and WebSocket handshake.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connector = self.connector.with_connect_timeout(timeout);
        self.config = self.config.map(|config| config.with_connect_timeout(timeout));
        self
    }
}

impl<C: Connector> EcostreamBuilder<C> {
    /// Creates a builder that dials `host` through `connector`.
    ///
    /// An invalid host is reported when the builder is consumed. The
    /// connector is used as given: it applies its own connect timeout, and
    /// the configuration's [`connect_timeout`](EcostreamConfig::connect_timeout)
    /// is not passed to it.
    #[must_use]
    pub fn with_connector(host: &str, connector: C) -> Self {
        Self {
            config: EcostreamConfig::new(host),
            connector,
        }
    }

    /// Creates a builder from a complete configuration.
    ///
    /// As with [`with_connector`](Self::with_connector), `connector` keeps
    /// its own connect timeout. Use [`Ecostream::connect`] to have the
    /// configured timeout applied to the WebSocket transport.
    #[must_use]
    pub fn from_config(config: EcostreamConfig, connector: C) -> Self {
        Self {
            config: Ok(config),
            connector,
        }
    }

    /// Sets the baseline poll period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.map(|config| config.with_poll_interval(interval));
        self
    }

    /// Sets the delay of the follow-up refresh after a command.
    #[must_use]
    pub fn with_follow_up_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.map(|config| config.with_follow_up_delay(delay));
        self
    }

    /// Sets how long a fetch waits for the unit. `None` waits forever.
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config = self.config.map(|config| config.with_receive_timeout(timeout));
        self
    }

    /// Connects, fetches the initial state, and starts the baseline poll.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The host is invalid or a period is zero
    /// - The connection cannot be established
    /// - The initial fetch fails
    ///
    /// Nothing keeps running after a failure.
    pub async fn build(self) -> Result<(Ecostream<C>, DeviceState), Error> {
        let (unit, initial) = self.connect().await?;
        unit.coordinator.start();
        Ok((unit, initial))
    }

    /// Like [`build`](Self::build), but refreshes only on demand and after
    /// commands.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub async fn build_without_polling(self) -> Result<(Ecostream<C>, DeviceState), Error> {
        self.connect().await
    }

    /// Connects, fetches once, and closes again.
    ///
    /// Used to check that a host is an answering unit before committing to
    /// it.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub async fn probe(self) -> Result<DeviceIdentity, Error> {
        let config = self.config?;
        config.validate()?;
        let link = DeviceLink::new(self.connector).with_receive_timeout(config.receive_timeout());
        let outcome = link.connect(config.address().clone()).await;
        link.close().await;

        let state = outcome?;
        let identity = DeviceIdentity::from_state(&state, config.address());
        tracing::info!(unit = %identity.unique_id(), "Probed EcoStream unit");
        Ok(identity)
    }

    async fn connect(self) -> Result<(Ecostream<C>, DeviceState), Error> {
        let config = self.config?;
        config.validate()?;

        let link = Arc::new(
            DeviceLink::new(self.connector).with_receive_timeout(config.receive_timeout()),
        );
        let initial = match link.connect(config.address().clone()).await {
            Ok(state) => state,
            Err(err) => {
                link.close().await;
                tracing::warn!(address = %config.address(), error = %err, "EcoStream setup failed");
                return Err(err);
            }
        };

        let identity = DeviceIdentity::from_state(&initial, config.address());
        let coordinator = RefreshCoordinator::new(Arc::clone(&link), config.refresh_settings());
        tracing::info!(unit = %identity.unique_id(), "EcoStream unit ready");
        Ok((Ecostream::new(coordinator, identity), initial))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::MockConnector;

    #[tokio::test]
    async fn invalid_host_is_reported_on_build() {
        let result = EcostreamBuilder::with_connector("wss://10.0.0.5", MockConnector::new())
            .build_without_polling()
            .await;
        assert!(matches!(
            result,
            Err(Error::Connection(ConnectionError::InvalidAddress(_)))
        ));
    }

    #[tokio::test]
    async fn zero_poll_interval_is_rejected_before_connecting() {
        let mock = MockConnector::new();
        let result = EcostreamBuilder::with_connector("10.0.0.5", mock.clone())
            .with_poll_interval(Duration::ZERO)
            .build()
            .await;
        assert!(matches!(result, Err(Error::Value(_))));
        assert_eq!(mock.connect_count(), 0);
    }

    #[tokio::test]
    async fn probe_closes_after_one_fetch() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Attic"}}));

        let identity = EcostreamBuilder::with_connector("10.0.0.5", mock.clone())
            .probe()
            .await
            .unwrap();
        assert_eq!(identity.name.as_deref(), Some("Attic"));
        assert_eq!(mock.connect_count(), 1);
        assert_eq!(mock.recv_count(), 1);
    }

    #[tokio::test]
    async fn connect_failure_aborts_setup() {
        let mock = MockConnector::new();
        mock.fail_next_connects(1);
        let result = EcostreamBuilder::with_connector("10.0.0.5", mock.clone())
            .build()
            .await;
        assert!(matches!(result, Err(Error::Connection(_))));
        assert_eq!(mock.recv_count(), 0);
    }

    #[cfg(feature = "websocket")]
    #[test]
    fn connect_timeout_reaches_connector() {
        let builder = Ecostream::builder("10.0.0.5").with_connect_timeout(Duration::from_secs(3));
        assert_eq!(builder.connector.connect_timeout(), Duration::from_secs(3));
        assert_eq!(
            builder.config.unwrap().connect_timeout(),
            Duration::from_secs(3)
        );
    }

    #[cfg(feature = "websocket")]
    #[test]
    fn configured_connect_timeout_reaches_websocket_connector() {
        let config = EcostreamConfig::new("10.0.0.5")
            .unwrap()
            .with_connect_timeout(Duration::from_secs(4));
        let builder = EcostreamBuilder::websocket(Ok(config));
        assert_eq!(builder.connector.connect_timeout(), Duration::from_secs(4));
    }
}
