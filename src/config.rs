// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection configuration for a single unit.

use std::time::Duration;

use serde::Deserialize;

use crate::coordinator::{DEFAULT_FOLLOW_UP_DELAY, DEFAULT_POLL_INTERVAL, RefreshSettings};
use crate::error::{ConnectionError, ValueError};
use crate::link::DEFAULT_RECEIVE_TIMEOUT;
use crate::transport::{DEFAULT_CONNECT_TIMEOUT, DeviceAddress};

/// Everything needed to connect to and poll one unit.
///
/// Can be built in code or deserialized from a record such as
///
/// ```json
/// { "host": "10.0.0.5", "poll_interval_secs": 60 }
/// ```
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ecostream_lib::EcostreamConfig;
///
/// let config = EcostreamConfig::new("10.0.0.5")?
///     .with_poll_interval(Duration::from_secs(60));
/// assert_eq!(config.address().websocket_url(), "ws://10.0.0.5");
/// assert!(config.validate().is_ok());
///
/// let parsed: EcostreamConfig =
///     serde_json::from_str(r#"{"host": "10.0.0.5:8080", "follow_up_delay_secs": 5}"#).unwrap();
/// assert_eq!(parsed.follow_up_delay(), Duration::from_secs(5));
/// # Ok::<(), ecostream_lib::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct EcostreamConfig {
    address: DeviceAddress,
    poll_interval: Duration,
    follow_up_delay: Duration,
    connect_timeout: Duration,
    receive_timeout: Option<Duration>,
}

impl EcostreamConfig {
    /// Creates a configuration with default timings.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidAddress` if `host` cannot be parsed.
    pub fn new(host: &str) -> Result<Self, ConnectionError> {
        Ok(Self::from_address(DeviceAddress::parse(host)?))
    }

    /// Creates a configuration for an already parsed address.
    #[must_use]
    pub fn from_address(address: DeviceAddress) -> Self {
        Self {
            address,
            poll_interval: DEFAULT_POLL_INTERVAL,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            receive_timeout: Some(DEFAULT_RECEIVE_TIMEOUT),
        }
    }

    /// Sets the baseline poll period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the delay of the follow-up refresh after a command.
    #[must_use]
    pub fn with_follow_up_delay(mut self, delay: Duration) -> Self {
        self.follow_up_delay = delay;
        self
    }

    /// Sets the connect timeout.
    ///
    /// Applied to the WebSocket transport. A caller-supplied connector
    /// keeps its own timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the receive timeout. `None` waits forever.
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    #[must_use]
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn follow_up_delay(&self) -> Duration {
        self.follow_up_delay
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout
    }

    /// Checks that every period is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidConfiguration` naming the first offending
    /// setting.
    pub fn validate(&self) -> Result<(), ValueError> {
        let checks = [
            ("poll_interval", Some(self.poll_interval)),
            ("follow_up_delay", Some(self.follow_up_delay)),
            ("connect_timeout", Some(self.connect_timeout)),
            ("receive_timeout", self.receive_timeout),
        ];
        for (name, value) in checks {
            if value.is_some_and(|duration| duration.is_zero()) {
                return Err(ValueError::InvalidConfiguration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// Timing for the refresh coordinator.
    #[must_use]
    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings::default()
            .with_poll_interval(self.poll_interval)
            .with_follow_up_delay(self.follow_up_delay)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    host: String,
    poll_interval_secs: Option<u64>,
    follow_up_delay_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    receive_timeout_secs: Option<u64>,
}

impl TryFrom<RawConfig> for EcostreamConfig {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let mut config = Self::new(&raw.host).map_err(|err| err.to_string())?;
        if let Some(secs) = raw.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = raw.follow_up_delay_secs {
            config.follow_up_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = raw.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = raw.receive_timeout_secs {
            config.receive_timeout = Some(Duration::from_secs(secs));
        }
        config.validate().map_err(|err| err.to_string())?;
        Ok(config)
    }
}
