// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device address parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectionError;

/// Port the unit serves its WebSocket on when none is given.
pub const DEFAULT_PORT: u16 = 80;

/// Network address of an `EcoStream` unit.
///
/// Accepts the forms a user or a discovery record typically provides:
/// `host`, `host:port`, `[ipv6]:port`, a bare IPv6 literal, and any of these
/// prefixed with `ws://`. Secure WebSocket URLs are rejected because the unit
/// only speaks plain WebSocket.
///
/// # Examples
///
/// ```
/// use ecostream_lib::transport::DeviceAddress;
///
/// let addr = DeviceAddress::parse("10.0.0.5").unwrap();
/// assert_eq!(addr.websocket_url(), "ws://10.0.0.5");
/// assert_eq!(addr.port(), 80);
///
/// let addr = DeviceAddress::parse("ecostream.local:8080").unwrap();
/// assert_eq!(addr.websocket_url(), "ws://ecostream.local:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    host: String,
    port: Option<u16>,
}

impl DeviceAddress {
    /// Parses a host string into an address.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidAddress`] if the input is empty,
    /// uses an unsupported scheme, or carries an invalid port.
    pub fn parse(input: &str) -> Result<Self, ConnectionError> {
        let invalid = |reason: &str| ConnectionError::InvalidAddress(format!("{input}: {reason}"));

        let trimmed = input.trim();
        let rest = if let Some(rest) = strip_prefix_ignore_case(trimmed, "ws://") {
            rest
        } else if strip_prefix_ignore_case(trimmed, "wss://").is_some() {
            return Err(invalid("secure WebSocket is not supported"));
        } else if trimmed.contains("://") {
            return Err(invalid("unsupported scheme"));
        } else {
            trimmed
        };
        let rest = rest.trim_end_matches('/');

        if rest.is_empty() {
            return Err(invalid("host is empty"));
        }
        if rest.contains('/') || rest.chars().any(char::is_whitespace) {
            return Err(invalid("host must not contain a path or whitespace"));
        }

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let Some((host, after)) = bracketed.split_once(']') else {
                return Err(invalid("unterminated IPv6 literal"));
            };
            let port = match after {
                "" => None,
                _ => match after.strip_prefix(':') {
                    Some(port) => Some(port),
                    None => return Err(invalid("unexpected text after IPv6 literal")),
                },
            };
            (host, port)
        } else {
            match rest.matches(':').count() {
                0 => (rest, None),
                1 => rest
                    .split_once(':')
                    .map_or((rest, None), |(host, port)| (host, Some(port))),
                // Bare IPv6 literal without a port.
                _ => (rest, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port = match port {
            None => None,
            Some(raw) => match raw.parse::<u16>() {
                Ok(0) | Err(_) => return Err(invalid("invalid port")),
                Ok(port) => Some(port),
            },
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Returns the host name or IP literal, without brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, defaulting to [`DEFAULT_PORT`].
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns the URL the WebSocket connector dials.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        format!("ws://{self}")
    }

    fn is_ipv6(&self) -> bool {
        self.host.contains(':')
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ipv6() {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

impl FromStr for DeviceAddress {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        input.get(prefix.len()..)
    } else {
        None
    }
}
