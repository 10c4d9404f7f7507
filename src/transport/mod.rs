// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports that carry JSON text frames to and from an `EcoStream` unit.
//!
//! The device link is generic over a [`Connector`], which dials a
//! [`DeviceAddress`] and yields a [`Connection`]. Two implementations ship
//! with the library:
//!
//! - [`WebSocketConnector`]: plain WebSocket, the unit's native transport
//!   (requires the `websocket` feature)
//! - [`MockConnector`]: a scriptable in-memory transport for tests and
//!   offline development
//!
//! A connection only moves text. Decoding and merging happen in the link so
//! that every transport shares the same semantics.

mod address;
mod mock;
#[cfg(feature = "websocket")]
mod websocket;

use std::future::Future;
use std::time::Duration;

pub use address::{DEFAULT_PORT, DeviceAddress};
pub use mock::{MockConnection, MockConnector};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use crate::error::{ConnectionError, TransportError};

/// Default time allowed for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Establishes connections to a unit.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError`] if the connection cannot be established.
    fn connect(
        &self,
        address: &DeviceAddress,
    ) -> impl Future<Output = Result<Self::Connection, ConnectionError>> + Send;
}

/// An established, exclusively owned connection to a unit.
pub trait Connection: Send + 'static {
    /// Waits for the next text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the peer closed or reset the
    /// connection, and [`TransportError::Io`] for other failures.
    fn recv(&mut self) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] when the connection is gone.
    fn send(&mut self, text: String) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Closes the connection. Errors are ignored.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}
