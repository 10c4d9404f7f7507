// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plain WebSocket transport built on `tokio-tungstenite`.

use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message, error::ProtocolError as WsProtocolError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::{Connection, Connector, DEFAULT_CONNECT_TIMEOUT, DeviceAddress};
use crate::error::{ConnectionError, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials units over `ws://`.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use ecostream_lib::transport::{Connection, Connector, DeviceAddress, WebSocketConnector};
///
/// # async fn example() -> ecostream_lib::Result<()> {
/// let connector = WebSocketConnector::new().with_connect_timeout(Duration::from_secs(5));
/// let address = DeviceAddress::parse("10.0.0.5")?;
/// let mut connection = connector.connect(&address).await?;
/// let frame = connection.recv().await?;
/// println!("{frame}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    /// Creates a connector with the default connect timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for WebSocketConnector {
    type Connection = WebSocketConnection;

    async fn connect(&self, address: &DeviceAddress) -> Result<WebSocketConnection, ConnectionError> {
        let url = address.websocket_url();
        tracing::debug!(url = %url, "Opening WebSocket");

        match tokio::time::timeout(self.connect_timeout, connect_async(url.as_str())).await {
            Err(_) => Err(ConnectionError::Timeout {
                address: url,
                ms: duration_ms(self.connect_timeout),
            }),
            Ok(Err(err)) => Err(ConnectionError::Failed {
                address: url,
                message: err.to_string(),
            }),
            Ok(Ok((stream, _response))) => Ok(WebSocketConnection { stream }),
        }
    }
}

/// An open WebSocket to a unit.
pub struct WebSocketConnection {
    stream: WsStream,
}

impl fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketConnection").finish_non_exhaustive()
    }
}

impl Connection for WebSocketConnection {
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            match self.stream.next().await {
                None => return Err(TransportError::Closed),
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                // Lossy so that invalid bytes fail JSON decoding rather than the transport.
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(frame = ?frame, "Unit closed the WebSocket");
                    return Err(TransportError::Closed);
                }
                // tungstenite answers pings itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(err)) => return Err(map_ws_error(err)),
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::text(text))
            .await
            .map_err(map_ws_error)
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            tracing::trace!(error = %err, "Ignoring error while closing WebSocket");
        }
    }
}

fn map_ws_error(err: tungstenite::Error) -> TransportError {
    match err {
        tungstenite::Error::ConnectionClosed
        | tungstenite::Error::AlreadyClosed
        | tungstenite::Error::Protocol(WsProtocolError::ResetWithoutClosingHandshake) => {
            TransportError::Closed
        }
        tungstenite::Error::Io(io)
            if matches!(
                io.kind(),
                ErrorKind::BrokenPipe
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::UnexpectedEof
            ) =>
        {
            TransportError::Closed
        }
        other => TransportError::Io(other.to_string()),
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_conditions_map_to_closed() {
        assert_eq!(
            map_ws_error(tungstenite::Error::ConnectionClosed),
            TransportError::Closed
        );
        assert_eq!(
            map_ws_error(tungstenite::Error::AlreadyClosed),
            TransportError::Closed
        );
        assert_eq!(
            map_ws_error(tungstenite::Error::Protocol(
                WsProtocolError::ResetWithoutClosingHandshake
            )),
            TransportError::Closed
        );
        assert_eq!(
            map_ws_error(tungstenite::Error::Io(std::io::Error::from(
                ErrorKind::ConnectionReset
            ))),
            TransportError::Closed
        );
    }

    #[test]
    fn other_errors_map_to_io() {
        let err = map_ws_error(tungstenite::Error::Io(std::io::Error::from(
            ErrorKind::PermissionDenied,
        )));
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn connector_timeout_is_configurable() {
        let connector = WebSocketConnector::new().with_connect_timeout(Duration::from_secs(3));
        assert_eq!(connector.connect_timeout(), Duration::from_secs(3));
        assert_eq!(
            WebSocketConnector::default().connect_timeout(),
            DEFAULT_CONNECT_TIMEOUT
        );
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let address = DeviceAddress::parse(&format!("127.0.0.1:{port}")).unwrap();
        let err = WebSocketConnector::new().connect(&address).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Failed { .. }));
    }
}
