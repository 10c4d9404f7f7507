// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device link: one connection, one merged state.
//!
//! [`DeviceLink`] owns the connection to a single unit. It receives and
//! decodes the unit's partial snapshots, merges them into the authoritative
//! [`DeviceState`], and sends configuration deltas. A connection that drops
//! in the middle of an operation is re-established once and the operation
//! retried once; anything beyond that is returned to the caller. An
//! operation that finds no live connection spends its one reconnect opening
//! it.
//!
//! Connect, reconnect, fetch and send are serialized through one async
//! mutex, so merges happen in receive order and a send never interleaves
//! with a reconnect.

use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::command::CommandPayload;
use crate::error::{Error, Result, TransportError};
use crate::state::{DeviceState, StateUpdate};
use crate::transport::{Connection, Connector, DeviceAddress};

/// Default limit on how long a fetch waits for the unit to push a frame.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(30);

struct Session<T> {
    address: Option<DeviceAddress>,
    connection: Option<T>,
}

/// Connection owner and state merger for one unit.
///
/// # Examples
///
/// ```no_run
/// use ecostream_lib::link::DeviceLink;
/// use ecostream_lib::transport::{DeviceAddress, WebSocketConnector};
///
/// # async fn example() -> ecostream_lib::Result<()> {
/// let link = DeviceLink::new(WebSocketConnector::new());
/// let state = link.connect(DeviceAddress::parse("10.0.0.5")?).await?;
/// println!("connected to {:?}", state.system_name());
///
/// // Each fetch merges exactly one message
/// let state = link.fetch().await?;
/// println!("{} fields known", state.field_count());
/// # Ok(())
/// # }
/// ```
pub struct DeviceLink<C: Connector> {
    connector: C,
    session: Mutex<Session<C::Connection>>,
    state: RwLock<DeviceState>,
    receive_timeout: Option<Duration>,
}

impl<C: Connector> DeviceLink<C> {
    /// Creates a link with an empty state and no connection.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            session: Mutex::new(Session {
                address: None,
                connection: None,
            }),
            state: RwLock::new(DeviceState::new()),
            receive_timeout: Some(DEFAULT_RECEIVE_TIMEOUT),
        }
    }

    /// Sets how long a fetch waits for a frame. `None` waits forever.
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    // ========== Connection lifecycle ==========

    /// Connects to `address` and fetches once so the unit's identity is
    /// known immediately.
    ///
    /// The address is recorded before dialling, so a later
    /// [`reconnect`](Self::reconnect) targets it even if this call fails.
    /// Any previous connection is closed and replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the connection cannot be established,
    /// or any error of the initial [`fetch`](Self::fetch).
    pub async fn connect(&self, address: DeviceAddress) -> Result<DeviceState> {
        let mut session = self.session.lock().await;
        session.address = Some(address.clone());
        self.reopen(&mut session).await?;
        tracing::info!(address = %address, "Connected to EcoStream unit");
        self.fetch_locked(&mut session).await
    }

    /// Opens a new connection to the recorded address, replacing the
    /// current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] if no address was ever given, or
    /// [`Error::Connection`] if dialling fails.
    pub async fn reconnect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        self.reopen(&mut session).await
    }

    /// Closes the connection. The address and state are kept, and the next
    /// fetch or send reopens the connection.
    pub async fn close(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut connection) = session.connection.take() {
            connection.close().await;
            tracing::debug!("Closed connection to EcoStream unit");
        }
    }

    /// Returns the recorded address.
    pub async fn address(&self) -> Option<DeviceAddress> {
        self.session.lock().await.address.clone()
    }

    /// Returns `true` if a connection is currently open.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.connection.is_some()
    }

    // ========== Data flow ==========

    /// Receives one message, merges it, and returns the updated state.
    ///
    /// If the connection turns out to be closed, the link reconnects once
    /// and receives once more on the new connection. An undecodable message
    /// leaves the state untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the message cannot be decoded
    /// - [`Error::Transport`] if the retry fails too, or on timeout
    /// - [`Error::Connection`] if reconnecting fails
    /// - [`Error::NotConnected`] if no address was ever given
    pub async fn fetch(&self) -> Result<DeviceState> {
        let mut session = self.session.lock().await;
        self.fetch_locked(&mut session).await
    }

    /// Sends a configuration delta.
    ///
    /// If the connection turns out to be closed, the link reconnects once
    /// and resends once. The local state is not touched; the unit's echo
    /// arrives with a later fetch.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the payload is empty
    /// - [`Error::Transport`] if the resend fails too
    /// - [`Error::Connection`] if reconnecting fails
    /// - [`Error::NotConnected`] if no address was ever given
    pub async fn send(&self, payload: &CommandPayload) -> Result<()> {
        let text = payload.encode()?;
        let mut session = self.session.lock().await;
        let reopened = self.ensure_open(&mut session).await?;

        match self.transmit(&mut session, text.clone()).await {
            Err(err) if err.is_closed() && !reopened => {
                tracing::warn!("Connection closed while sending, reconnecting to resend");
                self.reopen(&mut session).await?;
                self.transmit(&mut session, text).await
            }
            other => other,
        }
    }

    // ========== State ==========

    /// Returns a snapshot of the merged state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Returns the unit's name, once reported.
    #[must_use]
    pub fn device_name(&self) -> Option<String> {
        self.state.read().system_name().map(str::to_owned)
    }

    // ========== Internals ==========

    async fn reopen(&self, session: &mut Session<C::Connection>) -> Result<()> {
        let address = session.address.clone().ok_or(Error::NotConnected)?;
        if let Some(mut previous) = session.connection.take() {
            previous.close().await;
        }
        tracing::debug!(address = %address, "Opening connection");
        let connection = self.connector.connect(&address).await?;
        session.connection = Some(connection);
        Ok(())
    }

    /// Opens a connection if none is live. Returns `true` if it dialled, in
    /// which case the caller has used up its one reconnect.
    async fn ensure_open(&self, session: &mut Session<C::Connection>) -> Result<bool> {
        if session.connection.is_some() {
            return Ok(false);
        }
        self.reopen(session).await?;
        Ok(true)
    }

    async fn fetch_locked(&self, session: &mut Session<C::Connection>) -> Result<DeviceState> {
        let reopened = self.ensure_open(session).await?;
        let text = match self.receive(session).await {
            Err(err) if err.is_closed() && !reopened => {
                tracing::warn!("Connection closed while fetching, reconnecting");
                self.reopen(session).await?;
                self.receive(session).await?
            }
            other => other?,
        };
        self.merge_text(&text)
    }

    async fn receive(&self, session: &mut Session<C::Connection>) -> Result<String> {
        let Some(connection) = session.connection.as_mut() else {
            return Err(Error::NotConnected);
        };

        let result = match self.receive_timeout {
            Some(limit) => tokio::time::timeout(limit, connection.recv())
                .await
                .unwrap_or_else(|_| Err(TransportError::Timeout(duration_ms(limit)))),
            None => connection.recv().await,
        };
        if matches!(result, Err(TransportError::Closed)) {
            session.connection = None;
        }
        result.map_err(Error::from)
    }

    async fn transmit(&self, session: &mut Session<C::Connection>, text: String) -> Result<()> {
        let Some(connection) = session.connection.as_mut() else {
            return Err(Error::NotConnected);
        };

        tracing::debug!(bytes = text.len(), "Sending payload");
        let result = connection.send(text).await;
        if matches!(result, Err(TransportError::Closed)) {
            session.connection = None;
        }
        result.map_err(Error::from)
    }

    fn merge_text(&self, text: &str) -> Result<DeviceState> {
        let update = StateUpdate::parse(text).inspect_err(|err| {
            tracing::warn!(error = %err, "Discarding undecodable message");
        })?;

        let mut state = self.state.write();
        let changed = state.merge(update);
        tracing::debug!(changed = changed.len(), "Merged message into device state");
        Ok(state.clone())
    }
}

impl<C: Connector + std::fmt::Debug> std::fmt::Debug for DeviceLink<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("connector", &self.connector)
            .field("receive_timeout", &self.receive_timeout)
            .finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{ConnectionError, ProtocolError};
    use crate::state::fields;
    use crate::transport::MockConnector;

    fn address() -> DeviceAddress {
        DeviceAddress::parse("10.0.0.5").unwrap()
    }

    fn link(mock: &MockConnector) -> DeviceLink<MockConnector> {
        DeviceLink::new(mock.clone()).with_receive_timeout(None)
    }

    #[tokio::test]
    async fn connect_fetches_identity() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));

        let link = link(&mock);
        let state = link.connect(address()).await.unwrap();

        assert_eq!(state.system_name(), Some("Unit1"));
        assert_eq!(link.device_name().as_deref(), Some("Unit1"));
        assert_eq!(link.address().await, Some(address()));
        assert!(link.is_connected().await);
        assert_eq!(mock.connect_count(), 1);
    }

    #[tokio::test]
    async fn connect_failure_propagates() {
        let mock = MockConnector::new();
        mock.fail_next_connects(1);

        let err = link(&mock).connect(address()).await.unwrap_err();
        assert!(matches!(err, Error::Connection(ConnectionError::Failed { .. })));
    }

    #[tokio::test]
    async fn reconnect_without_address_fails() {
        let mock = MockConnector::new();
        let link = link(&mock);

        assert_eq!(link.reconnect().await, Err(Error::NotConnected));
        assert_eq!(link.fetch().await, Err(Error::NotConnected));
        assert_eq!(mock.connect_count(), 0);
    }

    #[tokio::test]
    async fn reconnect_replaces_connection() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));
        let link = link(&mock);
        link.connect(address()).await.unwrap();

        link.reconnect().await.unwrap();
        assert_eq!(mock.connect_count(), 2);
        assert_eq!(link.device_name().as_deref(), Some("Unit1"));
    }

    #[tokio::test]
    async fn fetch_merges_partial_snapshots() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_json(&json!({"status": {"bypass_pos": 50}}));

        let link = link(&mock);
        link.connect(address()).await.unwrap();
        link.fetch().await.unwrap();
        let state = link.fetch().await.unwrap();

        assert_eq!(state.system_name(), Some("Unit1"));
        assert_eq!(state.integer(&fields::QSET), Some(140));
        assert_eq!(state.integer(&fields::BYPASS_POS), Some(50));
    }

    #[tokio::test]
    async fn undecodable_message_leaves_state_unchanged() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_message("{\"status\": ");
        mock.push_json(&json!({"status": "broken"}));

        let link = link(&mock);
        let before = link.connect(address()).await.unwrap();

        assert!(matches!(link.fetch().await, Err(Error::Protocol(ProtocolError::Json(_)))));
        assert!(matches!(
            link.fetch().await,
            Err(Error::Protocol(ProtocolError::InvalidSection { .. }))
        ));
        assert_eq!(link.state(), before);
    }

    #[tokio::test]
    async fn fetch_reconnects_once_on_close() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_close();
        mock.push_json(&json!({"status": {"qset": 200}}));

        let link = link(&mock);
        link.connect(address()).await.unwrap();
        let state = link.fetch().await.unwrap();

        assert_eq!(state.integer(&fields::QSET), Some(200));
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test]
    async fn fetch_gives_up_after_second_close() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_close();
        mock.push_close();

        let link = link(&mock);
        link.connect(address()).await.unwrap();
        let err = link.fetch().await.unwrap_err();

        assert!(err.is_closed());
        assert_eq!(mock.connect_count(), 2);
        assert_eq!(link.state().integer(&fields::QSET), Some(140));
    }

    #[tokio::test]
    async fn fetch_reports_failed_reconnect() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_close();

        let link = link(&mock);
        link.connect(address()).await.unwrap();
        mock.fail_next_connects(1);

        assert!(matches!(link.fetch().await, Err(Error::Connection(_))));
        assert!(!link.is_connected().await);

        // The next fetch dials again instead of staying broken
        mock.push_json(&json!({"status": {"qset": 90}}));
        let state = link.fetch().await.unwrap();
        assert_eq!(state.integer(&fields::QSET), Some(90));
    }

    #[tokio::test]
    async fn fetch_after_failed_reconnect_dials_only_once() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        mock.push_close();

        let link = link(&mock);
        link.connect(address()).await.unwrap();
        mock.fail_next_connects(1);
        assert!(matches!(link.fetch().await, Err(Error::Connection(_))));
        let connects_before = mock.connect_count();

        // Reopening the dropped connection is this fetch's one reconnect
        mock.push_close();
        mock.push_json(&json!({"status": {"qset": 90}}));
        let err = link.fetch().await.unwrap_err();

        assert!(err.is_closed());
        assert_eq!(mock.connect_count(), connects_before + 1);
        assert_eq!(link.state().integer(&fields::QSET), Some(140));
    }

    #[tokio::test]
    async fn send_after_close_dials_only_once() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));
        let link = link(&mock);
        link.connect(address()).await.unwrap();
        link.close().await;

        mock.close_next_sends(1);
        let payload = CommandPayload::new().with(&fields::SCHEDULE_ENABLED, true);
        let err = link.send(&payload).await.unwrap_err();

        assert!(err.is_closed());
        assert!(mock.sent().is_empty());
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test]
    async fn send_resends_once_after_close() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));
        let link = link(&mock);
        link.connect(address()).await.unwrap();

        mock.close_next_sends(1);
        let payload = CommandPayload::new().with(&fields::SCHEDULE_ENABLED, true);
        link.send(&payload).await.unwrap();

        assert_eq!(mock.sent_json(), vec![json!({"config": {"schedule_enabled": true}})]);
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test]
    async fn send_surfaces_second_failure() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"system": {"system_name": "Unit1"}}));
        let link = link(&mock);
        link.connect(address()).await.unwrap();

        mock.close_next_sends(2);
        let payload = CommandPayload::new().with(&fields::SCHEDULE_ENABLED, true);
        let err = link.send(&payload).await.unwrap_err();

        assert!(err.is_closed());
        assert!(mock.sent().is_empty());
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test]
    async fn send_does_not_touch_state() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"config": {"schedule_enabled": false}}));
        let link = link(&mock);
        let before = link.connect(address()).await.unwrap();

        let payload = CommandPayload::new().with(&fields::SCHEDULE_ENABLED, true);
        link.send(&payload).await.unwrap();
        assert_eq!(link.state(), before);
    }

    #[tokio::test]
    async fn send_rejects_empty_payload() {
        let mock = MockConnector::new();
        let link = link(&mock);
        assert_eq!(
            link.send(&CommandPayload::new()).await,
            Err(Error::Protocol(ProtocolError::EmptyPayload))
        );
    }

    #[tokio::test]
    async fn close_keeps_state_and_next_fetch_reopens() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        let link = link(&mock);
        link.connect(address()).await.unwrap();

        link.close().await;
        assert!(!link.is_connected().await);
        assert_eq!(link.state().integer(&fields::QSET), Some(140));

        mock.push_json(&json!({"status": {"bypass_pos": 10}}));
        link.fetch().await.unwrap();
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_times_out_without_reconnecting() {
        let mock = MockConnector::new();
        mock.push_json(&json!({"status": {"qset": 140}}));
        let link = DeviceLink::new(mock.clone()).with_receive_timeout(Some(Duration::from_secs(5)));
        link.connect(address()).await.unwrap();

        let err = link.fetch().await.unwrap_err();
        assert_eq!(err, Error::Transport(TransportError::Timeout(5000)));
        assert_eq!(mock.connect_count(), 1);
        assert!(link.is_connected().await);
    }
}
