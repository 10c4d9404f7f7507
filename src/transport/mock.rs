// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scriptable in-memory transport.
//!
//! [`MockConnector`] stands in for a unit: tests queue the frames the unit
//! would push, script connection drops and failed connects, and inspect what
//! was sent. All connections opened by one connector read from the same
//! frame queue, so a reconnect picks up where the dropped connection left off.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{Connection, Connector, DeviceAddress};
use crate::error::{ConnectionError, TransportError};

#[derive(Debug)]
enum Frame {
    Text(String),
    Close,
    Error(String),
}

#[derive(Debug, Default)]
struct MockState {
    frames: VecDeque<Frame>,
    sent: Vec<String>,
    addresses: Vec<DeviceAddress>,
    connect_failures: usize,
    send_closures: usize,
    connects: usize,
    receives: usize,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockState>,
    frame_queued: Notify,
}

/// In-memory [`Connector`] with scripted behaviour.
///
/// Receives block until a frame is queued, like a real unit that only pushes
/// when it has something to say. Clones share the same script.
///
/// # Examples
///
/// ```
/// use ecostream_lib::transport::{Connection, Connector, DeviceAddress, MockConnector};
///
/// # async fn example() {
/// let mock = MockConnector::new();
/// mock.push_message(r#"{"status":{"qset":140}}"#);
///
/// let address = DeviceAddress::parse("10.0.0.5").unwrap();
/// let mut connection = mock.connect(&address).await.unwrap();
/// assert_eq!(connection.recv().await.unwrap(), r#"{"status":{"qset":140}}"#);
/// assert_eq!(mock.recv_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    shared: Arc<Shared>,
}

impl MockConnector {
    /// Creates a connector with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Scripting ==========

    /// Queues a text frame.
    pub fn push_message(&self, text: impl Into<String>) {
        self.push(Frame::Text(text.into()));
    }

    /// Queues a JSON value as a text frame.
    pub fn push_json(&self, value: &serde_json::Value) {
        self.push(Frame::Text(value.to_string()));
    }

    /// Queues a connection drop. The receiving connection reports
    /// [`TransportError::Closed`] and stays closed.
    pub fn push_close(&self) {
        self.push(Frame::Close);
    }

    /// Queues a non-recoverable transport failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.push(Frame::Error(message.into()));
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: usize) {
        self.shared.state.lock().connect_failures = count;
    }

    /// Makes the next `count` sends find the connection closed.
    pub fn close_next_sends(&self, count: usize) {
        self.shared.state.lock().send_closures = count;
    }

    fn push(&self, frame: Frame) {
        self.shared.state.lock().frames.push_back(frame);
        self.shared.frame_queued.notify_waiters();
    }

    // ========== Inspection ==========

    /// Number of successful connection attempts.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.shared.state.lock().connects
    }

    /// Number of frames handed to receivers, including scripted drops.
    #[must_use]
    pub fn recv_count(&self) -> usize {
        self.shared.state.lock().receives
    }

    /// Number of queued frames not yet received.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.shared.state.lock().frames.len()
    }

    /// Frames sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.shared.state.lock().sent.clone()
    }

    /// Frames sent so far, decoded as JSON. Undecodable frames are skipped.
    #[must_use]
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.shared
            .state
            .lock()
            .sent
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// Address of the most recent successful connection.
    #[must_use]
    pub fn last_address(&self) -> Option<DeviceAddress> {
        self.shared.state.lock().addresses.last().cloned()
    }
}

impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self, address: &DeviceAddress) -> Result<MockConnection, ConnectionError> {
        let mut state = self.shared.state.lock();
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(ConnectionError::Failed {
                address: address.websocket_url(),
                message: "scripted connect failure".to_string(),
            });
        }
        state.connects += 1;
        state.addresses.push(address.clone());
        drop(state);

        Ok(MockConnection {
            shared: Arc::clone(&self.shared),
            closed: false,
        })
    }
}

/// Connection handed out by [`MockConnector`].
#[derive(Debug)]
pub struct MockConnection {
    shared: Arc<Shared>,
    closed: bool,
}

impl Connection for MockConnection {
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            if self.closed {
                return Err(TransportError::Closed);
            }

            // Registered before checking the queue so a concurrent push is not missed.
            let queued = self.shared.frame_queued.notified();
            {
                let mut state = self.shared.state.lock();
                if let Some(frame) = state.frames.pop_front() {
                    state.receives += 1;
                    drop(state);
                    return match frame {
                        Frame::Text(text) => Ok(text),
                        Frame::Close => {
                            self.closed = true;
                            Err(TransportError::Closed)
                        }
                        Frame::Error(message) => Err(TransportError::Io(message)),
                    };
                }
            }
            queued.await;
        }
    }

    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let mut state = self.shared.state.lock();
        if state.send_closures > 0 {
            state.send_closures -= 1;
            drop(state);
            self.closed = true;
            return Err(TransportError::Closed);
        }
        state.sent.push(text);
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
