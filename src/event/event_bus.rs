// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting device events.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts refresh outcomes and sent commands to any number of observers.
///
/// Every subscriber receives its own copy of each event published after it
/// subscribed.
///
/// # Capacity
///
/// The event bus has a fixed capacity (default 256). If the channel fills
/// up because a subscriber is slow, older events may be dropped for that
/// subscriber (they will receive a `RecvError::Lagged` error).
///
/// # Examples
///
/// ```
/// use ecostream_lib::event::{DeviceEvent, EventBus};
/// use ecostream_lib::state::DeviceState;
///
/// let bus = EventBus::new();
///
/// // Create a subscriber
/// let mut rx = bus.subscribe();
///
/// // Publish an event
/// bus.publish(DeviceEvent::refreshed(Vec::new(), DeviceState::new()));
///
/// // Multiple subscribers can exist
/// let mut rx2 = bus.subscribe();
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events that can be buffered
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to device events.
    ///
    /// Returns a receiver that will receive all events published after
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// If there are no subscribers, the event is silently discarded.
    /// If the channel is full for a slow subscriber, that subscriber
    /// will lose events.
    pub fn publish(&self, event: DeviceEvent) {
        // Ignore errors (no subscribers or channel closed)
        let _ = self.sender.send(event);
    }

    /// Publishes an event and returns the number of receivers that received it.
    ///
    /// Returns 0 if there are no subscribers.
    #[must_use]
    pub fn publish_counted(&self, event: DeviceEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
