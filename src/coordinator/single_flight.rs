// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared in-flight operations.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Debug)]
struct Slot<T> {
    next_id: u64,
    current: Option<(u64, watch::Receiver<Option<T>>)>,
}

/// At most one operation in flight; late callers join it instead of
/// starting another.
///
/// Flights are numbered in the order they begin, which lets a caller insist
/// on a flight that began after some point in time.
#[derive(Debug)]
pub(crate) struct SingleFlight<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

/// Handle to a flight, returned by [`SingleFlight::begin`].
pub(crate) struct Flight<T> {
    pub(crate) id: u64,
    pub(crate) waiter: Waiter<T>,
    /// Present only for the caller that started the flight.
    pub(crate) leader: Option<Completion<T>>,
}

/// Waits for the outcome of a flight.
pub(crate) struct Waiter<T> {
    rx: watch::Receiver<Option<T>>,
}

/// Publishes the outcome of a flight. Dropping it without completing
/// releases the slot and wakes waiters empty-handed.
pub(crate) struct Completion<T> {
    slot: Arc<Mutex<Slot<T>>>,
    id: u64,
    tx: watch::Sender<Option<T>>,
    completed: bool,
}

impl<T: Clone> SingleFlight<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                next_id: 0,
                current: None,
            })),
        }
    }

    /// Joins the current flight, or starts one if none is in progress.
    pub(crate) fn begin(&self) -> Flight<T> {
        let mut slot = self.slot.lock();
        if let Some((id, rx)) = &slot.current {
            return Flight {
                id: *id,
                waiter: Waiter { rx: rx.clone() },
                leader: None,
            };
        }

        let id = slot.next_id;
        slot.next_id += 1;
        let (tx, rx) = watch::channel(None);
        slot.current = Some((id, rx.clone()));
        Flight {
            id,
            waiter: Waiter { rx },
            leader: Some(Completion {
                slot: Arc::clone(&self.slot),
                id,
                tx,
                completed: false,
            }),
        }
    }

    /// Id the next flight to begin will get.
    pub(crate) fn next_id(&self) -> u64 {
        self.slot.lock().next_id
    }

    /// Returns `true` while a flight is in progress.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> bool {
        self.slot.lock().current.is_some()
    }
}

impl<T: Clone> Waiter<T> {
    /// Returns the outcome, or `None` if the flight was abandoned.
    pub(crate) async fn wait(mut self) -> Option<T> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        }
    }
}

impl<T> Completion<T> {
    /// Releases the slot, then hands `outcome` to every waiter.
    pub(crate) fn complete(mut self, outcome: T) {
        self.release();
        self.tx.send_replace(Some(outcome));
        self.completed = true;
    }

    fn release(&self) {
        let mut slot = self.slot.lock();
        if slot.current.as_ref().is_some_and(|(id, _)| *id == self.id) {
            slot.current = None;
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if !self.completed {
            self.release();
        }
    }
}
