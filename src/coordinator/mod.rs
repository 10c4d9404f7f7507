// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Refresh coordination.
//!
//! The [`RefreshCoordinator`] decides when the device link fetches:
//!
//! - a baseline poll every 30 seconds,
//! - on demand through [`refresh`](RefreshCoordinator::refresh) and
//!   [`request_refresh`](RefreshCoordinator::request_refresh),
//! - right after a command, and once more after a short delay to pick up
//!   the values the unit settles on.
//!
//! At most one fetch is in flight. Callers that ask while a fetch is
//! running share its outcome rather than triggering another round-trip.

mod single_flight;
mod status;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub use status::{RefreshPhase, RefreshStatus};

use self::single_flight::{Completion, SingleFlight};
use crate::command::CommandPayload;
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, EventBus};
use crate::link::DeviceLink;
use crate::state::DeviceState;
use crate::transport::Connector;

/// Default baseline poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default delay of the follow-up refresh after a command.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_secs(10);

/// Timing of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    poll_interval: Duration,
    follow_up_delay: Duration,
}

impl RefreshSettings {
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

    /// Returns the baseline poll period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the follow-up delay.
    #[must_use]
    pub fn follow_up_delay(&self) -> Duration {
        self.follow_up_delay
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
        }
    }
}

struct Inner<C: Connector> {
    link: Arc<DeviceLink<C>>,
    settings: RefreshSettings,
    flight: SingleFlight<Result<DeviceState>>,
    published: watch::Sender<DeviceState>,
    events: EventBus,
    status: RwLock<RefreshStatus>,
    cancel: CancellationToken,
    shut_down: AtomicBool,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    follow_up: Mutex<Option<JoinHandle<()>>>,
}

/// Schedules fetches on a [`DeviceLink`] and notifies observers.
///
/// Cloning is cheap; clones drive the same coordinator.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use ecostream_lib::coordinator::{RefreshCoordinator, RefreshSettings};
/// use ecostream_lib::link::DeviceLink;
/// use ecostream_lib::transport::{DeviceAddress, WebSocketConnector};
///
/// # async fn example() -> ecostream_lib::Result<()> {
/// let link = Arc::new(DeviceLink::new(WebSocketConnector::new()));
/// link.connect(DeviceAddress::parse("10.0.0.5")?).await?;
///
/// let coordinator = RefreshCoordinator::new(link, RefreshSettings::default());
/// coordinator.start();
///
/// let mut updates = coordinator.subscribe();
/// updates.changed().await.ok();
/// println!("{:?}", updates.borrow().system_name());
///
/// coordinator.shutdown();
/// # Ok(())
/// # }
/// ```
pub struct RefreshCoordinator<C: Connector> {
    inner: Arc<Inner<C>>,
}

impl<C: Connector> Clone for RefreshCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector> RefreshCoordinator<C> {
    /// Creates a coordinator. Polling does not begin until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(link: Arc<DeviceLink<C>>, settings: RefreshSettings) -> Self {
        let (published, _) = watch::channel(link.state());
        Self {
            inner: Arc::new(Inner {
                link,
                settings,
                flight: SingleFlight::new(),
                published,
                events: EventBus::new(),
                status: RwLock::new(RefreshStatus::default()),
                cancel: CancellationToken::new(),
                shut_down: AtomicBool::new(false),
                poll_task: Mutex::new(None),
                follow_up: Mutex::new(None),
            }),
        }
    }

    // ========== Lifecycle ==========

    /// Starts the baseline poll. Calling it again, or after
    /// [`shutdown`](Self::shutdown), does nothing.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(&self) {
        if self.is_shut_down() {
            return;
        }
        let mut task = self.inner.poll_task.lock();
        if task.is_some() {
            return;
        }
        let period = self.inner.settings.poll_interval;
        *task = Some(tokio::spawn(poll_loop(
            Arc::downgrade(&self.inner),
            self.inner.cancel.clone(),
            period,
        )));
        tracing::debug!(interval_secs = period.as_secs(), "Started baseline polling");
    }

    /// Stops polling and pending follow-ups and cancels a running fetch.
    ///
    /// Takes effect before returning; no fetch starts afterwards.
    /// Idempotent.
    pub fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.cancel.cancel();
        if let Some(task) = self.inner.poll_task.lock().take() {
            task.abort();
        }
        if let Some(task) = self.inner.follow_up.lock().take() {
            task.abort();
        }
        tracing::info!("Refresh coordinator shut down");
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    /// Returns `true` while the baseline poll is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .poll_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    // ========== Refresh ==========

    /// Fetches now, or joins the fetch already in flight, and returns the
    /// resulting state.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or [`Error::ShutDown`] after shutdown.
    pub async fn refresh(&self) -> Result<DeviceState> {
        self.ensure_running()?;
        let flight = self.inner.flight.begin();
        self.lead(flight.leader);
        flight.waiter.wait().await.unwrap_or(Err(Error::ShutDown))
    }

    /// Asks for a refresh without waiting for it. Joins a fetch already in
    /// flight. Ignored after shutdown.
    ///
    /// Must be called within a Tokio runtime.
    pub fn request_refresh(&self) {
        if self.is_shut_down() {
            tracing::trace!("Ignoring refresh request after shutdown");
            return;
        }
        let flight = self.inner.flight.begin();
        self.lead(flight.leader);
    }

    /// Sends a command, refreshes immediately, and schedules a follow-up
    /// refresh.
    ///
    /// The immediate refresh always fetches after the send, so the returned
    /// state includes whatever the unit pushed in response. Its failure is
    /// logged and the last known state is returned instead. Scheduling a
    /// new command replaces a follow-up that has not fired yet.
    ///
    /// # Errors
    ///
    /// Returns the send error, or [`Error::ShutDown`] after shutdown.
    pub async fn send_command(&self, payload: &CommandPayload) -> Result<DeviceState> {
        self.ensure_running()?;
        self.inner.link.send(payload).await?;
        self.inner
            .events
            .publish(DeviceEvent::command_sent(payload.clone()));
        tracing::debug!(fields = payload.field_count(), "Command sent, refreshing");

        let state = match self.refresh_after(self.inner.flight.next_id()).await {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(error = %err, "Refresh after command failed");
                self.inner.link.state()
            }
        };
        if !self.is_shut_down() {
            self.schedule_follow_up();
        }
        Ok(state)
    }

    // ========== Observation ==========

    /// Returns the link's merged state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.inner.link.state()
    }

    /// Subscribes to the published state. Receivers are notified when a
    /// refresh changes it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.inner.published.subscribe()
    }

    /// Subscribes to refresh and command events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the outcome history of fetches.
    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        self.inner.status.read().clone()
    }

    /// Returns the timing settings.
    #[must_use]
    pub fn settings(&self) -> RefreshSettings {
        self.inner.settings
    }

    /// Returns the device link.
    #[must_use]
    pub fn link(&self) -> &Arc<DeviceLink<C>> {
        &self.inner.link
    }

    // ========== Internals ==========

    fn ensure_running(&self) -> Result<()> {
        if self.is_shut_down() {
            Err(Error::ShutDown)
        } else {
            Ok(())
        }
    }

    /// Runs the fetch of a flight this caller started.
    fn lead(&self, leader: Option<Completion<Result<DeviceState>>>) {
        if let Some(completion) = leader {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let outcome = inner.run_fetch().await;
                completion.complete(outcome);
            });
        }
    }

    /// Refreshes with a flight numbered `first_id` or later, waiting out an
    /// older one first.
    async fn refresh_after(&self, first_id: u64) -> Result<DeviceState> {
        loop {
            self.ensure_running()?;
            let flight = self.inner.flight.begin();
            let id = flight.id;
            self.lead(flight.leader);
            let outcome = flight.waiter.wait().await.unwrap_or(Err(Error::ShutDown));
            if id >= first_id {
                return outcome;
            }
        }
    }

    fn schedule_follow_up(&self) {
        let delay = self.inner.settings.follow_up_delay;
        let cancel = self.inner.cancel.clone();
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        tracing::debug!("Running follow-up refresh");
                        RefreshCoordinator { inner }.request_refresh();
                    }
                }
            }
        });

        if let Some(previous) = self.inner.follow_up.lock().replace(task) {
            previous.abort();
        }
    }
}

impl<C: Connector> std::fmt::Debug for RefreshCoordinator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("settings", &self.inner.settings)
            .field("status", &*self.inner.status.read())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Inner<C> {
    async fn run_fetch(&self) -> Result<DeviceState> {
        if self.cancel.is_cancelled() {
            return Err(Error::ShutDown);
        }
        self.status.write().begin();

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::ShutDown),
            result = self.link.fetch() => result,
        };

        match &outcome {
            Ok(state) => self.publish(state.clone()),
            Err(Error::ShutDown) => self.status.write().abandoned(),
            Err(err) => {
                tracing::warn!(error = %err, "Refresh failed, keeping last known state");
                self.status.write().failed(err.clone());
                self.events.publish(DeviceEvent::refresh_failed(err.clone()));
            }
        }
        outcome
    }

    fn publish(&self, state: DeviceState) {
        let changed = state.diff(&self.published.borrow());
        self.published.send_if_modified(|current| {
            if changed.is_empty() {
                false
            } else {
                current.clone_from(&state);
                true
            }
        });
        self.status.write().succeeded(Utc::now());
        tracing::trace!(changed = changed.len(), "Refresh complete");
        self.events.publish(DeviceEvent::refreshed(changed, state));
    }
}

impl<C: Connector> Drop for Inner<C> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop<C: Connector>(inner: Weak<Inner<C>>, cancel: CancellationToken, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                let coordinator = RefreshCoordinator { inner };
                if let Err(err) = coordinator.refresh().await {
                    tracing::debug!(error = %err, "Scheduled refresh failed");
                }
            }
        }
    }
    tracing::debug!("Baseline polling stopped");
}
