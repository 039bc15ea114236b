// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serve loop, orchestrator and response formatting for the Orator bot.
//!
//! The [`AgentLoop`] receives events from a channel adapter and runs each
//! one on a per-user queue. Events of one user are handled one at a time in
//! arrival order; different users run concurrently. A user's queue worker is
//! a tracked task that retires, and drops its map entry, once the queue is
//! empty.

pub mod format;
pub mod messages;
pub mod orchestrator;
pub mod report;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use orator_core::types::{InboundEvent, OutboundMessage, OutboundResponse};
use orator_core::{ChannelAdapter, OratorError, UserId};

pub use orchestrator::{AgentSettings, Orchestrator};

/// Default time the loop waits for in-flight events on shutdown.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(90);

/// Receives events and dispatches them to the orchestrator.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    orchestrator: Arc<Orchestrator>,
    queues: Arc<DashMap<UserId, mpsc::UnboundedSender<InboundEvent>>>,
    tracker: TaskTracker,
    drain_timeout: Duration,
}

impl AgentLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            channel,
            orchestrator,
            queues: Arc::new(DashMap::new()),
            tracker: TaskTracker::new(),
            drain_timeout: DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Runs until `cancel` fires or the channel closes, then drains in-flight
    /// events and closes storage.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), OratorError> {
        info!(channel = self.channel.name(), "serve loop running");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping serve loop");
                    break;
                }
                event = self.channel.receive() => match event {
                    Ok(event) => self.dispatch(event),
                    Err(e) => {
                        if is_closed(&e) {
                            info!("channel closed, stopping serve loop");
                            break;
                        }
                        error!(error = %e, "channel receive error");
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    }
                },
            }
        }

        shutdown::drain(&self.tracker, self.drain_timeout).await;
        self.orchestrator.storage().close().await?;
        info!("serve loop stopped");
        Ok(())
    }

    /// Users with queued or in-flight events.
    pub fn active_users(&self) -> usize {
        self.queues.len()
    }

    fn dispatch(&self, event: InboundEvent) {
        debug!(user_id = %event.user_id, event_id = %event.id, "event dispatched");
        match self.queues.entry(event.user_id.clone()) {
            Entry::Occupied(entry) => {
                // The worker only retires under the shard lock held here, so
                // the receiver is still alive.
                if entry.get().send(event).is_err() {
                    warn!("user queue closed, dropping event");
                }
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = mpsc::unbounded_channel();
                if tx.send(event).is_err() {
                    return;
                }
                let user_id = entry.key().clone();
                entry.insert(tx);
                self.spawn_worker(user_id, rx);
            }
        }
    }

    fn spawn_worker(&self, user_id: UserId, mut rx: mpsc::UnboundedReceiver<InboundEvent>) {
        let channel = Arc::clone(&self.channel);
        let orchestrator = Arc::clone(&self.orchestrator);
        let queues = Arc::clone(&self.queues);

        self.tracker.spawn(async move {
            loop {
                while let Ok(event) = rx.try_recv() {
                    handle_event(channel.as_ref(), &orchestrator, event).await;
                }
                // Retire only if nothing was queued since the last drain.
                if queues.remove_if(&user_id, |_, _| rx.is_empty()).is_some() {
                    break;
                }
            }
            debug!(user_id = %user_id, "user queue drained");
        });
    }
}

async fn handle_event(
    channel: &dyn ChannelAdapter,
    orchestrator: &Orchestrator,
    event: InboundEvent,
) {
    let response = orchestrator.handle(&event).await;
    if matches!(response, OutboundResponse::Silent) {
        return;
    }
    let message = OutboundMessage {
        chat_id: event.chat_id.clone(),
        response,
    };
    if let Err(e) = channel.send(message).await {
        warn!(user_id = %event.user_id, error = %e, "failed to send response");
    }
}

fn is_closed(error: &OratorError) -> bool {
    matches!(error, OratorError::Channel { message, .. } if message.contains("closed"))
}
