// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter and notifier for deterministic testing.
//!
//! `MockChannel` returns injected events from `receive()` and captures
//! everything passed to `send()`. Once closed and drained, `receive()` fails
//! with a "channel closed" error, which stops the serve loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use orator_core::types::{
    AdapterType, HealthStatus, InboundEvent, MessageId, OutboundMessage, OutboundResponse,
};
use orator_core::{ChannelAdapter, Notifier, OratorError, PluginAdapter, UserId};

pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Queues an event for the next `receive()`.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Makes `receive()` fail once the queue is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, OratorError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OratorError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), OratorError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, OratorError> {
        if matches!(msg.response, OutboundResponse::Silent) {
            return Ok(None);
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(Some(MessageId(id)))
    }

    async fn receive(&self) -> Result<InboundEvent, OratorError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(OratorError::Channel {
                    message: "mock channel closed".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }
}

/// One recorded push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub user_id: UserId,
    pub chat_id: String,
    pub response: OutboundResponse,
}

/// Notifier that records every push. Users listed in `unreachable` fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    unreachable: Mutex<Vec<UserId>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes pushes to `user_id` fail, as for a user who blocked the bot.
    pub async fn block(&self, user_id: UserId) {
        self.unreachable.lock().await.push(user_id);
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    /// Pushes delivered to `user_id`.
    pub async fn for_user(&self, user_id: &UserId) -> Vec<Notification> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        user_id: &UserId,
        chat_id: &str,
        response: OutboundResponse,
    ) -> Result<(), OratorError> {
        if self.unreachable.lock().await.contains(user_id) {
            return Err(OratorError::Channel {
                message: format!("user {user_id} blocked the bot"),
                source: None,
            });
        }
        self.sent.lock().await.push(Notification {
            user_id: user_id.clone(),
            chat_id: chat_id.to_string(),
            response,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orator_core::types::EventPayload;

    fn event(text: &str) -> InboundEvent {
        InboundEvent {
            id: "e1".into(),
            user_id: UserId::from("1"),
            chat_id: "1".into(),
            username: None,
            payload: EventPayload::Text(text.into()),
            timestamp: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn inject_then_receive_then_closed() {
        let channel = MockChannel::new();
        channel.inject(event("hi")).await;
        channel.close();

        let received = channel.receive().await.unwrap();
        assert_eq!(received.payload, EventPayload::Text("hi".into()));
        let err = channel.receive().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn silent_is_not_captured() {
        let channel = MockChannel::new();
        let id = channel
            .send(OutboundMessage {
                chat_id: "1".into(),
                response: OutboundResponse::Silent,
            })
            .await
            .unwrap();
        assert!(id.is_none());
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn blocked_user_fails() {
        let notifier = RecordingNotifier::new();
        notifier.block(UserId::from("2")).await;
        assert!(
            notifier
                .notify(&UserId::from("2"), "2", OutboundResponse::text("x"))
                .await
                .is_err()
        );
        notifier
            .notify(&UserId::from("3"), "3", OutboundResponse::text("y"))
            .await
            .unwrap();
        assert_eq!(notifier.notifications().await.len(), 1);
    }
}
