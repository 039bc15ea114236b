// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat transports (Telegram, ...).

use async_trait::async_trait;

use crate::error::OratorError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage, OutboundResponse, UserId};

/// Bidirectional chat transport.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), OratorError>;

    /// Sends a response to a chat. `Silent` responses are not delivered.
    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, OratorError>;

    /// Receives the next inbound event.
    async fn receive(&self) -> Result<InboundEvent, OratorError>;
}

/// Pushes a message to a user outside of a reply (task notifications, announcements).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `response` to the chat registered for `user_id`'s `chat_id`.
    async fn notify(
        &self,
        user_id: &UserId,
        chat_id: &str,
        response: OutboundResponse,
    ) -> Result<(), OratorError>;
}
