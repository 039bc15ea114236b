// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Orator bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide with
//! long polling, and [`Notifier`] for pushes outside of a reply (task
//! notifications, announcements).

pub mod handler;
pub mod media;
pub mod send;

use async_trait::async_trait;
use orator_config::model::TelegramConfig;
use orator_core::types::{
    AdapterType, HealthStatus, InboundEvent, MessageId, OutboundMessage, OutboundResponse,
};
use orator_core::{ChannelAdapter, Notifier, OratorError, PluginAdapter, UserId};
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Inbound events buffered between the poller and the serve loop.
const INBOUND_BUFFER: usize = 100;

/// Telegram channel adapter.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, OratorError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            OratorError::Config("telegram.bot_token is required to serve".into())
        })?;
        if token.trim().is_empty() {
            return Err(OratorError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);
        Ok(Self {
            bot: Bot::new(token),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// A notifier sharing this channel's bot.
    pub fn notifier(&self) -> TelegramNotifier {
        TelegramNotifier {
            bot: self.bot.clone(),
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, OratorError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), OratorError> {
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        debug!("Telegram channel shut down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), OratorError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                    let tx = message_tx.clone();
                    async move {
                        if !handler::is_private(&msg) {
                            debug!(chat_id = msg.chat.id.0, "ignoring non-private chat");
                            return respond(());
                        }
                        match handler::extract_payload(&bot, &msg).await {
                            Ok(Some(payload)) => {
                                if let Some(event) = handler::message_event(&msg, payload) {
                                    forward(&tx, event).await;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => error!(error = %e, "failed to extract message content"),
                        }
                        respond(())
                    }
                }))
                .branch(Update::filter_callback_query().endpoint(
                    move |bot: Bot, query: CallbackQuery| {
                        let tx = callback_tx.clone();
                        async move {
                            // Stops the client-side spinner; the reply comes as a message.
                            if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                                debug!(error = %e, "failed to answer callback query");
                            }
                            if let Some(event) = handler::callback_event(&query) {
                                forward(&tx, event).await;
                            }
                            respond(())
                        }
                    },
                ));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<Option<MessageId>, OratorError> {
        let chat_id = send::parse_chat_id(&msg.chat_id)?;
        send::deliver(&self.bot, chat_id, msg.response).await
    }

    async fn receive(&self) -> Result<InboundEvent, OratorError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| OratorError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

async fn forward(tx: &mpsc::Sender<InboundEvent>, event: InboundEvent) {
    if tx.send(event).await.is_err() {
        warn!("inbound channel closed, dropping event");
    }
}

/// Pushes messages to users by chat id.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(
        &self,
        user_id: &UserId,
        chat_id: &str,
        response: OutboundResponse,
    ) -> Result<(), OratorError> {
        let chat = send::parse_chat_id(chat_id)?;
        send::deliver(&self.bot, chat, response).await?;
        debug!(user_id = %user_id, "notification delivered");
        Ok(())
    }
}
