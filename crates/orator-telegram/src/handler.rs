// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update routing and conversion into channel-agnostic [`InboundEvent`]s.
//!
//! Only private chats are served. Text, voice notes, audio files and inline
//! button presses become events; everything else is dropped here.

use orator_core::types::{EventPayload, InboundEvent};
use orator_core::{OratorError, UserId};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::debug;

use crate::media;

/// Whether the message comes from a private (DM) chat.
pub fn is_private(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Extracts the event payload of a message, downloading recordings.
///
/// Returns `None` for unsupported message types (stickers, photos, ...).
pub async fn extract_payload(
    bot: &Bot,
    msg: &Message,
) -> Result<Option<EventPayload>, OratorError> {
    if let Some(text) = msg.text() {
        return Ok(Some(EventPayload::Text(text.to_string())));
    }
    if let Some(voice) = msg.voice() {
        let audio = media::voice_payload(bot, voice).await?;
        return Ok(Some(EventPayload::Audio(audio)));
    }
    if let Some(audio) = msg.audio() {
        let audio = media::audio_payload(bot, audio).await?;
        return Ok(Some(EventPayload::Audio(audio)));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(None)
}

/// Wraps a message payload into an event. Messages without a sender
/// (channel posts) yield `None`.
pub fn message_event(msg: &Message, payload: EventPayload) -> Option<InboundEvent> {
    let from = msg.from.as_ref()?;
    Some(InboundEvent {
        id: msg.id.0.to_string(),
        user_id: UserId(from.id.0.to_string()),
        chat_id: msg.chat.id.0.to_string(),
        username: from.username.clone(),
        payload,
        timestamp: msg.date.to_rfc3339(),
    })
}

/// Converts an inline button press into a `Button` event.
///
/// The chat is the one the button was shown in; for presses on messages too
/// old to be accessible it falls back to the sender's private chat.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.as_ref()?;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or_else(|| query.from.id.0 as i64);

    Some(InboundEvent {
        id: query.id.to_string(),
        user_id: UserId(query.from.id.0.to_string()),
        chat_id: chat_id.to_string(),
        username: query.from.username.clone(),
        payload: EventPayload::Button(data.clone()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let mut from = serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Test",
        });
        if let Some(username) = username {
            from["username"] = serde_json::json!(username);
        }
        serde_json::from_value(serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {"id": user_id as i64, "type": "private", "first_name": "Test"},
            "from": from,
            "text": text,
        }))
        .expect("failed to deserialize private message")
    }

    fn group_message(text: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": -100123i64, "type": "supergroup", "title": "Class"},
            "from": {"id": 5, "is_bot": false, "first_name": "Test"},
            "text": text,
        }))
        .expect("failed to deserialize group message")
    }

    fn callback(data: Option<&str>, with_message: bool) -> CallbackQuery {
        let mut json = serde_json::json!({
            "id": "cb-1",
            "from": {"id": 42, "is_bot": false, "first_name": "Test", "username": "ann"},
            "chat_instance": "ci",
        });
        if let Some(data) = data {
            json["data"] = serde_json::json!(data);
        }
        if with_message {
            json["message"] = serde_json::json!({
                "message_id": 3,
                "date": 1700000000i64,
                "chat": {"id": 4242i64, "type": "private", "first_name": "Test"},
                "text": "menu",
            });
        }
        serde_json::from_value(json).expect("failed to deserialize callback query")
    }

    #[test]
    fn private_chats_only() {
        assert!(is_private(&private_message(1, None, "hi")));
        assert!(!is_private(&group_message("hi")));
    }

    #[test]
    fn message_event_carries_ids_and_username() {
        let msg = private_message(42, Some("ann"), "/start");
        let event = message_event(&msg, EventPayload::Text("/start".into())).unwrap();
        assert_eq!(event.user_id, UserId::from("42"));
        assert_eq!(event.chat_id, "42");
        assert_eq!(event.username.as_deref(), Some("ann"));
        assert_eq!(event.id, "7");
        assert!(event.timestamp.starts_with("2023-11-14"));
    }

    #[test]
    fn button_press_uses_message_chat() {
        let event = callback_event(&callback(Some("menu:profile"), true)).unwrap();
        assert_eq!(event.payload, EventPayload::Button("menu:profile".into()));
        assert_eq!(event.chat_id, "4242");
        assert_eq!(event.user_id, UserId::from("42"));
    }

    #[test]
    fn button_press_without_message_falls_back_to_sender() {
        let event = callback_event(&callback(Some("voice:us"), false)).unwrap();
        assert_eq!(event.chat_id, "42");
    }

    #[test]
    fn button_press_without_data_is_dropped() {
        assert!(callback_event(&callback(None, true)).is_none());
    }
}
