// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery: text with inline keyboards, documents, and splitting of
//! long texts at paragraph boundaries.

use std::time::Duration;

use orator_core::OratorError;
use orator_core::types::{Button, MessageId, OutboundResponse};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile};
use tracing::warn;

/// Telegram's limit for a single text message.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Telegram's limit for a document caption.
pub const MAX_CAPTION_LEN: usize = 1024;

/// Delivers one response. Returns the id of the last message sent, or `None`
/// for `Silent`.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    response: OutboundResponse,
) -> Result<Option<MessageId>, OratorError> {
    match response {
        OutboundResponse::Silent => Ok(None),
        OutboundResponse::Text { text, buttons } => {
            let chunks = split_message(&text, MAX_MESSAGE_LEN);
            let last = chunks.len().saturating_sub(1);
            let mut sent_id = None;
            for (i, chunk) in chunks.into_iter().enumerate() {
                // Buttons go on the final chunk so they stay under the text they refer to.
                let markup = (i == last && !buttons.is_empty()).then(|| keyboard(&buttons));
                sent_id = Some(send_text(bot, chat_id, chunk, markup).await?);
            }
            Ok(sent_id)
        }
        OutboundResponse::TextWithAttachment { text, attachment } => {
            let caption = split_message(&text, MAX_CAPTION_LEN)
                .first()
                .map(|c| c.to_string())
                .unwrap_or_default();
            let file = InputFile::memory(attachment.data).file_name(attachment.filename);
            let sent = with_retry_after(|| {
                let mut request = bot.send_document(chat_id, file.clone());
                if !caption.is_empty() {
                    request = request.caption(caption.clone());
                }
                request.send()
            })
            .await
            .map_err(|e| send_error("failed to send document", e))?;
            Ok(Some(MessageId(sent.id.0.to_string())))
        }
    }
}

async fn send_text(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<MessageId, OratorError> {
    let sent = with_retry_after(|| {
        let mut request = bot.send_message(chat_id, text);
        if let Some(keyboard) = &keyboard {
            request = request.reply_markup(keyboard.clone());
        }
        request.send()
    })
    .await
    .map_err(|e| send_error("failed to send message", e))?;
    Ok(MessageId(sent.id.0.to_string()))
}

/// Retries once when Telegram asks to slow down (broadcasts hit this).
async fn with_retry_after<F, Fut, T>(mut call: F) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RequestError>>,
{
    match call().await {
        Err(RequestError::RetryAfter(after)) => {
            let wait = after.duration().min(Duration::from_secs(30));
            warn!(wait_secs = wait.as_secs(), "telegram flood control, retrying");
            tokio::time::sleep(wait).await;
            call().await
        }
        other => other,
    }
}

fn send_error(context: &str, e: RequestError) -> OratorError {
    OratorError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

pub fn keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.id.clone()))
            .collect::<Vec<_>>()
    }))
}

pub fn parse_chat_id(chat_id: &str) -> Result<ChatId, OratorError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| OratorError::Channel {
            message: format!("invalid chat_id {chat_id:?}: {e}"),
            source: None,
        })
}

/// Splits `text` into chunks of at most `max_len` bytes.
///
/// Priority: double newline > single newline > space > hard split on a char
/// boundary.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let (head, tail) = split_at_boundary(rest, max_len);
        if !head.is_empty() {
            chunks.push(head);
        }
        rest = tail;
    }
    if chunks.is_empty() {
        chunks.push(text);
    }
    chunks
}

fn split_at_boundary(text: &str, max_len: usize) -> (&str, &str) {
    if text.len() <= max_len {
        return (text, "");
    }

    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let region = &text[..end];

    if let Some(pos) = region.rfind("\n\n").filter(|&p| p > 0) {
        return (&text[..pos], text[pos + 2..].trim_start());
    }
    if let Some(pos) = region.rfind('\n').filter(|&p| p > 0) {
        return (&text[..pos], text[pos + 1..].trim_start());
    }
    if let Some(pos) = region.rfind(' ').filter(|&p| p > 0) {
        return (&text[..pos], &text[pos + 1..]);
    }
    if end == 0 {
        // max_len is smaller than the first character; emit it whole.
        end = text.chars().next().map_or(text.len(), char::len_utf8);
    }
    (&text[..end], &text[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("Short text", 100), vec!["Short text"]);
        assert_eq!(split_message("", 100), vec![""]);
    }

    #[test]
    fn splits_prefer_paragraphs() {
        let text = "Para 1.\n\nPara 2.\n\nPara 3 is very long and should cause a split.";
        let chunks = split_message(text, 20);
        assert_eq!(chunks[0], "Para 1.\n\nPara 2.");
        assert!(chunks.iter().all(|c| c.len() <= 20));
        assert_eq!(
            chunks.concat().replace(['\n', ' '], ""),
            text.replace(['\n', ' '], "")
        );
    }

    #[test]
    fn falls_back_to_newline_then_space() {
        assert_eq!(
            split_message("First line\nSecond line", 15),
            vec!["First line", "Second line"]
        );
        assert_eq!(
            split_message("OneLongWordThen another", 20),
            vec!["OneLongWordThen", "another"]
        );
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "«ééééé»";
        let chunks = split_message(text, 3);
        assert!(chunks.iter().all(|c| c.len() <= 3));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn keyboard_keeps_rows() {
        let rows = vec![
            vec![Button::new("A", "menu:a"), Button::new("B", "menu:b")],
            vec![Button::new("C", "menu:c")],
        ];
        let markup = keyboard(&rows);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "C");
    }

    #[test]
    fn chat_id_must_be_numeric() {
        assert_eq!(parse_chat_id("-100123").unwrap(), ChatId(-100123));
        assert!(parse_chat_id("telegram").is_err());
    }
}
