// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording downloads.
//!
//! Voice notes and audio files are fetched from Telegram's file servers and
//! turned into an [`AudioPayload`] carrying the duration Telegram declared.

use orator_core::OratorError;
use orator_core::types::AudioPayload;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Audio, FileMeta, Voice};
use tracing::debug;

/// Telegram voice notes are OGG/Opus.
pub const VOICE_MEDIA_TYPE: &str = "audio/ogg";

pub async fn download_file(bot: &Bot, file_meta: &FileMeta) -> Result<Vec<u8>, OratorError> {
    let file = bot
        .get_file(file_meta.id.clone())
        .await
        .map_err(|e| OratorError::Channel {
            message: format!("failed to get file info: {e}"),
            source: Some(Box::new(e)),
        })?;

    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| OratorError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(file_id = %file_meta.id, size = buf.len(), "downloaded recording");
    Ok(buf)
}

pub async fn voice_payload(bot: &Bot, voice: &Voice) -> Result<AudioPayload, OratorError> {
    let data = download_file(bot, &voice.file).await?;
    Ok(AudioPayload {
        data,
        duration_secs: voice.duration.seconds(),
        media_type: media_type(
            voice.mime_type.as_ref().map(|m| m.essence_str()),
            VOICE_MEDIA_TYPE,
        ),
    })
}

/// Audio files sent as music rather than recorded in the app.
pub async fn audio_payload(bot: &Bot, audio: &Audio) -> Result<AudioPayload, OratorError> {
    let data = download_file(bot, &audio.file).await?;
    Ok(AudioPayload {
        data,
        duration_secs: audio.duration.seconds(),
        media_type: media_type(
            audio.mime_type.as_ref().map(|m| m.essence_str()),
            "audio/mpeg",
        ),
    })
}

fn media_type(declared: Option<&str>, fallback: &str) -> String {
    declared.unwrap_or(fallback).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_media_type_wins() {
        assert_eq!(media_type(Some("Audio/MPEG"), VOICE_MEDIA_TYPE), "audio/mpeg");
    }

    #[test]
    fn missing_media_type_falls_back() {
        assert_eq!(media_type(None, VOICE_MEDIA_TYPE), "audio/ogg");
    }
}
