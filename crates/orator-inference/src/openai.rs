// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider (`chat/completions` with an `input_audio` content part).

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use orator_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use orator_core::{OratorError, PluginAdapter, ProviderAdapter};

use crate::classify::transport_error;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    modalities: [&'static str; 1],
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    InputAudio { input_audio: InputAudio },
}

#[derive(Debug, Serialize)]
struct InputAudio {
    data: String,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    type_: String,
}

/// Maps a media type to an `input_audio.format` value.
///
/// The endpoint only takes WAV and MP3.
fn audio_format(media_type: &str) -> Option<&'static str> {
    match media_type.to_ascii_lowercase().as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        _ => None,
    }
}

/// OpenAI provider implementing [`ProviderAdapter`].
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: SecretString, base_url: String) -> Result<Self, OratorError> {
        let client = reqwest::Client::builder().build().map_err(|e| OratorError::Provider {
            message: format!("failed to build HTTP client: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, OratorError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OratorError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, OratorError> {
        // Refused locally, reported the way the API would report it.
        let format = audio_format(&request.audio.media_type).ok_or_else(|| {
            OratorError::provider_status(
                415,
                format!("unsupported media type {}", request.audio.media_type),
            )
        })?;

        let body = ChatRequest {
            model: request.model.clone(),
            modalities: ["text"],
            max_tokens: request.max_tokens,
            temperature: 0.2,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: request.instruction.clone(),
                    },
                    ContentPart::InputAudio {
                        input_audio: InputAudio {
                            data: STANDARD.encode(&request.audio.data),
                            format,
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("HTTP request failed", e))?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "openai response received");

        let text = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(OratorError::provider_status(status.as_u16(), message));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| OratorError::MalformedResponse {
                backend: format!("openai:{}", request.model),
                message: format!("failed to parse API response: {e}"),
            })?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if answer.trim().is_empty() {
            return Err(OratorError::MalformedResponse {
                backend: format!("openai:{}", request.model),
                message: "response contained no text".into(),
            });
        }

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            text: answer,
            model: request.model,
            usage,
        })
    }
}
