// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider (`models/{model}:generateContent` with inline audio).

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

// --- Wire types ---

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

// --- Provider ---

/// Gemini provider implementing [`ProviderAdapter`].
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    fn to_generate_request(request: &ProviderRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: request.instruction.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.audio.media_type.clone(),
                            data: STANDARD.encode(&request.audio.data),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                max_output_tokens: request.max_tokens,
                temperature: 0.2,
            },
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, OratorError> {
        let body = Self::to_generate_request(&request);
        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("HTTP request failed", e))?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "gemini response received");

        let text = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read response body", e))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {text}"),
            };
            return Err(OratorError::provider_status(status.as_u16(), message));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| OratorError::MalformedResponse {
                backend: format!("gemini:{}", request.model),
                message: format!("failed to parse API response: {e}"),
            })?;

        let answer: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if answer.trim().is_empty() {
            return Err(OratorError::MalformedResponse {
                backend: format!("gemini:{}", request.model),
                message: "response contained no text".into(),
            });
        }

        let usage = parsed
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            text: answer,
            model: request.model,
            usage,
        })
    }
}
