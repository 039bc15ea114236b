// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference provider for deterministic testing.
//!
//! Outcomes are queued per model and popped in order. When a model's queue
//! is empty the default outcome is used.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use orator_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use orator_core::{OratorError, PluginAdapter, ProviderAdapter};

/// What a single call returns.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// A well-formed assessment with this overall score.
    Score(u8),
    /// Raw reply text.
    Reply(String),
    /// An HTTP error with this status.
    Status(u16),
    /// A connection failure without status.
    Disconnect,
}

/// A valid assessment reply as a model would produce it.
pub fn assessment_json(score: u8, transcription: &str) -> String {
    serde_json::json!({
        "overall_score": score,
        "scores": {
            "accuracy": score,
            "fluency": score,
            "prosody": score,
            "completeness": score,
            "word_accuracy": score
        },
        "transcription": transcription,
        "level": "B1",
        "feedback": {
            "strengths": ["clear consonants"],
            "mispronounced": [{"word": "cat", "heard": "cut", "note": "open the vowel"}],
            "action_plan": ["practise minimal pairs"]
        }
    })
    .to_string()
}

/// Scripted provider shared by every candidate of a test pool.
pub struct MockBackend {
    scripts: Arc<Mutex<HashMap<String, VecDeque<MockOutcome>>>>,
    default: MockOutcome,
    calls: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockBackend {
    /// Every call succeeds with score 80.
    pub fn new() -> Self {
        Self::with_default(MockOutcome::Score(80))
    }

    pub fn with_default(default: MockOutcome) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            default,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues outcomes for `model`.
    pub async fn script(&self, model: &str, outcomes: Vec<MockOutcome>) {
        self.scripts
            .lock()
            .await
            .entry(model.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Total calls across all models.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Models called, in order.
    pub async fn called_models(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }

    /// The last request seen, if any.
    pub async fn last_request(&self) -> Option<ProviderRequest> {
        self.calls.lock().await.last().cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
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
impl ProviderAdapter for MockBackend {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, OratorError> {
        self.calls.lock().await.push(request.clone());
        let outcome = self
            .scripts
            .lock()
            .await
            .get_mut(&request.model)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.default.clone());

        let text = match outcome {
            MockOutcome::Score(score) => assessment_json(score, "the cat sat down"),
            MockOutcome::Reply(text) => text,
            MockOutcome::Status(status) => {
                return Err(OratorError::provider_status(
                    status,
                    format!("mock status {status}"),
                ));
            }
            MockOutcome::Disconnect => {
                return Err(OratorError::provider("connection refused"));
            }
        };
        Ok(ProviderResponse {
            text,
            model: request.model,
            usage: TokenUsage {
                input_tokens: 1_000,
                output_tokens: 200,
            },
        })
    }
}
