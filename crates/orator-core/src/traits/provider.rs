// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for audio-capable inference backends (Gemini, OpenAI, ...).

use async_trait::async_trait;

use crate::error::OratorError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for one inference provider.
///
/// A provider may serve several models; the model is chosen per request.
/// Failures must be reported as [`OratorError::Provider`] with the HTTP
/// status when one was received, so the pool can classify them.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends audio plus instruction text and returns the model's full text answer.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, OratorError>;
}
