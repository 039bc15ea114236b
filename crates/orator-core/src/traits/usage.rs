// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sink for per-call usage telemetry.

use async_trait::async_trait;

use crate::error::OratorError;
use crate::types::UsageLogEntry;

/// Receives one entry per completed inference call.
///
/// Callers treat failures as non-fatal: they log and move on.
#[async_trait]
pub trait UsageRecorder: Send + Sync {
    async fn record_usage(&self, entry: UsageLogEntry) -> Result<(), OratorError>;
}
