// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger: prices and persists one row per completed inference call,
//! and aggregates rows for the `orator usage` report.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use orator_core::types::{TokenUsage, UsageLogEntry};
use orator_core::{OratorError, StorageAdapter, UsageRecorder};

use crate::pricing::{calculate_cost, get_pricing};

/// Totals for one backend (or for a whole day).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    pub calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

impl UsageTotals {
    fn add(&mut self, entry: &UsageLogEntry) {
        self.calls += 1;
        self.input_tokens += u64::from(entry.input_tokens);
        self.output_tokens += u64::from(entry.output_tokens);
        self.cost_usd += entry.cost_usd;
    }
}

/// One day of usage, overall and per backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyUsage {
    pub date: String,
    pub total: UsageTotals,
    pub by_backend: BTreeMap<String, UsageTotals>,
}

/// Usage ledger backed by the storage adapter.
pub struct UsageLedger {
    storage: Arc<dyn StorageAdapter>,
}

impl UsageLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Sums all usage rows for `date` (`YYYY-MM-DD`).
    pub async fn daily_summary(&self, date: &str) -> Result<DailyUsage, OratorError> {
        let entries = self.storage.usage_for_date(date).await?;
        let mut summary = DailyUsage {
            date: date.to_string(),
            ..Default::default()
        };
        for entry in &entries {
            summary.total.add(entry);
            summary
                .by_backend
                .entry(entry.backend_id.clone())
                .or_default()
                .add(entry);
        }
        Ok(summary)
    }
}

#[async_trait]
impl UsageRecorder for UsageLedger {
    /// Fills in the estimated cost from the pricing table, then appends the row.
    async fn record_usage(&self, mut entry: UsageLogEntry) -> Result<(), OratorError> {
        let usage = TokenUsage {
            input_tokens: entry.input_tokens,
            output_tokens: entry.output_tokens,
        };
        entry.cost_usd = calculate_cost(&usage, &get_pricing(&entry.backend_id));
        self.storage.append_usage(&entry).await?;
        info!(
            backend = %entry.backend_id,
            user_id = %entry.user_id,
            input_tokens = entry.input_tokens,
            output_tokens = entry.output_tokens,
            cost_usd = entry.cost_usd,
            "usage recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orator_config::model::StorageConfig;
    use orator_core::types::{AssessmentKind, UserId};
    use orator_storage::SqliteStorage;

    fn entry(id: &str, backend: &str, input: u32, output: u32) -> UsageLogEntry {
        UsageLogEntry {
            id: id.to_string(),
            user_id: UserId::from("u"),
            backend_id: backend.to_string(),
            purpose: AssessmentKind::Test,
            input_tokens: input,
            output_tokens: output,
            cost_usd: 0.0,
            created_at: "2026-06-10T12:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn recorded_rows_are_priced_and_summed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("usage.db").display().to_string(),
            wal_mode: true,
            timeout_secs: 15,
        }));
        storage.initialize().await.unwrap();
        let ledger = UsageLedger::new(storage.clone());

        ledger
            .record_usage(entry("a", "gemini:gemini-2.0-flash", 1_000_000, 0))
            .await
            .unwrap();
        ledger
            .record_usage(entry("b", "gemini:gemini-2.0-flash", 0, 1_000_000))
            .await
            .unwrap();
        ledger
            .record_usage(entry("c", "openai:gpt-4o-audio-preview", 1000, 100))
            .await
            .unwrap();

        let summary = ledger.daily_summary("2026-06-10").await.unwrap();
        assert_eq!(summary.total.calls, 3);
        assert_eq!(summary.by_backend.len(), 2);
        let gemini = &summary.by_backend["gemini:gemini-2.0-flash"];
        assert_eq!(gemini.calls, 2);
        assert!((gemini.cost_usd - 1.10).abs() < 1e-9);

        let empty = ledger.daily_summary("2026-06-11").await.unwrap();
        assert_eq!(empty.total, UsageTotals::default());
    }
}
