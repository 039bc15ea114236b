// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full stack (SQLite storage on a temp
//! directory, quota and usage ledgers, an inference pool over
//! [`MockBackend`], a [`RecordingNotifier`] and the orchestrator) and drives
//! it one event at a time.

use std::sync::Arc;
use std::time::Duration;

use orator_agent::{AgentSettings, Orchestrator};
use orator_config::model::{QuotaConfig, StorageConfig};
use orator_core::types::{AudioPayload, EventPayload, InboundEvent, OutboundResponse};
use orator_core::{OratorError, ProviderAdapter, StorageAdapter, UserId};
use orator_inference::{InferencePool, PoolSettings};
use orator_quota::{QuotaLedger, QuotaPolicy, UsageLedger};
use orator_storage::SqliteStorage;

use crate::mock_backend::MockBackend;
use crate::mock_channel::RecordingNotifier;
use crate::mock_storage::FaultyStorage;

/// Builder for test environments.
pub struct TestHarnessBuilder {
    models: Vec<String>,
    backend: MockBackend,
    quota: QuotaConfig,
    admin_ids: Vec<String>,
    pool_settings: PoolSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            models: vec!["primary".to_string(), "secondary".to_string()],
            backend: MockBackend::new(),
            quota: QuotaConfig::default(),
            admin_ids: Vec::new(),
            pool_settings: PoolSettings {
                backoff_base: Duration::from_millis(1),
                request_timeout: Duration::from_secs(5),
                ..PoolSettings::default()
            },
        }
    }

    /// Candidate models, most preferred first. All are served by the one backend.
    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_backend(mut self, backend: MockBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_quota(mut self, quota: QuotaConfig) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_admin(mut self, id: &str) -> Self {
        self.admin_ids.push(id.to_string());
        self
    }

    pub fn with_pool_settings(mut self, settings: PoolSettings) -> Self {
        self.pool_settings = settings;
        self
    }

    pub async fn build(self) -> Result<TestHarness, OratorError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| OratorError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
            timeout_secs: 15,
        }));
        storage.initialize().await?;
        let faults = Arc::new(FaultyStorage::new(storage.clone()));
        let dyn_storage: Arc<dyn StorageAdapter> = faults.clone();

        let ledger = Arc::new(QuotaLedger::new(
            dyn_storage.clone(),
            QuotaPolicy::from(&self.quota),
        ));
        let usage = Arc::new(UsageLedger::new(dyn_storage.clone()));

        let backend = Arc::new(self.backend);
        let candidates = self
            .models
            .iter()
            .map(|m| {
                let provider: Arc<dyn ProviderAdapter> = backend.clone();
                (format!("mock:{m}"), provider)
            })
            .collect();
        let pool = Arc::new(
            InferencePool::new(candidates, self.pool_settings).with_recorder(usage.clone()),
        );

        let notifier = Arc::new(RecordingNotifier::new());
        let settings = AgentSettings {
            admin_ids: self.admin_ids,
            max_audio_secs: self.quota.max_audio_secs,
            bot_username: Some("OratorTestBot".to_string()),
            history_limit: 10,
        };
        let orchestrator = Arc::new(Orchestrator::new(
            dyn_storage,
            ledger.clone(),
            pool.clone(),
            notifier.clone(),
            settings,
        ));

        Ok(TestHarness {
            backend,
            notifier,
            storage,
            faults,
            ledger,
            usage,
            pool,
            orchestrator,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment on a temporary database.
pub struct TestHarness {
    pub backend: Arc<MockBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<SqliteStorage>,
    /// The store the stack actually talks to; switches faults on `storage`.
    pub faults: Arc<FaultyStorage>,
    pub ledger: Arc<QuotaLedger>,
    pub usage: Arc<UsageLedger>,
    pub pool: Arc<InferencePool>,
    pub orchestrator: Arc<Orchestrator>,
    /// Kept alive so the database outlives the harness.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Builds an event from `user` (chat id equals user id).
    pub fn event(user: &str, payload: EventPayload) -> InboundEvent {
        InboundEvent {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: UserId::from(user),
            chat_id: user.to_string(),
            username: Some(format!("user{user}")),
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn audio(duration_secs: u32) -> EventPayload {
        EventPayload::Audio(AudioPayload {
            data: vec![0x4f; 256],
            duration_secs,
            media_type: "audio/ogg".to_string(),
        })
    }

    pub async fn send(&self, user: &str, payload: EventPayload) -> OutboundResponse {
        self.orchestrator.handle(&Self::event(user, payload)).await
    }

    pub async fn send_text(&self, user: &str, text: &str) -> OutboundResponse {
        self.send(user, EventPayload::Text(text.to_string())).await
    }

    pub async fn send_audio(&self, user: &str, duration_secs: u32) -> OutboundResponse {
        self.send(user, Self::audio(duration_secs)).await
    }

    pub async fn press(&self, user: &str, button_id: &str) -> OutboundResponse {
        self.send(user, EventPayload::Button(button_id.to_string()))
            .await
    }

    /// Body text of a response, empty for `Silent`.
    pub fn body(response: &OutboundResponse) -> String {
        response.body().unwrap_or_default().to_string()
    }
}
