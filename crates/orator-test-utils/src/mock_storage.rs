// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage wrapper with switchable write faults.
//!
//! Every call is forwarded to the wrapped SQLite store unless the matching
//! fault is switched on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use orator_core::types::{
    AdapterType, AssessmentResult, ConversationState, HealthStatus, Task, TaskStatus,
    UsageLogEntry, User, UserId,
};
use orator_core::{OratorError, PluginAdapter, StorageAdapter};
use orator_storage::SqliteStorage;

pub struct FaultyStorage {
    inner: Arc<SqliteStorage>,
    fail_result_writes: AtomicBool,
}

impl FaultyStorage {
    pub fn new(inner: Arc<SqliteStorage>) -> Self {
        Self {
            inner,
            fail_result_writes: AtomicBool::new(false),
        }
    }

    /// Makes `insert_result` fail until switched off again.
    pub fn fail_result_writes(&self, fail: bool) {
        self.fail_result_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for FaultyStorage {
    fn name(&self) -> &str {
        "faulty-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OratorError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), OratorError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl StorageAdapter for FaultyStorage {
    async fn initialize(&self) -> Result<(), OratorError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), OratorError> {
        self.inner.close().await
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, OratorError> {
        self.inner.get_user(id).await
    }

    async fn create_user(&self, user: &User) -> Result<bool, OratorError> {
        self.inner.create_user(user).await
    }

    async fn save_user(&self, user: &User) -> Result<(), OratorError> {
        self.inner.save_user(user).await
    }

    async fn list_user_ids(&self) -> Result<Vec<(UserId, String)>, OratorError> {
        self.inner.list_user_ids().await
    }

    async fn get_state(&self, user_id: &UserId) -> Result<Option<ConversationState>, OratorError> {
        self.inner.get_state(user_id).await
    }

    async fn set_state(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), OratorError> {
        self.inner.set_state(user_id, state).await
    }

    async fn clear_state(&self, user_id: &UserId) -> Result<(), OratorError> {
        self.inner.clear_state(user_id).await
    }

    async fn insert_result(&self, result: &AssessmentResult) -> Result<(), OratorError> {
        if self.fail_result_writes.load(Ordering::SeqCst) {
            return Err(OratorError::Storage {
                source: "database is locked".into(),
            });
        }
        self.inner.insert_result(result).await
    }

    async fn get_result(&self, id: &str) -> Result<Option<AssessmentResult>, OratorError> {
        self.inner.get_result(id).await
    }

    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentResult>, OratorError> {
        self.inner.list_results(user_id, limit).await
    }

    async fn append_usage(&self, entry: &UsageLogEntry) -> Result<(), OratorError> {
        self.inner.append_usage(entry).await
    }

    async fn usage_for_date(&self, date: &str) -> Result<Vec<UsageLogEntry>, OratorError> {
        self.inner.usage_for_date(date).await
    }

    async fn create_task(&self, task: &Task) -> Result<(), OratorError> {
        self.inner.create_task(task).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, OratorError> {
        self.inner.get_task(id).await
    }

    async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        result_id: Option<&str>,
    ) -> Result<(), OratorError> {
        self.inner.update_task_status(id, status, result_id).await
    }

    async fn list_tasks_for(&self, user_id: &UserId) -> Result<Vec<Task>, OratorError> {
        self.inner.list_tasks_for(user_id).await
    }
}
