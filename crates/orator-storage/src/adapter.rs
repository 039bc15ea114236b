// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use orator_config::model::StorageConfig;
use orator_core::types::{
    AssessmentResult, ConversationState, Task, TaskStatus, UsageLogEntry, User, UserId,
};
use orator_core::{AdapterType, HealthStatus, OratorError, PluginAdapter, StorageAdapter};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened by
/// [`StorageAdapter::initialize`]; every call is bounded by
/// `storage.timeout_secs`.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](StorageAdapter::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, OratorError> {
        self.db.get().ok_or_else(|| OratorError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Runs a storage future under the configured timeout.
    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, OratorError>>,
    ) -> Result<T, OratorError> {
        let duration = Duration::from_secs(self.config.timeout_secs);
        tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| OratorError::Timeout { duration })?
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), OratorError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OratorError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OratorError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), OratorError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| OratorError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), OratorError> {
        let db = self.db()?;
        self.checkpoint(db).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Users ---

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, OratorError> {
        self.timed(queries::users::get_user(self.db()?, id)).await
    }

    async fn create_user(&self, user: &User) -> Result<bool, OratorError> {
        self.timed(queries::users::create_user(self.db()?, user)).await
    }

    async fn save_user(&self, user: &User) -> Result<(), OratorError> {
        self.timed(queries::users::save_user(self.db()?, user)).await
    }

    async fn list_user_ids(&self) -> Result<Vec<(UserId, String)>, OratorError> {
        self.timed(queries::users::list_user_ids(self.db()?)).await
    }

    // --- Conversation state ---

    async fn get_state(&self, user_id: &UserId) -> Result<Option<ConversationState>, OratorError> {
        self.timed(queries::states::get_state(self.db()?, user_id))
            .await
    }

    async fn set_state(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), OratorError> {
        self.timed(queries::states::set_state(self.db()?, user_id, state))
            .await
    }

    async fn clear_state(&self, user_id: &UserId) -> Result<(), OratorError> {
        self.timed(queries::states::clear_state(self.db()?, user_id))
            .await
    }

    // --- Assessment results ---

    async fn insert_result(&self, result: &AssessmentResult) -> Result<(), OratorError> {
        self.timed(queries::results::insert_result(self.db()?, result))
            .await
    }

    async fn get_result(&self, id: &str) -> Result<Option<AssessmentResult>, OratorError> {
        self.timed(queries::results::get_result(self.db()?, id)).await
    }

    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentResult>, OratorError> {
        self.timed(queries::results::list_results(self.db()?, user_id, limit))
            .await
    }

    // --- Usage log ---

    async fn append_usage(&self, entry: &UsageLogEntry) -> Result<(), OratorError> {
        self.timed(queries::usage::append_usage(self.db()?, entry))
            .await
    }

    async fn usage_for_date(&self, date: &str) -> Result<Vec<UsageLogEntry>, OratorError> {
        self.timed(queries::usage::usage_for_date(self.db()?, date))
            .await
    }

    // --- Tasks ---

    async fn create_task(&self, task: &Task) -> Result<(), OratorError> {
        self.timed(queries::tasks::create_task(self.db()?, task)).await
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>, OratorError> {
        self.timed(queries::tasks::get_task(self.db()?, id)).await
    }

    async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        result_id: Option<&str>,
    ) -> Result<(), OratorError> {
        self.timed(queries::tasks::update_task_status(
            self.db()?,
            id,
            status,
            result_id,
        ))
        .await
    }

    async fn list_tasks_for(&self, user_id: &UserId) -> Result<Vec<Task>, OratorError> {
        self.timed(queries::tasks::list_tasks_for(self.db()?, user_id))
            .await
    }
}
