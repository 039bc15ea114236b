// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::OratorError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AssessmentResult, ConversationState, Task, TaskStatus, UsageLogEntry, User, UserId,
};

/// Adapter for storage and persistence backends.
///
/// A record store, not a query engine: every method addresses records by
/// key, plus a handful of listing helpers for reports and broadcasts.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), OratorError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), OratorError>;

    // --- Users ---

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, OratorError>;

    /// Inserts a new user. Returns `false` if the id already existed (row untouched).
    async fn create_user(&self, user: &User) -> Result<bool, OratorError>;

    /// Overwrites every mutable field of an existing user.
    async fn save_user(&self, user: &User) -> Result<(), OratorError>;

    async fn list_user_ids(&self) -> Result<Vec<(UserId, String)>, OratorError>;

    // --- Conversation state ---

    async fn get_state(&self, user_id: &UserId) -> Result<Option<ConversationState>, OratorError>;

    async fn set_state(
        &self,
        user_id: &UserId,
        state: &ConversationState,
    ) -> Result<(), OratorError>;

    async fn clear_state(&self, user_id: &UserId) -> Result<(), OratorError>;

    // --- Assessment results ---

    async fn insert_result(&self, result: &AssessmentResult) -> Result<(), OratorError>;

    async fn get_result(&self, id: &str) -> Result<Option<AssessmentResult>, OratorError>;

    /// Most recent first.
    async fn list_results(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentResult>, OratorError>;

    // --- Usage log ---

    async fn append_usage(&self, entry: &UsageLogEntry) -> Result<(), OratorError>;

    /// Entries whose `created_at` falls on the given `YYYY-MM-DD` date.
    async fn usage_for_date(&self, date: &str) -> Result<Vec<UsageLogEntry>, OratorError>;

    // --- Tasks ---

    async fn create_task(&self, task: &Task) -> Result<(), OratorError>;

    async fn get_task(&self, id: &str) -> Result<Option<Task>, OratorError>;

    async fn update_task_status(
        &self,
        id: &str,
        status: TaskStatus,
        result_id: Option<&str>,
    ) -> Result<(), OratorError>;

    /// Tasks where the user is assignee or requester, newest first.
    async fn list_tasks_for(&self, user_id: &UserId) -> Result<Vec<Task>, OratorError>;
}
