// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assigned practice tasks.

use orator_core::OratorError;
use orator_core::types::{Task, TaskStatus, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::parse_column;

const TASK_COLUMNS: &str =
    "id, requester_id, assignee_id, target_text, status, result_id, created_at";

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        requester_id: UserId(row.get(1)?),
        assignee_id: UserId(row.get(2)?),
        target_text: row.get(3)?,
        status: parse_column(row, 4)?,
        result_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub async fn create_task(db: &Database, task: &Task) -> Result<(), OratorError> {
    let task = task.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    task.id,
                    task.requester_id.0,
                    task.assignee_id.0,
                    task.target_text,
                    task.status.to_string(),
                    task.result_id,
                    task.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_task(db: &Database, id: &str) -> Result<Option<Task>, OratorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Task>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                task_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Sets the status, and the linked result when one is given.
pub async fn update_task_status(
    db: &Database,
    id: &str,
    status: TaskStatus,
    result_id: Option<&str>,
) -> Result<(), OratorError> {
    let task_id = id.to_string();
    let result_id = result_id.map(str::to_string);
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE tasks SET status = ?2, result_id = COALESCE(?3, result_id) WHERE id = ?1",
                params![task_id, status.to_string(), result_id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(OratorError::NotFound {
            entity: "task",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Tasks the user assigned or was assigned, newest first.
pub async fn list_tasks_for(db: &Database, user_id: &UserId) -> Result<Vec<Task>, OratorError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<Task>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks \
                 WHERE assignee_id = ?1 OR requester_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![user_id], task_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
