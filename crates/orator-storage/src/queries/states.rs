// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state.
//!
//! One row per user at most; the state is stored as tagged JSON.

use orator_core::OratorError;
use orator_core::types::{ConversationState, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::conversion_err;

pub async fn get_state(
    db: &Database,
    user_id: &UserId,
) -> Result<Option<ConversationState>, OratorError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<ConversationState>, rusqlite::Error> {
            conn.query_row(
                "SELECT state_json FROM conversation_states WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let json: String = row.get(0)?;
                    serde_json::from_str(&json).map_err(|e| conversion_err(0, e))
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the user's state.
pub async fn set_state(
    db: &Database,
    user_id: &UserId,
    state: &ConversationState,
) -> Result<(), OratorError> {
    let user_id = user_id.0.clone();
    let json = serde_json::to_string(state).map_err(|e| OratorError::Storage {
        source: Box::new(e),
    })?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversation_states (user_id, state_json, updated_at) \
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')) \
                 ON CONFLICT(user_id) DO UPDATE SET state_json = excluded.state_json, \
                 updated_at = excluded.updated_at",
                params![user_id, json],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove the user's state. Clearing an absent state is a no-op.
pub async fn clear_state(db: &Database, user_id: &UserId) -> Result<(), OratorError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_states WHERE user_id = ?1",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
