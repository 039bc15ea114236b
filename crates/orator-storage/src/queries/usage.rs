// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only usage log.

use orator_core::OratorError;
use orator_core::types::{UsageLogEntry, UserId};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::queries::parse_column;

pub async fn append_usage(db: &Database, entry: &UsageLogEntry) -> Result<(), OratorError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO usage_log (id, user_id, backend_id, purpose, input_tokens, \
                 output_tokens, cost_usd, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    entry.id,
                    entry.user_id.0,
                    entry.backend_id,
                    entry.purpose.to_string(),
                    entry.input_tokens,
                    entry.output_tokens,
                    entry.cost_usd,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Entries created on `date` (`YYYY-MM-DD`), oldest first.
pub async fn usage_for_date(db: &Database, date: &str) -> Result<Vec<UsageLogEntry>, OratorError> {
    let pattern = format!("{date}%");
    db.connection()
        .call(move |conn| -> Result<Vec<UsageLogEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, backend_id, purpose, input_tokens, output_tokens, \
                 cost_usd, created_at FROM usage_log WHERE created_at LIKE ?1 \
                 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![pattern], |row| {
                Ok(UsageLogEntry {
                    id: row.get(0)?,
                    user_id: UserId(row.get(1)?),
                    backend_id: row.get(2)?,
                    purpose: parse_column(row, 3)?,
                    input_tokens: row.get(4)?,
                    output_tokens: row.get(5)?,
                    cost_usd: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
