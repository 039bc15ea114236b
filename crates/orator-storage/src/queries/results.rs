// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assessment result persistence. Results are immutable once inserted.

use orator_core::OratorError;
use orator_core::types::{AssessmentResult, SubScores, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{conversion_err, parse_column};

const RESULT_COLUMNS: &str = "id, user_id, kind, target_text, task_id, backend_id, \
     overall_score, accuracy, fluency, prosody, completeness, word_accuracy, \
     transcription, level, feedback_json, created_at";

fn result_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssessmentResult> {
    let feedback_json: String = row.get(14)?;
    let feedback = serde_json::from_str(&feedback_json).map_err(|e| conversion_err(14, e))?;
    Ok(AssessmentResult {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        kind: parse_column(row, 2)?,
        target_text: row.get(3)?,
        task_id: row.get(4)?,
        backend_id: row.get(5)?,
        overall_score: row.get(6)?,
        scores: SubScores {
            accuracy: row.get(7)?,
            fluency: row.get(8)?,
            prosody: row.get(9)?,
            completeness: row.get(10)?,
            word_accuracy: row.get(11)?,
        },
        transcription: row.get(12)?,
        level: row.get(13)?,
        feedback,
        created_at: row.get(15)?,
    })
}

pub async fn insert_result(db: &Database, result: &AssessmentResult) -> Result<(), OratorError> {
    let result = result.clone();
    let feedback_json = serde_json::to_string(&result.feedback).map_err(|e| {
        OratorError::Storage {
            source: Box::new(e),
        }
    })?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO assessment_results ({RESULT_COLUMNS}) VALUES \
                     (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                params![
                    result.id,
                    result.user_id.0,
                    result.kind.to_string(),
                    result.target_text,
                    result.task_id,
                    result.backend_id,
                    result.overall_score,
                    result.scores.accuracy,
                    result.scores.fluency,
                    result.scores.prosody,
                    result.scores.completeness,
                    result.scores.word_accuracy,
                    result.transcription,
                    result.level,
                    feedback_json,
                    result.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_result(db: &Database, id: &str) -> Result<Option<AssessmentResult>, OratorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<AssessmentResult>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {RESULT_COLUMNS} FROM assessment_results WHERE id = ?1"),
                params![id],
                result_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// A user's most recent results, newest first.
pub async fn list_results(
    db: &Database,
    user_id: &UserId,
    limit: u32,
) -> Result<Vec<AssessmentResult>, OratorError> {
    let user_id = user_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<AssessmentResult>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESULT_COLUMNS} FROM assessment_results \
                 WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![user_id, limit], result_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
