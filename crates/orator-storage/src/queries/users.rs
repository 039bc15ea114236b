// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use chrono::{DateTime, NaiveDate, Utc};
use orator_core::OratorError;
use orator_core::types::{User, UserId};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::conversion_err;

const DATE_FORMAT: &str = "%Y-%m-%d";

const USER_COLUMNS: &str = "id, username, chat_id, used_today, daily_limit, bonus_limit, \
     is_premium, premium_until, word_limit, voice, last_active, referral_count, \
     referred_by, created_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let premium_until: Option<String> = row.get(7)?;
    let premium_until = premium_until
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| conversion_err(7, e))
        })
        .transpose()?;
    let last_active: String = row.get(10)?;
    let last_active =
        NaiveDate::parse_from_str(&last_active, DATE_FORMAT).map_err(|e| conversion_err(10, e))?;
    let created_at: String = row.get(13)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_err(13, e))?;

    Ok(User {
        id: UserId(row.get(0)?),
        username: row.get(1)?,
        chat_id: row.get(2)?,
        used_today: row.get(3)?,
        daily_limit: row.get(4)?,
        bonus_limit: row.get(5)?,
        is_premium: row.get(6)?,
        premium_until,
        word_limit: row.get(8)?,
        voice: row.get(9)?,
        last_active,
        referral_count: row.get(11)?,
        referred_by: row.get::<_, Option<String>>(12)?.map(UserId),
        created_at,
    })
}

/// Get a user by id.
pub async fn get_user(db: &Database, id: &UserId) -> Result<Option<User>, OratorError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a user unless one with the same id exists. Returns whether a row was inserted.
pub async fn create_user(db: &Database, user: &User) -> Result<bool, OratorError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO users ({USER_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    user.id.0,
                    user.username,
                    user.chat_id,
                    user.used_today,
                    user.daily_limit,
                    user.bonus_limit,
                    user.is_premium,
                    user.premium_until.map(|d| d.to_rfc3339()),
                    user.word_limit,
                    user.voice,
                    user.last_active.format(DATE_FORMAT).to_string(),
                    user.referral_count,
                    user.referred_by.map(|r| r.0),
                    user.created_at.to_rfc3339(),
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the mutable fields of an existing user.
pub async fn save_user(db: &Database, user: &User) -> Result<(), OratorError> {
    let id = user.id.0.clone();
    let user = user.clone();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE users SET username = ?2, chat_id = ?3, used_today = ?4, \
                 daily_limit = ?5, bonus_limit = ?6, is_premium = ?7, premium_until = ?8, \
                 word_limit = ?9, voice = ?10, last_active = ?11, referral_count = ?12, \
                 referred_by = ?13 WHERE id = ?1",
                params![
                    user.id.0,
                    user.username,
                    user.chat_id,
                    user.used_today,
                    user.daily_limit,
                    user.bonus_limit,
                    user.is_premium,
                    user.premium_until.map(|d| d.to_rfc3339()),
                    user.word_limit,
                    user.voice,
                    user.last_active.format(DATE_FORMAT).to_string(),
                    user.referral_count,
                    user.referred_by.map(|r| r.0),
                ],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(OratorError::NotFound {
            entity: "user",
            id,
        });
    }
    Ok(())
}

/// All user ids with the chat used to reach them, oldest first.
pub async fn list_user_ids(db: &Database) -> Result<Vec<(UserId, String)>, OratorError> {
    db.connection()
        .call(|conn| -> Result<Vec<(UserId, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT id, chat_id FROM users ORDER BY created_at ASC")?;
            let rows = stmt.query_map([], |row| Ok((UserId(row.get(0)?), row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("users.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn sample_user(id: &str) -> User {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        User::new(UserId::from(id), format!("chat-{id}"), 3, 30, now)
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let (db, _dir) = setup_db().await;
        let mut user = sample_user("100");
        user.username = Some("ada".into());
        user.referred_by = Some(UserId::from("7"));

        assert!(create_user(&db, &user).await.unwrap());
        let loaded = get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(loaded, user);
    }

    #[tokio::test]
    async fn create_existing_user_leaves_row_untouched() {
        let (db, _dir) = setup_db().await;
        let mut user = sample_user("100");
        create_user(&db, &user).await.unwrap();

        user.bonus_limit = 9;
        assert!(!create_user(&db, &user).await.unwrap());
        let loaded = get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(loaded.bonus_limit, 0);
    }

    #[tokio::test]
    async fn save_updates_counters_and_premium() {
        let (db, _dir) = setup_db().await;
        let mut user = sample_user("100");
        create_user(&db, &user).await.unwrap();

        user.used_today = 2;
        user.is_premium = true;
        user.premium_until = Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());
        user.last_active = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        save_user(&db, &user).await.unwrap();

        let loaded = get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(loaded.used_today, 2);
        assert!(loaded.is_premium);
        assert_eq!(loaded.premium_until, user.premium_until);
        assert_eq!(loaded.last_active, user.last_active);
    }

    #[tokio::test]
    async fn save_missing_user_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = save_user(&db, &sample_user("ghost")).await.unwrap_err();
        assert!(matches!(err, OratorError::NotFound { entity: "user", .. }));
    }

    #[tokio::test]
    async fn get_missing_user_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user(&db, &UserId::from("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_user_ids_returns_chats() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &sample_user("1")).await.unwrap();
        create_user(&db, &sample_user("2")).await.unwrap();
        let ids = list_user_ids(&db).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&(UserId::from("2"), "chat-2".to_string())));
    }
}
