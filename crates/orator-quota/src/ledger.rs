// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily quota ledger.
//!
//! The ledger is the only component that decides whether a user may start an
//! assessment. Counters live on the [`User`] record; every read first applies
//! lazy premium expiry and the calendar-day rollover.
//!
//! Lookups fail open: if the user record cannot be read, the request is
//! allowed and a warning is logged. Commits never fail open.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use orator_config::model::QuotaConfig;
use orator_core::types::{User, UserId};
use orator_core::{OratorError, StorageAdapter};

/// Tier limits and referral reward rules, taken from `[quota]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub free_daily_limit: u32,
    pub premium_daily_limit: u32,
    pub free_word_limit: u32,
    pub premium_word_limit: u32,
    pub referral_threshold: u32,
    pub referral_reward: u32,
}

impl From<&QuotaConfig> for QuotaPolicy {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            free_daily_limit: config.free_daily_limit,
            premium_daily_limit: config.premium_daily_limit,
            free_word_limit: config.free_word_limit,
            premium_word_limit: config.premium_word_limit,
            referral_threshold: config.referral_threshold.max(1),
            referral_reward: config.referral_reward,
        }
    }
}

/// Resets the daily counter when `today` is later than `last_active`.
///
/// Returns whether the user changed. Calling it twice on one day is a no-op.
pub fn apply_rollover(user: &mut User, today: NaiveDate) -> bool {
    if user.last_active < today {
        user.used_today = 0;
        user.last_active = today;
        true
    } else {
        false
    }
}

/// Demotes a premium user whose `premium_until` has passed.
pub fn apply_expiry(user: &mut User, now: DateTime<Utc>, policy: &QuotaPolicy) -> bool {
    match user.premium_until {
        Some(until) if user.is_premium && until <= now => {
            user.is_premium = false;
            user.premium_until = None;
            user.daily_limit = policy.free_daily_limit;
            user.word_limit = policy.free_word_limit;
            true
        }
        _ => false,
    }
}

/// Whether one more assessment may start.
pub fn is_allowed(user: &User) -> bool {
    user.used_today < user.daily_limit || user.bonus_limit > 0
}

/// Consumes one unit: daily allowance first, then bonus.
pub fn apply_commit(user: &mut User) {
    if user.used_today < user.daily_limit {
        user.used_today += 1;
    } else {
        user.bonus_limit = user.bonus_limit.saturating_sub(1);
    }
}

/// Counts one completed referral. Returns the bonus granted by this referral.
pub fn apply_referral(user: &mut User, policy: &QuotaPolicy) -> u32 {
    user.referral_count += 1;
    if user.referral_count % policy.referral_threshold == 0 {
        user.bonus_limit += policy.referral_reward;
        policy.referral_reward
    } else {
        0
    }
}

/// Outcome of registering a platform user.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub user: User,
    /// `true` when the user was created by this call.
    pub created: bool,
    /// Referrer credited by this registration, if any.
    pub credited_referrer: Option<UserId>,
}

/// Persistent quota ledger with per-user serialization.
pub struct QuotaLedger {
    storage: Arc<dyn StorageAdapter>,
    policy: QuotaPolicy,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl QuotaLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>, policy: QuotaPolicy) -> Self {
        Self {
            storage,
            policy,
            locks: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    async fn lock_user(&self, user_id: &UserId) -> UserGuard<'_> {
        let lock = self.locks.entry(user_id.clone()).or_default().clone();
        UserGuard {
            locks: &self.locks,
            user_id: user_id.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Loads a user and applies expiry and rollover, persisting any change.
    async fn load_normalized(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, OratorError> {
        let Some(mut user) = self.storage.get_user(user_id).await? else {
            return Ok(None);
        };
        let demoted = apply_expiry(&mut user, now, &self.policy);
        if demoted {
            info!(user_id = %user_id, "premium expired, account demoted to free tier");
        }
        let rolled = apply_rollover(&mut user, now.date_naive());
        if demoted || rolled {
            self.storage.save_user(&user).await?;
        }
        Ok(Some(user))
    }

    /// Registers a user on first contact. Existing users only get their chat
    /// and handle refreshed; a referral is credited only on creation and never
    /// for self-referral.
    pub async fn register(
        &self,
        user_id: &UserId,
        chat_id: &str,
        username: Option<&str>,
        referrer: Option<&UserId>,
    ) -> Result<Registration, OratorError> {
        self.register_at(user_id, chat_id, username, referrer, Utc::now())
            .await
    }

    pub async fn register_at(
        &self,
        user_id: &UserId,
        chat_id: &str,
        username: Option<&str>,
        referrer: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<Registration, OratorError> {
        let guard = self.lock_user(user_id).await;

        if let Some(mut user) = self.load_normalized(user_id, now).await? {
            let username = username.map(str::to_string);
            if user.chat_id != chat_id || (username.is_some() && user.username != username) {
                user.chat_id = chat_id.to_string();
                if username.is_some() {
                    user.username = username;
                }
                self.storage.save_user(&user).await?;
            }
            return Ok(Registration {
                user,
                created: false,
                credited_referrer: None,
            });
        }

        let referrer = referrer.filter(|r| *r != user_id).cloned();
        let mut user = User::new(
            user_id.clone(),
            chat_id.to_string(),
            self.policy.free_daily_limit,
            self.policy.free_word_limit,
            now,
        );
        user.username = username.map(str::to_string);
        user.referred_by = referrer.clone();

        let created = self.storage.create_user(&user).await?;
        drop(guard);

        let mut credited_referrer = None;
        if created {
            info!(user_id = %user_id, "registered new user");
            if let Some(referrer) = referrer {
                match self.record_referral(&referrer).await {
                    Ok(_) => credited_referrer = Some(referrer),
                    Err(e) => warn!(referrer = %referrer, error = %e, "referral not credited"),
                }
            }
        }

        Ok(Registration {
            user,
            created,
            credited_referrer,
        })
    }

    /// Decides whether `user_id` may start an assessment now.
    ///
    /// Fails open: a missing record, storage error or timeout allows the
    /// request and logs a warning.
    pub async fn check_and_reserve(&self, user_id: &UserId) -> bool {
        self.check_and_reserve_at(user_id, Utc::now()).await
    }

    pub async fn check_and_reserve_at(&self, user_id: &UserId, now: DateTime<Utc>) -> bool {
        let _guard = self.lock_user(user_id).await;

        match self.load_normalized(user_id, now).await {
            Ok(Some(user)) => {
                let allowed = is_allowed(&user);
                debug!(
                    user_id = %user_id,
                    used_today = user.used_today,
                    daily_limit = user.daily_limit,
                    bonus_limit = user.bonus_limit,
                    allowed,
                    "quota check"
                );
                allowed
            }
            Ok(None) => {
                warn!(user_id = %user_id, "quota check: user record missing, failing open");
                true
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "quota check: lookup failed, failing open");
                true
            }
        }
    }

    /// Consumes one unit after a result has been persisted.
    pub async fn commit_usage(&self, user_id: &UserId) -> Result<(), OratorError> {
        self.commit_usage_at(user_id, Utc::now()).await
    }

    pub async fn commit_usage_at(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), OratorError> {
        self.update(user_id, now, |user| {
            apply_commit(user);
            debug!(
                user_id = %user.id,
                used_today = user.used_today,
                bonus_limit = user.bonus_limit,
                "usage committed"
            );
        })
        .await
        .map(|_| ())
    }

    /// Credits one completed referral to `referrer`. Returns the bonus granted.
    pub async fn record_referral(&self, referrer: &UserId) -> Result<u32, OratorError> {
        let policy = self.policy.clone();
        let mut granted = 0;
        self.update(referrer, Utc::now(), |user| {
            granted = apply_referral(user, &policy);
        })
        .await?;
        if granted > 0 {
            info!(referrer = %referrer, granted, "referral reward granted");
        }
        Ok(granted)
    }

    /// Normalized view of a user (expiry and rollover applied).
    pub async fn status(&self, user_id: &UserId) -> Result<Option<User>, OratorError> {
        let _guard = self.lock_user(user_id).await;
        self.load_normalized(user_id, Utc::now()).await
    }

    /// Grants or extends premium for `days` days from now (or from the
    /// current expiry, if later).
    pub async fn grant_premium(&self, user_id: &UserId, days: u32) -> Result<User, OratorError> {
        self.grant_premium_at(user_id, days, Utc::now()).await
    }

    pub async fn grant_premium_at(
        &self,
        user_id: &UserId,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<User, OratorError> {
        let policy = self.policy.clone();
        let user = self
            .update(user_id, now, |user| {
                let base = user.premium_until.filter(|u| *u > now).unwrap_or(now);
                user.is_premium = true;
                user.premium_until = Some(base + Duration::days(i64::from(days)));
                user.daily_limit = user.daily_limit.max(policy.premium_daily_limit);
                user.word_limit = user.word_limit.max(policy.premium_word_limit);
            })
            .await?;
        info!(user_id = %user_id, days, "premium granted");
        Ok(user)
    }

    /// Adds bonus units (administrative override).
    pub async fn add_bonus(&self, user_id: &UserId, amount: u32) -> Result<User, OratorError> {
        self.update(user_id, Utc::now(), |user| {
            user.bonus_limit = user.bonus_limit.saturating_add(amount);
        })
        .await
    }

    /// Stores the preferred reference voice.
    pub async fn set_voice(&self, user_id: &UserId, voice: &str) -> Result<User, OratorError> {
        self.update(user_id, Utc::now(), |user| {
            user.voice = voice.to_string();
        })
        .await
    }

    /// Locked read-normalize-modify-write on one user.
    async fn update<F>(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        mutate: F,
    ) -> Result<User, OratorError>
    where
        F: FnOnce(&mut User),
    {
        let _guard = self.lock_user(user_id).await;

        let mut user = self
            .load_normalized(user_id, now)
            .await?
            .ok_or_else(|| OratorError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })?;
        mutate(&mut user);
        self.storage.save_user(&user).await?;
        Ok(user)
    }
}

/// Holds one user's ledger lock. On release the map entry is dropped unless
/// another caller is holding or waiting for the same lock.
struct UserGuard<'a> {
    locks: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use orator_config::model::StorageConfig;
    use orator_storage::SqliteStorage;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn policy() -> QuotaPolicy {
        QuotaPolicy::from(&QuotaConfig::default())
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn user_on(day: u32) -> User {
        User::new(UserId::from("u"), "c".into(), 3, 30, at(day, 8))
    }

    async fn ledger() -> (QuotaLedger, Arc<SqliteStorage>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("quota.db").display().to_string(),
            wal_mode: true,
            timeout_secs: 15,
        }));
        storage.initialize().await.unwrap();
        let ledger = QuotaLedger::new(storage.clone(), policy());
        (ledger, storage, dir)
    }

    #[test]
    fn rollover_twice_in_one_day_is_noop() {
        let mut user = user_on(1);
        user.used_today = 3;
        let today = at(2, 9).date_naive();
        assert!(apply_rollover(&mut user, today));
        assert_eq!(user.used_today, 0);
        user.used_today = 1;
        assert!(!apply_rollover(&mut user, today));
        assert_eq!(user.used_today, 1);
    }

    #[test]
    fn exhausted_daily_without_bonus_is_denied() {
        let mut user = user_on(1);
        user.used_today = 3;
        assert!(!is_allowed(&user));
        user.bonus_limit = 1;
        assert!(is_allowed(&user));
    }

    #[test]
    fn commit_spends_daily_before_bonus() {
        let mut user = user_on(1);
        user.used_today = 2;
        user.bonus_limit = 1;
        apply_commit(&mut user);
        assert_eq!((user.used_today, user.bonus_limit), (3, 1));
        apply_commit(&mut user);
        assert_eq!((user.used_today, user.bonus_limit), (3, 0));
        apply_commit(&mut user);
        assert_eq!((user.used_today, user.bonus_limit), (3, 0));
    }

    #[test]
    fn expired_premium_is_demoted_to_free_limits() {
        let p = policy();
        let mut user = user_on(1);
        user.is_premium = true;
        user.daily_limit = p.premium_daily_limit;
        user.word_limit = p.premium_word_limit;
        user.premium_until = Some(at(5, 0));

        assert!(!apply_expiry(&mut user, at(4, 23), &p));
        assert!(user.is_premium);
        assert!(apply_expiry(&mut user, at(5, 0), &p));
        assert!(!user.is_premium);
        assert_eq!(user.premium_until, None);
        assert_eq!(user.daily_limit, p.free_daily_limit);
        assert_eq!(user.word_limit, p.free_word_limit);
    }

    proptest! {
        #[test]
        fn referral_bonus_is_three_per_three(n in 0u32..200) {
            let p = policy();
            let mut user = user_on(1);
            for _ in 0..n {
                apply_referral(&mut user, &p);
            }
            prop_assert_eq!(user.referral_count, n);
            prop_assert_eq!(user.bonus_limit, 3 * (n / 3));
        }

        #[test]
        fn commits_never_overrun_daily_or_underflow_bonus(
            daily in 0u32..10,
            bonus in 0u32..10,
            commits in 0usize..40,
        ) {
            let mut user = user_on(1);
            user.daily_limit = daily;
            user.bonus_limit = bonus;
            for _ in 0..commits {
                if is_allowed(&user) {
                    apply_commit(&mut user);
                }
                prop_assert!(user.used_today <= user.daily_limit);
            }
            let spent = (commits as u32).min(daily + bonus);
            prop_assert_eq!(user.used_today + (bonus - user.bonus_limit), spent);
        }
    }

    #[tokio::test]
    async fn denied_when_daily_used_and_no_bonus() {
        let (ledger, storage, _dir) = ledger().await;
        let id = UserId::from("u");
        ledger
            .register_at(&id, "c", None, None, at(1, 8))
            .await
            .unwrap();
        for _ in 0..3 {
            assert!(ledger.check_and_reserve_at(&id, at(1, 9)).await);
            ledger.commit_usage_at(&id, at(1, 9)).await.unwrap();
        }
        assert!(!ledger.check_and_reserve_at(&id, at(1, 10)).await);

        let user = storage.get_user(&id).await.unwrap().unwrap();
        assert_eq!(user.used_today, 3);

        // Next day the counter resets.
        assert!(ledger.check_and_reserve_at(&id, at(2, 0)).await);
        let user = storage.get_user(&id).await.unwrap().unwrap();
        assert_eq!(user.used_today, 0);
        assert_eq!(user.last_active, at(2, 0).date_naive());
    }

    #[tokio::test]
    async fn lookup_failure_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        // Never initialized: every storage call errors.
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("never.db").display().to_string(),
            wal_mode: true,
            timeout_secs: 15,
        }));
        let ledger = QuotaLedger::new(storage, policy());
        let id = UserId::from("u");
        assert!(ledger.check_and_reserve(&id).await);
        assert!(ledger.commit_usage(&id).await.is_err());
    }

    #[tokio::test]
    async fn missing_user_fails_open() {
        let (ledger, _storage, _dir) = ledger().await;
        assert!(ledger.check_and_reserve(&UserId::from("ghost")).await);
    }

    #[tokio::test]
    async fn referral_credited_once_and_rewarded_every_third() {
        let (ledger, storage, _dir) = ledger().await;
        let referrer = UserId::from("ref");
        ledger.register(&referrer, "r", None, None).await.unwrap();

        for i in 0..3 {
            let id = UserId(format!("friend-{i}"));
            let reg = ledger
                .register(&id, "c", None, Some(&referrer))
                .await
                .unwrap();
            assert!(reg.created);
            assert_eq!(reg.credited_referrer.as_ref(), Some(&referrer));
        }
        // Registering again does not count twice.
        let again = ledger
            .register(&UserId::from("friend-0"), "c", None, Some(&referrer))
            .await
            .unwrap();
        assert!(!again.created);
        assert!(again.credited_referrer.is_none());

        let r = storage.get_user(&referrer).await.unwrap().unwrap();
        assert_eq!(r.referral_count, 3);
        assert_eq!(r.bonus_limit, 3);
    }

    #[tokio::test]
    async fn self_referral_is_ignored() {
        let (ledger, storage, _dir) = ledger().await;
        let id = UserId::from("me");
        let reg = ledger.register(&id, "c", None, Some(&id)).await.unwrap();
        assert!(reg.credited_referrer.is_none());
        assert!(reg.user.referred_by.is_none());
        let user = storage.get_user(&id).await.unwrap().unwrap();
        assert_eq!(user.referral_count, 0);
    }

    #[tokio::test]
    async fn premium_grant_then_lazy_expiry() {
        let (ledger, storage, _dir) = ledger().await;
        let id = UserId::from("p");
        ledger
            .register_at(&id, "c", None, None, at(1, 8))
            .await
            .unwrap();
        let user = ledger.grant_premium_at(&id, 2, at(1, 9)).await.unwrap();
        assert!(user.is_premium);
        assert_eq!(user.daily_limit, 100);
        assert_eq!(user.premium_until, Some(at(3, 9)));

        // Still premium before expiry.
        assert!(ledger.check_and_reserve_at(&id, at(3, 8)).await);
        assert!(storage.get_user(&id).await.unwrap().unwrap().is_premium);

        // First read after expiry demotes.
        assert!(ledger.check_and_reserve_at(&id, at(3, 10)).await);
        let user = storage.get_user(&id).await.unwrap().unwrap();
        assert!(!user.is_premium);
        assert_eq!(user.daily_limit, 3);
    }

    #[tokio::test]
    async fn concurrent_commits_are_serialized() {
        let (ledger, storage, _dir) = ledger().await;
        let ledger = Arc::new(ledger);
        let id = UserId::from("busy");
        ledger.register(&id, "c", None, None).await.unwrap();
        ledger.add_bonus(&id, 20).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                ledger.commit_usage(&id).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let user = storage.get_user(&id).await.unwrap().unwrap();
        assert_eq!(user.used_today, 3);
        assert_eq!(user.bonus_limit, 13);
        assert_eq!(ledger.locks.len(), 0);
    }

    #[tokio::test]
    async fn user_locks_are_released_after_use() {
        let (ledger, _storage, _dir) = ledger().await;
        let referrer = UserId::from("ref");
        ledger.register(&referrer, "r", None, None).await.unwrap();
        for i in 0..5 {
            let id = UserId(format!("u{i}"));
            ledger.register(&id, "c", None, Some(&referrer)).await.unwrap();
            ledger.check_and_reserve(&id).await;
            ledger.commit_usage(&id).await.unwrap();
        }
        ledger.check_and_reserve(&UserId::from("ghost")).await;
        assert!(ledger.status(&referrer).await.unwrap().is_some());
        assert_eq!(ledger.locks.len(), 0);
    }
}
