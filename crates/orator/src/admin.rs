// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `orator user ...` and `orator usage` administration commands.
//!
//! These open the configured database directly; they are safe to run next to
//! a serving bot because SQLite serializes the writes.

use std::fmt::Write;
use std::sync::Arc;

use orator_config::model::OratorConfig;
use orator_core::types::User;
use orator_core::{OratorError, StorageAdapter, UserId};
use orator_quota::{DailyUsage, QuotaLedger, QuotaPolicy, UsageLedger};
use orator_storage::SqliteStorage;

async fn open_storage(config: &OratorConfig) -> Result<Arc<dyn StorageAdapter>, OratorError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

fn ledger(config: &OratorConfig, storage: Arc<dyn StorageAdapter>) -> QuotaLedger {
    QuotaLedger::new(storage, QuotaPolicy::from(&config.quota))
}

pub async fn show_user(config: &OratorConfig, id: &str, json: bool) -> Result<(), OratorError> {
    let storage = open_storage(config).await?;
    let user = ledger(config, storage.clone())
        .status(&UserId::from(id))
        .await?
        .ok_or_else(|| not_found(id))?;
    if json {
        let out = serde_json::to_string_pretty(&user)
            .map_err(|e| OratorError::Internal(format!("failed to serialize user: {e}")))?;
        println!("{out}");
    } else {
        print!("{}", format_user(&user));
    }
    storage.close().await
}

pub async fn grant_premium(config: &OratorConfig, id: &str, days: u32) -> Result<(), OratorError> {
    let storage = open_storage(config).await?;
    let user = ledger(config, storage.clone())
        .grant_premium(&UserId::from(id), days)
        .await?;
    println!(
        "user {} is premium until {} (daily limit {})",
        user.id,
        user.premium_until
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string()),
        user.daily_limit
    );
    storage.close().await
}

pub async fn add_bonus(config: &OratorConfig, id: &str, amount: u32) -> Result<(), OratorError> {
    let storage = open_storage(config).await?;
    let user = ledger(config, storage.clone())
        .add_bonus(&UserId::from(id), amount)
        .await?;
    println!("user {} now has {} bonus attempts", user.id, user.bonus_limit);
    storage.close().await
}

pub async fn usage(config: &OratorConfig, date: Option<&str>, json: bool) -> Result<(), OratorError> {
    let date = match date {
        Some(date) => {
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                OratorError::Config(format!("invalid --date {date:?} (expected YYYY-MM-DD): {e}"))
            })?;
            date.to_string()
        }
        None => chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let storage = open_storage(config).await?;
    let summary = UsageLedger::new(storage.clone()).daily_summary(&date).await?;
    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| OratorError::Internal(format!("failed to serialize usage: {e}")))?;
        println!("{out}");
    } else {
        print!("{}", format_usage(&summary));
    }
    storage.close().await
}

fn not_found(id: &str) -> OratorError {
    OratorError::NotFound {
        entity: "user",
        id: id.to_string(),
    }
}

fn format_user(user: &User) -> String {
    let mut out = String::new();
    let plan = match (user.is_premium, user.premium_until) {
        (true, Some(until)) => format!("premium until {}", until.format("%Y-%m-%d %H:%M UTC")),
        (true, None) => "premium".to_string(),
        (false, _) => "free".to_string(),
    };
    let _ = writeln!(out, "user      {}", user.id);
    let _ = writeln!(out, "username  {}", user.username.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "chat      {}", user.chat_id);
    let _ = writeln!(out, "plan      {plan}");
    let _ = writeln!(
        out,
        "today     {}/{} used, {} bonus, {} remaining",
        user.used_today,
        user.daily_limit,
        user.bonus_limit,
        user.remaining()
    );
    let _ = writeln!(out, "words     {}", user.word_limit);
    let _ = writeln!(out, "voice     {}", user.voice);
    let _ = writeln!(
        out,
        "referrals {} (referred by {})",
        user.referral_count,
        user.referred_by.as_ref().map_or("-", |r| r.as_str())
    );
    let _ = writeln!(out, "joined    {}", user.created_at.format("%Y-%m-%d"));
    out
}

fn format_usage(summary: &DailyUsage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "usage for {}", summary.date);
    if summary.by_backend.is_empty() {
        let _ = writeln!(out, "  no inference calls");
        return out;
    }
    let _ = writeln!(
        out,
        "  {:<36} {:>6} {:>10} {:>10} {:>10}",
        "backend", "calls", "input", "output", "cost"
    );
    let rows = summary
        .by_backend
        .iter()
        .map(|(backend, totals)| (backend.as_str(), totals))
        .chain(std::iter::once(("total", &summary.total)));
    for (backend, totals) in rows {
        let _ = writeln!(
            out,
            "  {:<36} {:>6} {:>10} {:>10} {:>10}",
            backend,
            totals.calls,
            totals.input_tokens,
            totals.output_tokens,
            format!("${:.4}", totals.cost_usd)
        );
    }
    out
}
