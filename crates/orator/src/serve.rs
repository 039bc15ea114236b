// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `orator serve` command implementation.
//!
//! Wires SQLite storage, the quota and usage ledgers, the inference pool and
//! the Telegram channel into an [`AgentLoop`], then runs until a shutdown
//! signal arrives and in-flight assessments have drained.

use std::sync::Arc;

use orator_agent::{AgentLoop, AgentSettings, Orchestrator, shutdown};
use orator_config::model::OratorConfig;
use orator_core::{ChannelAdapter, Notifier, OratorError, PluginAdapter, StorageAdapter};
use orator_inference::InferencePool;
use orator_quota::{QuotaLedger, QuotaPolicy, UsageLedger};
use orator_storage::SqliteStorage;
use orator_telegram::TelegramChannel;
use tracing::{info, warn};

pub async fn run_serve(config: OratorConfig) -> Result<(), OratorError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting orator serve");

    let storage: Arc<dyn StorageAdapter> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let ledger = Arc::new(QuotaLedger::new(
        storage.clone(),
        QuotaPolicy::from(&config.quota),
    ));
    let usage = Arc::new(UsageLedger::new(storage.clone()));

    let pool = InferencePool::from_config(&config)?.with_recorder(usage);
    if pool.candidates().is_empty() {
        warn!("no inference backend has credentials; every assessment will fail");
    }
    info!(
        candidates = ?pool.candidates().iter().map(|c| c.id()).collect::<Vec<_>>(),
        "inference pool ready"
    );

    let mut telegram = TelegramChannel::new(&config.telegram)?;
    telegram.connect().await?;
    let notifier: Arc<dyn Notifier> = Arc::new(telegram.notifier());
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let orchestrator = Arc::new(Orchestrator::new(
        storage,
        ledger,
        Arc::new(pool),
        notifier,
        AgentSettings::from(&config),
    ));

    let cancel = shutdown::install_signal_handler();
    let agent_loop = AgentLoop::new(channel.clone(), orchestrator);
    agent_loop.run(cancel).await?;

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }
    info!("orator stopped");
    Ok(())
}

/// `RUST_LOG` wins over `agent.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_filter(log_level: &str) -> String {
    ["orator", "orator_agent", "orator_inference", "orator_quota", "orator_telegram"]
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .chain(std::iter::once("warn".to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_crates() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("orator=debug"));
        assert!(filter.contains("orator_inference=debug"));
        assert!(filter.ends_with(",warn"));
    }
}
