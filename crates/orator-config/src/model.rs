// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Orator assessment bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Orator configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OratorConfig {
    /// Bot identity and operator settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Google Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Candidate order, retry and failover settings.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Daily allowance, referral and audio limits.
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bot identity and operator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Platform user ids allowed to run admin commands (`/announce`).
    #[serde(default)]
    pub admin_ids: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            admin_ids: Vec::new(),
        }
    }
}

fn default_agent_name() -> String {
    "orator".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables Telegram integration.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Bot username (without `@`), used to build referral links.
    #[serde(default)]
    pub bot_username: Option<String>,
}

/// Google Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (overridable for proxies and tests).
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Inference pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Ordered `provider:model` candidates, most preferred first.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Total attempts per assessment across all candidates.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Retries on the same candidate for transient failures.
    #[serde(default = "default_same_backend_retries")]
    pub same_backend_retries: u32,

    /// Base delay for exponential backoff between same-candidate retries.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Per-call timeout for a backend request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds a shared exclusion lasts before the candidate is probed again.
    #[serde(default = "default_reprobe_after_secs")]
    pub reprobe_after_secs: u64,

    /// Maximum output tokens requested from a backend.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            max_attempts: default_max_attempts(),
            same_backend_retries: default_same_backend_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            reprobe_after_secs: default_reprobe_after_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_candidates() -> Vec<String> {
    vec![
        "gemini:gemini-2.5-flash".to_string(),
        "gemini:gemini-2.0-flash".to_string(),
        "openai:gpt-4o-audio-preview".to_string(),
    ]
}

fn default_max_attempts() -> u32 {
    5
}

fn default_same_backend_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    75
}

fn default_reprobe_after_secs() -> u64 {
    300
}

fn default_max_tokens() -> u32 {
    2048
}

/// Quota and limits configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Assessments per day for free-tier users.
    #[serde(default = "default_free_daily_limit")]
    pub free_daily_limit: u32,

    /// Assessments per day for premium users.
    #[serde(default = "default_premium_daily_limit")]
    pub premium_daily_limit: u32,

    /// Maximum words in a target phrase for free-tier users.
    #[serde(default = "default_free_word_limit")]
    pub free_word_limit: u32,

    /// Maximum words in a target phrase for premium users.
    #[serde(default = "default_premium_word_limit")]
    pub premium_word_limit: u32,

    /// Completed referrals needed per reward.
    #[serde(default = "default_referral_threshold")]
    pub referral_threshold: u32,

    /// Bonus units granted per reward.
    #[serde(default = "default_referral_reward")]
    pub referral_reward: u32,

    /// Longest accepted recording.
    #[serde(default = "default_max_audio_secs")]
    pub max_audio_secs: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_daily_limit: default_free_daily_limit(),
            premium_daily_limit: default_premium_daily_limit(),
            free_word_limit: default_free_word_limit(),
            premium_word_limit: default_premium_word_limit(),
            referral_threshold: default_referral_threshold(),
            referral_reward: default_referral_reward(),
            max_audio_secs: default_max_audio_secs(),
        }
    }
}

fn default_free_daily_limit() -> u32 {
    3
}

fn default_premium_daily_limit() -> u32 {
    100
}

fn default_free_word_limit() -> u32 {
    30
}

fn default_premium_word_limit() -> u32 {
    200
}

fn default_referral_threshold() -> u32 {
    3
}

fn default_referral_reward() -> u32 {
    3
}

fn default_max_audio_secs() -> u32 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Timeout applied to each storage call.
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("orator").join("orator.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("orator.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

fn default_storage_timeout_secs() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = OratorConfig::default();
        assert_eq!(config.agent.name, "orator");
        assert_eq!(config.inference.max_attempts, 5);
        assert_eq!(config.inference.request_timeout_secs, 75);
        assert_eq!(config.storage.timeout_secs, 15);
        assert_eq!(config.quota.free_daily_limit, 3);
        assert_eq!(config.quota.referral_threshold, 3);
        assert_eq!(config.quota.referral_reward, 3);
        assert!(config.storage.database_path.ends_with("orator.db"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml_str = r#"
[quota]
free_daily_limit = 5
"#;
        let config: OratorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quota.free_daily_limit, 5);
        assert_eq!(config.quota.premium_daily_limit, 100);
        assert_eq!(config.quota.max_audio_secs, 60);
    }

    #[test]
    fn inference_deny_unknown_fields() {
        let toml_str = r#"
[inference]
max_atempts = 3
"#;
        assert!(toml::from_str::<OratorConfig>(toml_str).is_err());
    }

    #[test]
    fn candidates_list_deserializes_in_order() {
        let toml_str = r#"
[inference]
candidates = ["openai:gpt-4o-audio-preview", "gemini:gemini-2.5-flash"]
"#;
        let config: OratorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.inference.candidates,
            vec!["openai:gpt-4o-audio-preview", "gemini:gemini-2.5-flash"]
        );
    }
}
