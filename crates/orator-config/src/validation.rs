// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::OratorConfig;

/// Providers the inference pool knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["gemini", "openai"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &OratorConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut push = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        push("storage.database_path must not be empty".to_string());
    }
    if config.storage.timeout_secs == 0 {
        push("storage.timeout_secs must be at least 1".to_string());
    }

    let inference = &config.inference;
    if inference.max_attempts == 0 {
        push("inference.max_attempts must be at least 1".to_string());
    }
    if inference.request_timeout_secs == 0 {
        push("inference.request_timeout_secs must be at least 1".to_string());
    }

    let mut seen = HashSet::new();
    for candidate in &inference.candidates {
        match candidate.split_once(':') {
            Some((provider, model)) if !model.trim().is_empty() => {
                if !KNOWN_PROVIDERS.contains(&provider) {
                    push(format!(
                        "inference.candidates entry `{candidate}` names unknown provider `{provider}` (known: {})",
                        KNOWN_PROVIDERS.join(", ")
                    ));
                }
            }
            _ => push(format!(
                "inference.candidates entry `{candidate}` must have the form `provider:model`"
            )),
        }
        if !seen.insert(candidate) {
            push(format!("duplicate inference candidate `{candidate}`"));
        }
    }

    let quota = &config.quota;
    if quota.free_daily_limit == 0 {
        push("quota.free_daily_limit must be at least 1".to_string());
    }
    if quota.premium_daily_limit < quota.free_daily_limit {
        push(format!(
            "quota.premium_daily_limit ({}) must not be below quota.free_daily_limit ({})",
            quota.premium_daily_limit, quota.free_daily_limit
        ));
    }
    if quota.free_word_limit == 0 || quota.premium_word_limit == 0 {
        push("quota word limits must be at least 1".to_string());
    }
    if quota.referral_threshold == 0 {
        push("quota.referral_threshold must be at least 1".to_string());
    }
    if quota.max_audio_secs == 0 {
        push("quota.max_audio_secs must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&OratorConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = OratorConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn malformed_and_unknown_candidates_are_reported() {
        let mut config = OratorConfig::default();
        config.inference.candidates = vec![
            "gemini".to_string(),
            "anthropic:claude".to_string(),
            "openai:".to_string(),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "`gemini` must have the form"));
        assert!(has_message(&errors, "unknown provider `anthropic`"));
        assert!(has_message(&errors, "`openai:` must have the form"));
    }

    #[test]
    fn duplicate_candidate_fails_validation() {
        let mut config = OratorConfig::default();
        config.inference.candidates = vec![
            "gemini:gemini-2.5-flash".to_string(),
            "gemini:gemini-2.5-flash".to_string(),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate inference candidate"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = OratorConfig::default();
        config.inference.max_attempts = 0;
        config.quota.free_daily_limit = 0;
        config.quota.max_audio_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3, "got {} errors", errors.len());
    }

    #[test]
    fn premium_limit_below_free_fails() {
        let mut config = OratorConfig::default();
        config.quota.premium_daily_limit = 1;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "premium_daily_limit"));
    }
}
