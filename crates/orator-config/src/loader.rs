// SPDX-FileCopyrightText: 2026 Orator Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./orator.toml` > `~/.config/orator/orator.toml` > `/etc/orator/orator.toml`
//! with environment variable overrides via `ORATOR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OratorConfig;

/// Sections whose names are mapped from `ORATOR_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &[
    "agent",
    "telegram",
    "gemini",
    "openai",
    "inference",
    "quota",
    "storage",
];

pub(crate) const SYSTEM_CONFIG: &str = "/etc/orator/orator.toml";
pub(crate) const LOCAL_CONFIG: &str = "orator.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("orator/orator.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/orator/orator.toml` (system-wide)
/// 3. `~/.config/orator/orator.toml` (user XDG config)
/// 4. `./orator.toml` (local directory)
/// 5. `ORATOR_*` environment variables
pub fn load_config() -> Result<OratorConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<OratorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OratorConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OratorConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OratorConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OratorConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `ORATOR_SECTION_KEY` to `section.key`.
///
/// Only the first underscore after a known section name is replaced, so
/// `ORATOR_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token` rather than
/// `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("ORATOR_").map(|key| {
        let key_str = key.as_str();
        for section in SECTIONS {
            if let Some(rest) = key_str.strip_prefix(section) {
                if let Some(field) = rest.strip_prefix('_') {
                    return format!("{section}.{field}").into();
                }
            }
        }
        key_str.to_string().into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn local_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "orator.toml",
                r#"
[agent]
name = "local-bot"

[quota]
free_daily_limit = 7
"#,
            )?;
            let config = load_config()?;
            assert_eq!(config.agent.name, "local-bot");
            assert_eq!(config.quota.free_daily_limit, 7);
            assert_eq!(config.quota.premium_daily_limit, 100);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file_and_keeps_underscored_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("orator.toml", "[telegram]\nbot_token = \"from-file\"\n")?;
            jail.set_env("ORATOR_TELEGRAM_BOT_TOKEN", "from-env");
            jail.set_env("ORATOR_QUOTA_MAX_AUDIO_SECS", "90");
            let config = load_config()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
            assert_eq!(config.quota.max_audio_secs, 90);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[storage]\ndatabase_path = \"/tmp/x.db\"\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.storage.database_path, "/tmp/x.db");
            Ok(())
        });
    }
}
