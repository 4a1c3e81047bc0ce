// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recall.toml` > `~/.config/recall/recall.toml` > `/etc/recall/recall.toml`
//! with environment variable overrides via `RECALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecallConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recall/recall.toml`
/// 3. `~/.config/recall/recall.toml`
/// 4. `./recall.toml`
/// 5. `RECALL_*` environment variables
pub fn load_config() -> Result<RecallConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for XDG loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(Toml::file("/etc/recall/recall.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("recall/recall.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("recall.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `RECALL_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `split("_")` because keys such as
/// `max_background_tasks` contain underscores themselves.
///
/// Figment passes the key in its original case (`LOG_LEVEL`), so it is
/// lowercased before matching section prefixes.
fn env_provider() -> Env {
    Env::prefixed("RECALL_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["log", "orchestrator"] {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("log_level"), "log.level");
        assert_eq!(
            map_env_key("orchestrator_max_background_tasks"),
            "orchestrator.max_background_tasks"
        );
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn env_keys_are_matched_case_insensitively() {
        assert_eq!(map_env_key("LOG_LEVEL"), "log.level");
        assert_eq!(
            map_env_key("ORCHESTRATOR_REQUEST_QUEUE"),
            "orchestrator.request_queue"
        );
    }

    #[test]
    fn env_override_applies_through_provider() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RECALL_ORCHESTRATOR_EVENT_CAPACITY", "16");
            jail.set_env("RECALL_LOG_LEVEL", "debug");
            let config: RecallConfig = Figment::new()
                .merge(Serialized::defaults(RecallConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.orchestrator.event_capacity, 16);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }
}
