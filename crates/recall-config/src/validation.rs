// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{ProviderKind, RecallConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem rather than stopping at the first.
pub fn validate_config(config: &RecallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` must be one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let orchestrator = &config.orchestrator;
    for (key, value) in [
        ("max_background_tasks", orchestrator.max_background_tasks),
        ("event_capacity", orchestrator.event_capacity),
        ("request_queue", orchestrator.request_queue),
    ] {
        if value < 1 {
            errors.push(ConfigError::Validation {
                message: format!("orchestrator.{key} must be at least 1, got {value}"),
            });
        }
    }

    let mut seen_names = HashSet::new();
    for (i, provider) in config.providers.iter().enumerate() {
        if provider.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("providers[{i}].name must not be empty"),
            });
        } else if !seen_names.insert(provider.name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate provider name `{}` in [[providers]] array",
                    provider.name
                ),
            });
        }

        match provider.kind {
            ProviderKind::Window => match provider.window {
                Some(n) if n >= 1 => {}
                Some(n) => errors.push(ConfigError::Validation {
                    message: format!("providers[{i}].window must be at least 1, got {n}"),
                }),
                None => errors.push(ConfigError::Validation {
                    message: format!("providers[{i}] of kind `window` requires `window`"),
                }),
            },
            ProviderKind::Static => {
                if provider.text.as_deref().is_none_or(|t| t.trim().is_empty()) {
                    errors.push(ConfigError::Validation {
                        message: format!("providers[{i}] of kind `static` requires non-empty `text`"),
                    });
                }
            }
            ProviderKind::Digest => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
