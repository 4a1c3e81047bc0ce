// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the recall configuration system.

use recall_config::diagnostic::ConfigError;
use recall_config::model::{ProviderKind, RecallConfig};
use recall_config::{load_and_validate_str, load_config_from_str};
use recall_core::ProviderMode;

/// A full configuration with every section deserializes.
#[test]
fn valid_toml_deserializes_into_recall_config() {
    let toml = r#"
[log]
level = "debug"

[orchestrator]
max_background_tasks = 8
event_capacity = 32
request_queue = 4

[[providers]]
name = "persona"
mode = "blocking"
kind = "static"
text = "The user prefers short answers."

[[providers]]
name = "recent"
mode = "non_blocking"
kind = "window"
window = 6

[[providers]]
name = "shape"
mode = "blocking"
kind = "digest"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.orchestrator.max_background_tasks, 8);
    assert_eq!(config.orchestrator.event_capacity, 32);
    assert_eq!(config.orchestrator.request_queue, 4);
    assert_eq!(config.providers.len(), 3);
    assert_eq!(config.providers[0].name, "persona");
    assert_eq!(config.providers[0].mode, ProviderMode::Blocking);
    assert_eq!(config.providers[0].kind, ProviderKind::Static);
    assert_eq!(config.providers[1].mode, ProviderMode::NonBlocking);
    assert_eq!(config.providers[1].window, Some(6));
    assert_eq!(config.providers[2].kind, ProviderKind::Digest);
}

/// Provider order in the file is preserved; it defines merge order.
#[test]
fn provider_order_is_preserved() {
    let toml = r#"
[[providers]]
name = "c"
mode = "blocking"
kind = "digest"

[[providers]]
name = "a"
mode = "blocking"
kind = "digest"

[[providers]]
name = "b"
mode = "non_blocking"
kind = "digest"
"#;
    let config = load_config_from_str(toml).unwrap();
    let names: Vec<&str> = config.providers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

/// Empty TOML falls back to defaults.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.log.level, "info");
    assert_eq!(config.orchestrator.max_background_tasks, 64);
    assert_eq!(config.orchestrator.event_capacity, 1024);
    assert_eq!(config.orchestrator.request_queue, 256);
    assert!(config.providers.is_empty());
}

/// Unknown keys are rejected.
#[test]
fn unknown_field_in_orchestrator_produces_error() {
    let toml = r#"
[orchestrator]
max_backgrund_tasks = 3
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_backgrund_tasks"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown keys surface as UnknownKey diagnostics with a suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[log]
levle = "info"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    let found = errors.iter().any(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => key == "levle" && suggestion.as_deref() == Some("level"),
        _ => false,
    });
    assert!(found, "expected UnknownKey with suggestion, got {errors:?}");
}

/// A bad provider mode is an invalid value, not a panic.
#[test]
fn unknown_provider_mode_is_rejected() {
    let toml = r#"
[[providers]]
name = "x"
mode = "eventually"
kind = "digest"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(!errors.is_empty());
}

/// Providers must name their mode.
#[test]
fn provider_without_mode_is_rejected() {
    let toml = r#"
[[providers]]
name = "x"
kind = "digest"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Semantic validation runs after successful deserialization.
#[test]
fn duplicate_names_fail_validation() {
    let toml = r#"
[[providers]]
name = "facts"
mode = "blocking"
kind = "digest"

[[providers]]
name = "facts"
mode = "non_blocking"
kind = "digest"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("duplicate provider name")
    )));
}

/// Dot-notation overrides behave the way RECALL_* env vars are mapped.
#[test]
fn dotted_override_sets_nested_value() {
    use figment::{providers::Serialized, Figment};

    let config: RecallConfig = Figment::new()
        .merge(Serialized::defaults(RecallConfig::default()))
        .merge(("orchestrator.max_background_tasks", 2))
        .extract()
        .expect("should set value via dot notation");
    assert_eq!(config.orchestrator.max_background_tasks, 2);
}

/// RECALL_* env vars override file values, whatever the file says.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "recall.toml",
            r#"
[log]
level = "warn"

[orchestrator]
max_background_tasks = 8
"#,
        )?;
        jail.set_env("RECALL_LOG_LEVEL", "debug");
        jail.set_env("RECALL_ORCHESTRATOR_MAX_BACKGROUND_TASKS", "3");

        let config = recall_config::load_config_from_path(std::path::Path::new("recall.toml"))?;
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.orchestrator.max_background_tasks, 3);
        assert_eq!(config.orchestrator.event_capacity, 1024);
        Ok(())
    });
}

/// An env override still goes through validation.
#[test]
fn invalid_env_override_fails_validation() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("recall.toml", "")?;
        jail.set_env("RECALL_ORCHESTRATOR_REQUEST_QUEUE", "0");

        let errors = recall_config::load_and_validate_path(std::path::Path::new("recall.toml"))
            .expect_err("request_queue = 0 is invalid");
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ConfigError::Validation { .. }))
        );
        Ok(())
    });
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    let path = std::path::Path::new("/nonexistent/path/recall.toml");
    let config = recall_config::load_config_from_path(path).expect("missing file is skipped");
    assert_eq!(config.log.level, "info");
}

/// Validation errors render through miette without panicking.
#[test]
fn render_errors_handles_all_variants() {
    let errors = vec![
        ConfigError::Validation {
            message: "bad".into(),
        },
        ConfigError::MissingKey {
            key: "providers.0.mode".into(),
        },
        ConfigError::Other("other".into()),
    ];
    recall_config::render_errors(&errors);
}
