// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Switchboard configuration system.

use std::io::Write;

use switchboard_config::diagnostic::ConfigError;
use switchboard_config::model::SwitchboardConfig;
use switchboard_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use switchboard_core::PlatformType;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_switchboard_config() {
    let toml = r#"
[hub]
name = "ops-hub"
log_level = "debug"
signal_capacity = 1024
refresh_interval_secs = 30

[server]
enabled = true
bind_address = "0.0.0.0"
port = 8080

[[channels]]
id = "telegram-main"
platform = "telegram"
name = "Main bot"
credentials = { bot_token = "123:ABC" }

[[channels]]
id = "imsg"
platform = "imessage"
name = "Bridge"
enabled = false

[channels.credentials]
server_url = "http://localhost:1234"
password = "hunter2"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.hub.name, "ops-hub");
    assert_eq!(config.hub.log_level, "debug");
    assert_eq!(config.hub.signal_capacity, 1024);
    assert_eq!(config.hub.refresh_interval_secs, 30);
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.channels.len(), 2);
    assert_eq!(config.channels[0].id, "telegram-main");
    assert_eq!(config.channels[1].platform, PlatformType::Imessage);
    assert_eq!(
        config.channels[1].credential("server_url"),
        Some("http://localhost:1234")
    );
    assert!(!config.channels[1].enabled);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.hub.name, "switchboard");
    assert_eq!(config.hub.log_level, "info");
    assert_eq!(config.hub.signal_capacity, 512);
    assert_eq!(config.server.port, 3080);
    assert!(config.channels.is_empty());
}

/// Unknown field in [hub] produces an unknown field error.
#[test]
fn unknown_field_in_hub_produces_error() {
    let toml = r#"
[hub]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telegram"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// An override merged after TOML wins, the way `SWITCHBOARD_HUB_NAME` does.
#[test]
fn later_provider_overrides_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[hub]
name = "from-toml"

[server]
port = 9000
"#;

    let config: SwitchboardConfig = Figment::new()
        .merge(Serialized::defaults(SwitchboardConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("hub.name", "envtest"))
        .merge(("server.port", 9100))
        .extract()
        .expect("should merge override");

    assert_eq!(config.hub.name, "envtest");
    assert_eq!(config.server.port, 9100);
}

/// Unknown key "naem" in [hub] produces a diagnostic with a suggestion.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[hub]
naem = "test"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "naem"
                && suggestion.as_deref() == Some("name")
                && valid_keys.contains("log_level")
                && valid_keys.contains("signal_capacity")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'naem' with suggestion 'name', got: {errors:?}"
    );
}

/// A typo inside a [[channels]] entry is caught with a suggestion.
#[test]
fn diagnostic_channel_typo_suggests_field() {
    let toml = r#"
[[channels]]
id = "tg"
platfrom = "telegram"
name = "Bot"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "platfrom" && suggestion.as_deref() == Some("platform")
        )),
        "got: {errors:?}"
    );
}

/// Wrong value type produces a clear message.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[server]
port = "eighty"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("port"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError implements miette::Diagnostic with stable codes.
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    let code = error.code().expect("should have a diagnostic code");
    assert_eq!(code.to_string(), "switchboard::config::unknown_key");

    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `name`?"), "help: {help}");
}

/// Error renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::Validation {
        message: "duplicate channel id `tg` in [[channels]] array".to_string(),
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("duplicate channel id"), "rendered: {buf}");
}

/// A complete valid config passes load_and_validate_str.
#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[hub]
name = "test"

[[channels]]
id = "dc"
platform = "discord"
name = "Community"
"#;

    let config = load_and_validate_str(toml).expect("should validate");
    assert_eq!(config.channels[0].platform, PlatformType::Discord);
}

/// Semantic errors surface as validation diagnostics, all at once.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[hub]
signal_capacity = 0

[[channels]]
id = "a"
platform = "telegram"
name = "A"

[[channels]]
id = "a"
platform = "discord"
name = "A again"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// A config file on disk is loaded and validated.
#[test]
fn load_and_validate_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[server]
enabled = false

[[channels]]
id = "wa"
platform = "whatsapp"
name = "Support line"
"#
    )
    .expect("write config");

    let config = load_and_validate_path(file.path()).expect("should load");
    assert!(!config.server.enabled);
    assert_eq!(config.channels[0].id, "wa");
}

/// A missing explicit config path is an error, not silent defaults.
#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let errors = load_and_validate_path(&dir.path().join("absent.toml"))
        .expect_err("missing file should fail");
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}

/// Channel credentials never appear in Debug output.
#[test]
fn channel_debug_redacts_credentials() {
    let toml = r#"
[[channels]]
id = "tg"
platform = "telegram"
name = "Bot"
credentials = { bot_token = "super-secret-token" }
"#;

    let config = load_config_from_str(toml).expect("valid");
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret-token"), "{debug}");
    assert!(debug.contains("bot_token"), "{debug}");
}
