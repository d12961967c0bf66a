// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as a usable bind address, unique channel ids, and ids that fit inside
//! composite conversation ids.

use std::collections::HashSet;

use switchboard_core::ids::CONVERSATION_ID_DELIMITER;

use crate::diagnostic::ConfigError;
use crate::model::SwitchboardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &SwitchboardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.hub.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "hub.log_level `{}` must be one of: {}",
            config.hub.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.hub.signal_capacity == 0 {
        fail("hub.signal_capacity must be at least 1".to_string());
    }

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        fail("server.bind_address must not be empty".to_string());
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.enabled && config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    let mut seen_ids = HashSet::new();
    for (i, channel) in config.channels.iter().enumerate() {
        if channel.id.trim().is_empty() {
            fail(format!("channels[{i}].id must not be empty"));
        } else if channel.id.contains(CONVERSATION_ID_DELIMITER) {
            fail(format!(
                "channels[{i}].id `{}` must not contain `{CONVERSATION_ID_DELIMITER}`",
                channel.id
            ));
        } else if !seen_ids.insert(channel.id.as_str()) {
            fail(format!(
                "duplicate channel id `{}` in [[channels]] array",
                channel.id
            ));
        }

        if channel.name.trim().is_empty() {
            fail(format!("channels[{i}].name must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
