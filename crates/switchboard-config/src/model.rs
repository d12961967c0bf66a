// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Switchboard chat hub.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use switchboard_core::ChannelConfig;
use switchboard_core::base::DEFAULT_SIGNAL_CAPACITY;

/// Top-level Switchboard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchboardConfig {
    /// Hub identity, logging, and signal buffering.
    #[serde(default)]
    pub hub: HubConfig,

    /// HTTP API settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Platform connections, one `[[channels]]` table each.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl SwitchboardConfig {
    /// Channels with `enabled = true`.
    pub fn enabled_channels(&self) -> impl Iterator<Item = &ChannelConfig> {
        self.channels.iter().filter(|c| c.enabled)
    }
}

/// Hub-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Instance name, reported by `/health`.
    #[serde(default = "default_hub_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Signals buffered per hub subscriber before the slowest one lags.
    #[serde(default = "default_signal_capacity")]
    pub signal_capacity: usize,

    /// Seconds between configuration re-reads that reconcile channels. 0 disables.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            name: default_hub_name(),
            log_level: default_log_level(),
            signal_capacity: default_signal_capacity(),
            refresh_interval_secs: 0,
        }
    }
}

fn default_hub_name() -> String {
    "switchboard".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_signal_capacity() -> usize {
    DEFAULT_SIGNAL_CAPACITY
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Whether to serve the HTTP API at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Address to bind (default "127.0.0.1").
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3080
}
