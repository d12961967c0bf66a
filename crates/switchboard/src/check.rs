// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchboard check` command implementation.
//!
//! Prints the validated configuration: server address and, per channel,
//! whether it is enabled and whether this binary can build an adapter for it.

use std::io::IsTerminal;

use colored::Colorize;
use serde::Serialize;

use switchboard_config::SwitchboardConfig;
use switchboard_core::PlatformType;
use switchboard_hub::AdapterFactories;

/// One channel line of the report.
#[derive(Debug, Serialize)]
pub struct ChannelCheck {
    pub id: String,
    pub platform: PlatformType,
    pub name: String,
    pub enabled: bool,
    /// A factory for the platform is compiled in.
    pub supported: bool,
    /// Credential keys present (values are never printed).
    pub credentials: Vec<String>,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub server: Option<String>,
    pub channels: Vec<ChannelCheck>,
}

impl CheckReport {
    pub fn build(config: &SwitchboardConfig, factories: &AdapterFactories) -> Self {
        let channels = config
            .channels
            .iter()
            .map(|c| ChannelCheck {
                id: c.id.clone(),
                platform: c.platform,
                name: c.name.clone(),
                enabled: c.enabled,
                supported: factories.get(c.platform).is_some(),
                credentials: c.credentials.keys().cloned().collect(),
            })
            .collect();

        Self {
            name: config.hub.name.clone(),
            server: config
                .server
                .enabled
                .then(|| format!("{}:{}", config.server.bind_address, config.server.port)),
            channels,
        }
    }

    /// Channels that would actually start.
    pub fn startable(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.enabled && c.supported)
            .count()
    }
}

/// Run the `switchboard check` command.
pub fn run_check(config: &SwitchboardConfig, factories: &AdapterFactories, json: bool, plain: bool) {
    let report = CheckReport::build(config, factories);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
        return;
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    print_report(&report, use_color);
}

fn print_report(report: &CheckReport, use_color: bool) {
    let header = format!("switchboard `{}`: configuration OK", report.name);
    if use_color {
        println!("{}", header.green().bold());
    } else {
        println!("{header}");
    }

    match &report.server {
        Some(addr) => println!("  HTTP API:  {addr}"),
        None => println!("  HTTP API:  disabled"),
    }
    println!(
        "  Channels:  {} configured, {} startable",
        report.channels.len(),
        report.startable()
    );

    for channel in &report.channels {
        let status = match (channel.enabled, channel.supported) {
            (false, _) => "disabled",
            (true, false) => "no adapter",
            (true, true) => "ready",
        };
        let status = if !use_color {
            status.to_string()
        } else if status == "ready" {
            status.green().to_string()
        } else {
            status.yellow().to_string()
        };
        println!(
            "  - {:<20} {:<9} {} ({})",
            channel.id,
            channel.platform.to_string(),
            channel.name,
            status
        );
    }
}
