// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchboard - one hub for many chat platforms.
//!
//! This is the binary entry point.

mod check;
mod http;
mod journal;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Switchboard - one hub for many chat platforms.
#[derive(Parser, Debug)]
#[command(name = "switchboard", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect all configured channels and serve the HTTP API.
    Serve,
    /// Validate configuration and show which channels would start.
    Check {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => switchboard_config::load_and_validate_path(path),
        None => switchboard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            switchboard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config, cli.config).await {
                eprintln!("switchboard: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check { json, plain }) => {
            check::run_check(&config, &serve::builtin_factories(), json, plain);
        }
        None => {
            println!("switchboard: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_config_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["switchboard", "check", "--json", "--config", "/tmp/sb.toml"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/sb.toml")));
        assert!(matches!(cli.command, Some(Commands::Check { json: true, plain: false })));
    }

    #[test]
    fn default_config_is_valid() {
        let config = switchboard_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.hub.name, "switchboard");
    }
}
