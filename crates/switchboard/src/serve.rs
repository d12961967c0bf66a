// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchboard serve` command implementation.
//!
//! Builds the channel hub from configuration, connects every enabled
//! channel, serves the HTTP API, and keeps the registry in sync with the
//! configuration until SIGINT/SIGTERM.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use switchboard_config::SwitchboardConfig;
use switchboard_core::SwitchboardError;
use switchboard_hub::{AdapterFactories, ChannelHub, shutdown};

use crate::http::{self, ApiState};
use crate::journal;

/// Adapter factories compiled into this binary.
///
/// Platform integrations register here; channels whose platform has no
/// factory are reported as skipped at startup.
pub fn builtin_factories() -> AdapterFactories {
    AdapterFactories::new()
}

/// Runs the `switchboard serve` command.
pub async fn run_serve(
    config: SwitchboardConfig,
    config_path: Option<PathBuf>,
) -> Result<(), SwitchboardError> {
    init_tracing(&config.hub.log_level);

    info!(name = %config.hub.name, "starting switchboard serve");

    let hub = Arc::new(ChannelHub::with_signal_capacity(config.hub.signal_capacity));
    let factories = builtin_factories();
    let cancel = shutdown::install_signal_handler();

    // Outlives `cancel` so the signals emitted while stopping are recorded.
    let journal_cancel = CancellationToken::new();
    let journal_task = tokio::spawn(journal::run(hub.subscribe(), journal_cancel.clone()));

    let report = hub.sync_channels(&config.channels, &factories).await;
    for (id, reason) in &report.skipped {
        warn!(channel = %id, reason = %reason, "channel not started");
    }

    hub.start().await;

    let refresh_task = (config.hub.refresh_interval_secs > 0).then(|| {
        spawn_refresh(
            hub.clone(),
            factories.clone(),
            config_path.clone(),
            Duration::from_secs(config.hub.refresh_interval_secs),
            cancel.clone(),
        )
    });

    if config.server.enabled {
        let addr = format!("{}:{}", config.server.bind_address, config.server.port);
        let state = ApiState {
            hub: hub.clone(),
            name: config.hub.name.clone(),
        };
        if let Err(e) = http::serve(&addr, state, cancel.clone()).await {
            error!(error = %e, "HTTP API failed, shutting down");
            cancel.cancel();
        }
    }

    cancel.cancelled().await;
    if let Some(task) = refresh_task
        && let Err(e) = task.await
    {
        debug!(error = %e, "channel refresh task ended abnormally");
    }

    shutdown::shutdown_hub(&hub, &cancel).await;
    // Detaching waits for each forwarder to flush its adapter's last signals.
    for id in hub.adapter_ids() {
        hub.unregister_adapter(&id).await;
    }

    journal_cancel.cancel();
    if let Err(e) = journal_task.await {
        debug!(error = %e, "signal journal task ended abnormally");
    }

    info!("switchboard serve shutdown complete");
    Ok(())
}

/// Periodically re-read configuration and reconcile the registry.
///
/// A reconciliation already in progress when `cancel` fires runs to completion.
fn spawn_refresh(
    hub: Arc<ChannelHub>,
    factories: AdapterFactories,
    config_path: Option<PathBuf>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match reload(config_path.as_deref()) {
                        Ok(config) => {
                            let report = hub.sync_channels(&config.channels, &factories).await;
                            if report.is_noop() {
                                debug!("channel refresh: no changes");
                            }
                        }
                        Err(errors) => {
                            for e in &errors {
                                warn!(error = %e, "channel refresh skipped: invalid configuration");
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("channel refresh task shutting down");
                    break;
                }
            }
        }
    })
}

fn reload(
    path: Option<&Path>,
) -> Result<SwitchboardConfig, Vec<switchboard_config::ConfigError>> {
    match path {
        Some(path) => switchboard_config::load_and_validate_path(path),
        None => switchboard_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("switchboard={log_level},warn")));

    // A subscriber may already be installed (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
