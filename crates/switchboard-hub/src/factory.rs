// SPDX-FileCopyrightText: 2026 Switchboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building adapters from channel configuration.
//!
//! Platform integrations register an [`AdapterFactory`] per platform; the
//! hub uses them to turn `[[channels]]` entries into running adapters and
//! to reconcile the registry when the configuration changes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use switchboard_core::{ChannelAdapter, ChannelConfig, PlatformType, SwitchboardError};

use crate::hub::ChannelHub;
use crate::report::SyncReport;

/// Creates adapters for one platform.
pub trait AdapterFactory: Send + Sync {
    fn platform(&self) -> PlatformType;

    /// Build an adapter from its configuration. Credential checks belong here.
    fn create(&self, config: ChannelConfig) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError>;
}

/// Closure-backed factory, used by [`AdapterFactories::register_fn`].
struct FnFactory<F> {
    platform: PlatformType,
    build: F,
}

impl<F> AdapterFactory for FnFactory<F>
where
    F: Fn(ChannelConfig) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError> + Send + Sync,
{
    fn platform(&self) -> PlatformType {
        self.platform
    }

    fn create(&self, config: ChannelConfig) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError> {
        (self.build)(config)
    }
}

/// Factories keyed by platform. Registering a platform twice replaces the first.
#[derive(Default, Clone)]
pub struct AdapterFactories {
    by_platform: HashMap<PlatformType, Arc<dyn AdapterFactory>>,
}

impl AdapterFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Arc<dyn AdapterFactory>) -> &mut Self {
        self.by_platform.insert(factory.platform(), factory);
        self
    }

    pub fn register_fn<F>(&mut self, platform: PlatformType, build: F) -> &mut Self
    where
        F: Fn(ChannelConfig) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError>
            + Send
            + Sync
            + 'static,
    {
        self.register(Arc::new(FnFactory { platform, build }))
    }

    pub fn get(&self, platform: PlatformType) -> Option<&Arc<dyn AdapterFactory>> {
        self.by_platform.get(&platform)
    }

    /// Platforms with a registered factory, sorted.
    pub fn platforms(&self) -> Vec<PlatformType> {
        let mut platforms: Vec<PlatformType> = self.by_platform.keys().copied().collect();
        platforms.sort();
        platforms
    }

    pub fn is_empty(&self) -> bool {
        self.by_platform.is_empty()
    }

    pub fn create(
        &self,
        config: ChannelConfig,
    ) -> Result<Arc<dyn ChannelAdapter>, SwitchboardError> {
        let factory = self.get(config.platform).ok_or_else(|| {
            SwitchboardError::Config(format!(
                "no adapter implementation registered for platform {}",
                config.platform
            ))
        })?;
        factory.create(config)
    }
}

impl ChannelHub {
    /// Reconcile the registry with `configs`.
    ///
    /// Enabled channels that are not registered are created and registered.
    /// Registered adapters whose channel was removed or disabled are
    /// unregistered. Adapters whose configuration changed are replaced.
    /// A channel that cannot be built is recorded in `skipped` and does not
    /// stop the others.
    pub async fn sync_channels(
        &self,
        configs: &[ChannelConfig],
        factories: &AdapterFactories,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        let wanted: HashMap<&str, &ChannelConfig> = configs
            .iter()
            .filter(|c| c.enabled)
            .map(|c| (c.id.as_str(), c))
            .collect();

        for id in self.adapter_ids() {
            let keep = match (wanted.get(id.as_str()), self.adapter(&id)) {
                (Some(config), Some(adapter)) => adapter.config() == *config,
                _ => false,
            };
            if !keep {
                self.unregister_adapter(&id).await;
                report.removed.push(id);
            }
        }

        for config in configs.iter().filter(|c| c.enabled) {
            if self.adapter(&config.id).is_some() {
                continue;
            }
            let registered = match factories.create(config.clone()) {
                Ok(adapter) => self.register_adapter(adapter).await,
                Err(e) => Err(e),
            };
            match registered {
                Ok(()) => report.registered.push(config.id.clone()),
                Err(e) => {
                    warn!(channel = %config.id, platform = %config.platform, error = %e, "channel skipped");
                    report.skipped.push((config.id.clone(), e.to_string()));
                }
            }
        }

        if !report.is_noop() {
            info!(
                registered = report.registered.len(),
                removed = report.removed.len(),
                skipped = report.skipped.len(),
                "channels synchronized"
            );
        }
        report
    }
}
