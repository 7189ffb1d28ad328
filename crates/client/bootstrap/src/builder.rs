//! Builds the runtime, host, and config bundle used by clients.
use std::sync::Arc;

use anyhow::{Context, Result};
use runtime::{InputProvider, NoInput, Runtime, RuntimeConfig};

use crate::config::ClientConfig;
use crate::host::{HostFactory, SimulatedHost};

/// Builder that assembles runtime state, host adapters, and configuration.
pub struct RuntimeBuilder {
    config: ClientConfig,
    host_factory: Arc<dyn HostFactory>,
    simulated: Option<SimulatedHost>,
    input: Arc<dyn InputProvider>,
}

impl RuntimeBuilder {
    /// Starts from `config` with a simulated host that already contains the
    /// local participant.
    pub fn new(config: ClientConfig) -> Self {
        let simulated = SimulatedHost::new();
        simulated.spawn(&config.local_participant);
        Self {
            config,
            host_factory: Arc::new(simulated.clone()),
            simulated: Some(simulated),
            input: Arc::new(NoInput),
        }
    }

    /// Provide a custom host factory (e.g., an engine binding).
    pub fn host_factory(mut self, factory: impl HostFactory + 'static) -> Self {
        self.host_factory = Arc::new(factory);
        self.simulated = None;
        self
    }

    /// Provide the revival key input source for the tick driver.
    pub fn input_provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.input = Arc::new(provider);
        self
    }

    pub async fn build(self) -> Result<RuntimeSetup> {
        let host = self.host_factory.build();

        let runtime_config = RuntimeConfig {
            revival: self.config.revival.clone(),
            local_participant: Some(self.config.local_participant.clone()),
            tick_interval: Some(self.config.tick_interval),
            ..RuntimeConfig::default()
        };

        let runtime = Runtime::builder()
            .config(runtime_config)
            .host(host)
            .input_provider(self.input)
            .build()
            .await
            .context("failed to start revival runtime")?;

        tracing::info!(
            local = %self.config.local_participant,
            tick_ms = u64::try_from(self.config.tick_interval.as_millis()).unwrap_or(u64::MAX),
            bypass = self.config.revival.bypass_requirements,
            "revival runtime started"
        );

        Ok(RuntimeSetup {
            config: self.config,
            simulated: self.simulated,
            runtime,
        })
    }
}

pub struct RuntimeSetup {
    pub config: ClientConfig,
    /// Present when the default simulated host is in use.
    pub simulated: Option<SimulatedHost>,
    pub runtime: Runtime,
}
