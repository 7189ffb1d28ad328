//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the lifecycle controller.

use std::sync::Arc;
use std::time::Duration;

use revival_core::{EntityId, RevivalConfig, RevivalController, TransitionReport};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapters::HostAdapters;
use crate::api::{InputProvider, NoInput, Result, RuntimeError, RuntimeHandle, SessionClock};
use crate::driver::TickDriver;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, ControllerWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub revival: RevivalConfig,
    /// Entity controlled on this machine, if known at startup.
    pub local_participant: Option<EntityId>,
    /// Period of the built-in tick driver. `None` leaves ticking to the caller.
    pub tick_interval: Option<Duration>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            revival: RevivalConfig::default(),
            local_participant: None,
            tick_interval: None,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that orchestrates the lifecycle controller
///
/// Design: Runtime owns workers and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    // Shared handle (can be cloned for clients)
    handle: RuntimeHandle,
    clock: SessionClock,

    // Background workers
    worker_handle: JoinHandle<()>,
    driver_handle: Option<JoinHandle<Result<()>>>,
    stop_tx: watch::Sender<bool>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Session clock used for ticks and cooldowns
    pub fn clock(&self) -> SessionClock {
        self.clock
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    pub fn has_tick_driver(&self) -> bool {
        self.driver_handle.is_some()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Stops the tick driver, returns every tracked entity to normal, and
    /// waits for the worker to exit. Returns the forced transitions.
    pub async fn shutdown(self) -> Result<Vec<TransitionReport>> {
        // Receivers may already be gone if the driver exited on its own.
        let _ = self.stop_tx.send(true);
        if let Some(driver) = self.driver_handle {
            driver.await.map_err(RuntimeError::WorkerJoin)??;
        }

        let reports = match self.handle.shutdown().await {
            Ok(reports) => reports,
            Err(RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_)) => {
                Vec::new()
            }
            Err(error) => return Err(error),
        };
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(reports)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    host: Option<HostAdapters>,
    input_provider: Option<Arc<dyn InputProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            host: None,
            input_provider: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required host adapters
    pub fn host(mut self, host: HostAdapters) -> Self {
        self.host = Some(host);
        self
    }

    /// Set revival key input provider (optional, used by the tick driver)
    pub fn input_provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.input_provider = Some(Arc::new(provider));
        self
    }

    /// Enable the built-in tick driver at the given period
    pub fn tick_interval(mut self, period: Duration) -> Self {
        self.config.tick_interval = Some(period);
        self
    }

    pub fn local_participant(mut self, entity: EntityId) -> Self {
        self.config.local_participant = Some(entity);
        self
    }

    /// Build the runtime
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        self.config.revival.validate()?;
        let host = self.host.ok_or(RuntimeError::MissingHost)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let clock = SessionClock::start();

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let mut controller = RevivalController::new(self.config.revival);
        controller.set_local_participant(self.config.local_participant);

        // Create controller worker
        let worker = ControllerWorker::new(controller, host, clock, command_rx, event_bus);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        // Create tick driver (if enabled)
        let (stop_tx, stop_rx) = watch::channel(false);
        let driver_handle = self.config.tick_interval.map(|period| {
            let input = self
                .input_provider
                .unwrap_or_else(|| Arc::new(NoInput) as Arc<dyn InputProvider>);
            let driver = TickDriver::new(handle.clone(), input, period, stop_rx);
            tokio::spawn(driver.run())
        });

        Ok(Runtime {
            handle,
            clock,
            worker_handle,
            driver_handle,
            stop_tx,
        })
    }
}
