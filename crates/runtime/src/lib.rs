//! Runtime orchestration for the revival lifecycle controller.
//!
//! This crate wires the host adapters, the input provider abstraction, and
//! worker tasks into a cohesive runtime API. Consumers embed [`Runtime`] to
//! drive lifecycle transitions, subscribe to events, and query entity status
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`adapters`] bundles host capabilities for the worker
//! - [`driver`] runs the optional fixed-rate tick loop
//! - `workers` keeps background tasks internal to the crate
pub mod adapters;
pub mod api;
pub mod driver;
pub mod events;
pub mod runtime;

mod workers;

pub use adapters::{HostAdapters, Shared};
pub use api::{
    InputProvider, NoInput, Result, RuntimeError, RuntimeHandle, ScriptedInput, SessionClock,
};
pub use driver::TickDriver;
pub use events::{Event, EventBus, LifecycleEvent, NotificationEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
