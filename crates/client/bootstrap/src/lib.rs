//! Shared bootstrap utilities for revival clients.
//!
//! Provides configuration loading, logging setup, host assembly, and runtime
//! setup that can be reused by the simulation binary or an embedding host.
pub mod builder;
pub mod config;
pub mod host;
pub mod logging;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::ClientConfig;
pub use host::{HostFactory, SimulatedHost};
pub use logging::setup_logging;
