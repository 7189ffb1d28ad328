//! Worker tasks that back the runtime orchestration.
//!
//! The controller worker is the single owner of the lifecycle controller and
//! the host adapters; every mutation goes through its command channel.

mod controller;

pub use controller::{Command, ControllerWorker};
