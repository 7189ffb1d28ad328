//! Critical-condition and revival lifecycle logic shared across hosts.
//!
//! `revival-core` decides when an entity may be declared critical, whether a
//! revival is permitted, which compound effects are applied on the way in, and
//! how those effects are undone on every way out. All mutation of the host
//! world flows through the traits in [`host`], and all lifecycle state lives in
//! the entity-keyed store owned by [`engine::RevivalController`].

pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod flash;
pub mod host;
pub mod state;

pub use config::{ConfigError, RecoveryProfile, RegionHeal, RevivalConfig};
pub use cooldown::remaining_cooldown;
pub use engine::{
    RevivalController, RevivalSuccess, TickInput, TickOutcome, TransitionKind,
    TransitionReport,
};
pub use error::{ActuatorError, ActuatorResult, ErrorSeverity, LifecycleError, RevivalError};
pub use flash::{FlashStep, FlashTask};
pub use host::{
    EffectActuator, EffectChannels, Host, Inventory, Notification, NotificationColor,
    NotificationDuration, NotificationPort, NotificationSeverity,
};
pub use state::{
    BodyRegion, EntityId, EntityStatus, ItemId, LifecycleState, RenderElementId, Snapshot, Stance,
    SuppressionSnapshot, Timestamp,
};
