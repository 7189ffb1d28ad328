//! Values returned by the controller to its caller.

use std::time::Duration;

use crate::error::RevivalError;
use crate::host::EffectChannels;
use crate::state::{EntityId, LifecycleState, Timestamp};

/// Which lifecycle transition took place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TransitionKind {
    EnterCritical,
    CancelCritical,
    Revive,
    InvulnerabilityEnded,
    ForceNormal,
}

/// Outcome of a completed transition.
///
/// `failed` lists the effect channels whose host call failed. A non-empty set
/// means the transition completed in degraded form, not that it was aborted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionReport {
    pub entity: EntityId,
    pub kind: TransitionKind,
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub failed: EffectChannels,
}

impl TransitionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Successful revival.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RevivalSuccess {
    pub report: TransitionReport,
    /// Whether a unit of the required item was removed from the inventory.
    pub item_consumed: bool,
    pub revived_at: Timestamp,
    pub invulnerable_for: Duration,
}

/// Per-step input for one entity, as delivered by the tick driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickInput {
    pub entity: EntityId,
    pub elapsed: Duration,
    pub revival_key_pressed: bool,
}

impl TickInput {
    pub fn new(entity: EntityId, elapsed: Duration) -> Self {
        Self {
            entity,
            elapsed,
            revival_key_pressed: false,
        }
    }

    #[must_use]
    pub fn with_revival_key(mut self, pressed: bool) -> Self {
        self.revival_key_pressed = pressed;
        self
    }
}

/// Everything that happened to one entity during a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Set when the invulnerability window ran out this tick.
    pub expired: Option<TransitionReport>,
    /// Set when the revival key was handled this tick.
    pub revival: Option<Result<RevivalSuccess, RevivalError>>,
    /// Channels whose per-tick re-assertion failed.
    pub reassert_failed: EffectChannels,
}

impl TickOutcome {
    pub fn is_quiet(&self) -> bool {
        self.expired.is_none() && self.revival.is_none() && self.reassert_failed.is_empty()
    }
}
