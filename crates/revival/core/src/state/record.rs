use std::time::Duration;

use super::types::{LifecycleState, RenderElementId, Timestamp};
use crate::flash::FlashTask;

/// Targeting/visibility values captured before suppression.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SuppressionSnapshot {
    /// Awareness/visibility signal opposing entities perceive.
    pub awareness: f32,
    /// Locomotion animation identifier in use before suppression.
    pub locomotion: u32,
}

/// A value captured before mutation.
///
/// `Missing` records that the channel was entered but the host could not
/// provide (or apply) the original, so there is nothing to put back on exit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Snapshot<T> {
    Taken(T),
    Missing,
}

impl<T> Snapshot<T> {
    pub fn taken(&self) -> Option<&T> {
        match self {
            Snapshot::Taken(value) => Some(value),
            Snapshot::Missing => None,
        }
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Snapshot::Taken(_))
    }
}

impl<T, E> From<Result<T, E>> for Snapshot<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Snapshot::Taken(value),
            Err(_) => Snapshot::Missing,
        }
    }
}

/// Lifecycle record for one tracked entity.
///
/// Created lazily on the first critical declaration and kept for the entity's
/// session lifetime so the cooldown survives returns to `Normal`.
///
/// Invariant: `suppression` and `original_movement_speed` are `Some` iff
/// `state != Normal`; `flash` is `Some` only while `Reviving`.
///
/// `pending_render` holds render elements a failed restore left hidden. It is
/// a cleanup obligation rather than a snapshot and may be non-empty in any
/// state until a forced exit manages to show them again.
#[derive(Clone, Debug, Default)]
pub struct EntityStatus {
    pub(crate) state: LifecycleState,
    pub(crate) invulnerability_remaining: Duration,
    pub(crate) last_revival: Option<Timestamp>,
    pub(crate) suppression: Option<Snapshot<SuppressionSnapshot>>,
    pub(crate) original_movement_speed: Option<Snapshot<f32>>,
    pub(crate) flash: Option<FlashTask>,
    pub(crate) pending_render: Vec<RenderElementId>,
}

impl EntityStatus {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Remaining invulnerability; `None` unless the entity is reviving.
    pub fn invulnerability_remaining(&self) -> Option<Duration> {
        (self.state == LifecycleState::Reviving).then_some(self.invulnerability_remaining)
    }

    pub fn last_revival(&self) -> Option<Timestamp> {
        self.last_revival
    }

    pub fn suppression(&self) -> Option<&Snapshot<SuppressionSnapshot>> {
        self.suppression.as_ref()
    }

    pub fn original_movement_speed(&self) -> Option<&Snapshot<f32>> {
        self.original_movement_speed.as_ref()
    }

    pub fn flash(&self) -> Option<&FlashTask> {
        self.flash.as_ref()
    }

    /// Render elements still waiting to be shown again.
    pub fn pending_render(&self) -> &[RenderElementId] {
        &self.pending_render
    }

    /// Returns true if any snapshot is still held for restoration.
    pub fn has_snapshots(&self) -> bool {
        self.suppression.is_some() || self.original_movement_speed.is_some()
    }

    /// Checks the snapshot-presence invariant.
    pub fn is_consistent(&self) -> bool {
        let active = self.state.is_active();
        let snapshots_match = self.suppression.is_some() == active
            && self.original_movement_speed.is_some() == active;
        let flash_match = self.flash.is_none() || self.state == LifecycleState::Reviving;
        snapshots_match && flash_match
    }
}
