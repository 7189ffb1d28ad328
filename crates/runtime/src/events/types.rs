//! Event types for different topics.

use revival_core::{
    EffectChannels, EntityId, Notification, RevivalError, Timestamp, TransitionReport,
};
use serde::{Deserialize, Serialize};

/// Lifecycle state changes and their side results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A transition completed, possibly with failed effect channels.
    Transitioned {
        report: TransitionReport,
        at: Timestamp,
    },

    /// A revival attempt was refused; the entity stays critical.
    RevivalRejected {
        entity: EntityId,
        error: RevivalError,
        at: Timestamp,
    },

    /// Per-tick re-assertion of restraints failed on some channels.
    EffectsDegraded {
        entity: EntityId,
        channels: EffectChannels,
        at: Timestamp,
    },

    /// The entity's record was dropped after cleanup.
    EntityRemoved { entity: EntityId, at: Timestamp },
}

impl LifecycleEvent {
    pub fn entity(&self) -> &EntityId {
        match self {
            Self::Transitioned { report, .. } => &report.entity,
            Self::RevivalRejected { entity, .. }
            | Self::EffectsDegraded { entity, .. }
            | Self::EntityRemoved { entity, .. } => entity,
        }
    }

    pub fn at(&self) -> Timestamp {
        match self {
            Self::Transitioned { at, .. }
            | Self::RevivalRejected { at, .. }
            | Self::EffectsDegraded { at, .. }
            | Self::EntityRemoved { at, .. } => *at,
        }
    }
}

/// A user-facing notification routed from the controller's notification port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub entity: EntityId,
    pub notification: Notification,
    pub at: Timestamp,
}
