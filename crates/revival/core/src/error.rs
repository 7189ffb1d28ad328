//! Common error infrastructure for revival-core.
//!
//! Two families of failure exist:
//!
//! - [`RevivalError`] rejects a lifecycle operation before anything is
//!   mutated (wrong state, cooldown, missing item).
//! - [`ActuatorError`] reports that the host could not apply or restore an
//!   effect. These are logged and never abort a transition; the state machine
//!   completes to the best of its ability and relies on
//!   [`force_normal`](crate::engine::RevivalController::force_normal) as the
//!   last-resort cleanup path.
//!
//! No error is fatal to the session.

use std::time::Duration;

use crate::host::EffectChannels;
use crate::state::{EntityId, ItemId, LifecycleState};

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later.
    ///
    /// Examples: revival on cooldown, host effect briefly unavailable
    Recoverable,

    /// Invalid request for the current state; retrying unchanged will fail.
    ///
    /// Examples: reviving while not critical, revival item missing
    Validation,

    /// Unexpected inconsistency between the controller and the host.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all revival-core errors.
pub trait LifecycleError: std::fmt::Display + std::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier for metrics, logs and tests.
    fn error_code(&self) -> &'static str;
}

/// Rejection of a revival request. The entity record is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevivalError {
    #[error("entity {entity} cannot revive while {state}")]
    InvalidState {
        entity: EntityId,
        state: LifecycleState,
    },

    #[error("revival on cooldown for another {:.1}s", remaining.as_secs_f64())]
    OnCooldown { remaining: Duration },

    #[error("required item {item} not found")]
    MissingItem { item: ItemId },
}

impl LifecycleError for RevivalError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OnCooldown { .. } => ErrorSeverity::Recoverable,
            Self::InvalidState { .. } | Self::MissingItem { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } => "REVIVAL_INVALID_STATE",
            Self::OnCooldown { .. } => "REVIVAL_ON_COOLDOWN",
            Self::MissingItem { .. } => "REVIVAL_MISSING_ITEM",
        }
    }
}

pub type ActuatorResult<T> = Result<T, ActuatorError>;

/// Host failed to apply, read, or restore an effect.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActuatorError {
    #[error("entity {0} is not present in the host world")]
    EntityUnavailable(EntityId),

    #[error("{channel:?} effect failed: {reason}")]
    EffectFailed {
        channel: EffectChannels,
        reason: String,
    },

    #[error("item {item} could not be consumed: {reason}")]
    ConsumeFailed { item: ItemId, reason: String },
}

impl ActuatorError {
    pub fn effect(channel: EffectChannels, reason: impl Into<String>) -> Self {
        Self::EffectFailed {
            channel,
            reason: reason.into(),
        }
    }
}

impl LifecycleError for ActuatorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EntityUnavailable(_) => ErrorSeverity::Internal,
            Self::EffectFailed { .. } | Self::ConsumeFailed { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EntityUnavailable(_) => "ACTUATOR_ENTITY_UNAVAILABLE",
            Self::EffectFailed { .. } => "ACTUATOR_EFFECT_FAILED",
            Self::ConsumeFailed { .. } => "ACTUATOR_CONSUME_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_is_the_only_recoverable_rejection() {
        let cooldown = RevivalError::OnCooldown {
            remaining: Duration::from_secs(30),
        };
        let missing = RevivalError::MissingItem {
            item: ItemId::from("defib"),
        };

        assert!(cooldown.severity().is_recoverable());
        assert_eq!(missing.severity(), ErrorSeverity::Validation);
        assert_eq!(missing.error_code(), "REVIVAL_MISSING_ITEM");
    }

    #[test]
    fn cooldown_message_shows_remaining_seconds() {
        let err = RevivalError::OnCooldown {
            remaining: Duration::from_millis(12_500),
        };

        assert_eq!(err.to_string(), "revival on cooldown for another 12.5s");
    }
}
