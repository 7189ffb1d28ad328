//! Per-entity lifecycle state and the identifiers it is keyed by.
//!
//! [`EntityStatus`] is the single record the controller keeps for each tracked
//! entity. Snapshot fields double as the source of truth for "is there
//! something to restore", so they are only ever written by the transition
//! protocol in [`crate::engine`].
mod record;
mod types;

pub use record::{EntityStatus, Snapshot, SuppressionSnapshot};
pub use types::{BodyRegion, EntityId, ItemId, LifecycleState, RenderElementId, Stance, Timestamp};
