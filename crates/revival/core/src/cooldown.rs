//! Cooldown ledger over [`EntityStatus::last_revival`].
//!
//! There is no storage beyond the record field; these are pure functions so the
//! gate can be evaluated before anything is mutated.
//!
//! [`EntityStatus::last_revival`]: crate::state::EntityStatus::last_revival

use std::time::Duration;

use crate::state::Timestamp;

/// Time left before another revival is allowed.
///
/// `max(0, cooldown - (now - last_revival))`, and zero when the entity has
/// never been revived. Non-increasing as `now` advances.
pub fn remaining_cooldown(
    last_revival: Option<Timestamp>,
    now: Timestamp,
    cooldown: Duration,
) -> Duration {
    match last_revival {
        Some(last) => cooldown.saturating_sub(now.saturating_since(last)),
        None => Duration::ZERO,
    }
}

pub fn is_on_cooldown(last_revival: Option<Timestamp>, now: Timestamp, cooldown: Duration) -> bool {
    !remaining_cooldown(last_revival, now, cooldown).is_zero()
}

/// Remaining cooldown in whole seconds, rounded up, for display.
pub fn display_seconds(remaining: Duration) -> u64 {
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
