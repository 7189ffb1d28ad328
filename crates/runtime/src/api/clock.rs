//! Monotonic session clock.
use tokio::time::Instant;

use revival_core::Timestamp;

/// Converts a monotonic instant into a [`Timestamp`] relative to session start.
///
/// Ticks and cooldown comparisons both read this clock, so they can never
/// disagree. Built on `tokio::time::Instant`, which makes it controllable in
/// tests with paused time.
#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_duration(self.start.elapsed())
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}
