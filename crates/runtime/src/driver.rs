//! Fixed-rate tick loop.
//!
//! [`TickDriver`] measures real elapsed time between ticks, polls the input
//! provider for each tracked entity, and forwards one tick command per entity
//! to the controller worker.
use std::sync::Arc;
use std::time::Duration;

use revival_core::TickInput;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::api::{InputProvider, Result, RuntimeError, RuntimeHandle};

pub struct TickDriver {
    handle: RuntimeHandle,
    input: Arc<dyn InputProvider>,
    period: Duration,
    stop: watch::Receiver<bool>,
}

impl TickDriver {
    pub fn new(
        handle: RuntimeHandle,
        input: Arc<dyn InputProvider>,
        period: Duration,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            handle,
            input,
            period: period.max(Duration::from_millis(1)),
            stop,
        }
    }

    /// Runs until the stop signal fires or the worker goes away.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        debug!(
            period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
            "tick driver started"
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let now = Instant::now();
            let elapsed = now.saturating_duration_since(last);
            last = now;

            match self.step(elapsed).await {
                Ok(ticked) => trace!(
                    ticked,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "tick"
                ),
                Err(RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_)) => {
                    debug!("controller worker gone; tick driver stopping");
                    break;
                }
                Err(error) => return Err(error),
            }
        }

        debug!("tick driver stopped");
        Ok(())
    }

    /// Ticks every tracked entity once with `elapsed`. Returns how many were
    /// ticked.
    pub async fn step(&self, elapsed: Duration) -> Result<usize> {
        let entities = self.handle.tracked_entities().await?;
        for entity in &entities {
            let pressed = self.input.revival_key_pressed(entity).await;
            let input = TickInput::new(entity.clone(), elapsed).with_revival_key(pressed);
            self.handle.tick(input).await?;
        }
        Ok(entities.len())
    }
}
