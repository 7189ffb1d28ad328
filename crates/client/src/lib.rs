//! Scripted revival session driven against a running runtime.
//!
//! # Architecture
//!
//! ```text
//! Simulation (scripted participant)
//!   ├─→ Runtime (controller worker + tick driver)
//!   ├─→ SimulatedHost (world, inventory, notification log)
//!   └─→ ScriptedInput (revival key presses)
//! ```
//!
//! The script walks one entity through every lifecycle path the controller
//! supports: a rejected revival, a successful one, the invulnerability
//! window running out, and a cooldown rejection on the next attempt.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use client_bootstrap::RuntimeSetup;
use revival_core::{EntityId, LifecycleState, RevivalError, TransitionKind};
use runtime::{Event, LifecycleEvent, RuntimeError, RuntimeHandle, ScriptedInput, Topic};
use tokio::sync::broadcast;
use tracing::info;

/// Slack added on top of the invulnerability window when waiting for expiry.
const EXPIRY_SLACK: Duration = Duration::from_secs(5);
const REVIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// What the scripted session observed.
#[derive(Debug, Default)]
pub struct SessionSummary {
    pub transitions: Vec<TransitionKind>,
    pub rejections: Vec<RevivalError>,
    pub notifications: Vec<String>,
    pub final_state: LifecycleState,
    pub remaining_cooldown: Duration,
}

pub struct Simulation {
    setup: RuntimeSetup,
    input: ScriptedInput,
}

impl Simulation {
    pub fn new(setup: RuntimeSetup, input: ScriptedInput) -> Self {
        Self { setup, input }
    }

    pub fn setup(&self) -> &RuntimeSetup {
        &self.setup
    }

    /// Runs the script, then shuts the runtime down.
    pub async fn run(self) -> Result<SessionSummary> {
        let handle = self.setup.runtime.handle();
        let mut lifecycle = handle.subscribe(Topic::Lifecycle);
        let mut notifications = handle.subscribe(Topic::Notification);

        let result = self.script(&handle, &mut lifecycle).await;

        let forced = self
            .setup
            .runtime
            .shutdown()
            .await
            .context("runtime shutdown failed")?;
        info!(forced = forced.len(), "simulation finished");

        let mut summary = result?;
        while let Ok(event) = lifecycle.try_recv() {
            record(&mut summary, event);
        }
        while let Ok(event) = notifications.try_recv() {
            record(&mut summary, event);
        }
        Ok(summary)
    }

    async fn script(
        &self,
        handle: &RuntimeHandle,
        lifecycle: &mut broadcast::Receiver<Event>,
    ) -> Result<SessionSummary> {
        let config = &self.setup.config;
        let entity = config.local_participant.clone();
        let mut summary = SessionSummary::default();

        // 1. Critical
        handle.declare_critical(entity.clone()).await?;
        let critical = TransitionKind::EnterCritical;
        expect_transition(lifecycle, &mut summary, critical, REVIVE_TIMEOUT).await?;
        info!(entity = %entity, "entity is critical");

        // 2. Attempt without the item
        if !config.revival.bypass_requirements {
            match handle.try_revive(entity.clone()).await {
                Err(RuntimeError::Revival(error)) => info!(%error, "revival refused as expected"),
                Ok(_) => bail!("revival succeeded without the required item"),
                Err(error) => return Err(error.into()),
            }
        }

        // 3. Key press with the item available
        if let Some(host) = &self.setup.simulated {
            host.give(&entity, &config.revival.required_item, 1);
        }
        self.input.press(entity.clone()).await;
        let revive = TransitionKind::Revive;
        expect_transition(lifecycle, &mut summary, revive, REVIVE_TIMEOUT).await?;
        info!(entity = %entity, "revived; waiting for invulnerability to end");

        // 4. Expiry
        let window = config.revival.invulnerability + EXPIRY_SLACK;
        let ended = TransitionKind::InvulnerabilityEnded;
        expect_transition(lifecycle, &mut summary, ended, window).await?;

        // 5. Second attempt inside the cooldown
        handle.declare_critical(entity.clone()).await?;
        expect_transition(lifecycle, &mut summary, critical, REVIVE_TIMEOUT).await?;
        if let Err(RuntimeError::Revival(error)) = handle.try_revive(entity.clone()).await {
            info!(%error, "second revival refused");
        }
        handle.cancel_critical(entity.clone()).await?;

        summary.final_state = state_of(handle, &entity).await?;
        summary.remaining_cooldown = handle.remaining_cooldown(entity).await?;
        Ok(summary)
    }
}

async fn state_of(handle: &RuntimeHandle, entity: &EntityId) -> Result<LifecycleState> {
    Ok(handle
        .query_status(entity.clone())
        .await?
        .map(|status| status.state())
        .unwrap_or_default())
}

/// Waits for a transition of `kind`, recording everything seen on the way.
async fn expect_transition(
    rx: &mut broadcast::Receiver<Event>,
    summary: &mut SessionSummary,
    kind: TransitionKind,
    timeout: Duration,
) -> Result<()> {
    let wait = async {
        loop {
            let event = rx.recv().await.context("lifecycle channel closed")?;
            let matched = matches!(
                &event,
                Event::Lifecycle(LifecycleEvent::Transitioned { report, .. }) if report.kind == kind
            );
            record(summary, event);
            if matched {
                return Ok::<_, anyhow::Error>(());
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .with_context(|| format!("timed out waiting for {kind}"))?
}

fn record(summary: &mut SessionSummary, event: Event) {
    match event {
        Event::Lifecycle(LifecycleEvent::Transitioned { report, .. }) => {
            summary.transitions.push(report.kind);
        }
        Event::Lifecycle(LifecycleEvent::RevivalRejected { error, .. }) => {
            summary.rejections.push(error);
        }
        Event::Lifecycle(_) => {}
        Event::Notification(event) => summary.notifications.push(event.notification.message),
    }
}
