//! Controller worker that owns the authoritative [`RevivalController`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! against the host adapters, and publishes events to the EventBus.

use std::time::Duration;

use revival_core::{
    EffectActuator, EntityId, EntityStatus, Host, Inventory, Notification, NotificationPort,
    RevivalController, RevivalError, RevivalSuccess, TickInput, TickOutcome, Timestamp,
    TransitionReport,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::adapters::HostAdapters;
use crate::api::{Result, SessionClock};
use crate::events::{Event, EventBus, LifecycleEvent, NotificationEvent};

/// Commands that can be sent to the controller worker
pub enum Command {
    DeclareCritical {
        entity: EntityId,
        reply: oneshot::Sender<Option<TransitionReport>>,
    },
    CancelCritical {
        entity: EntityId,
        reply: oneshot::Sender<Option<TransitionReport>>,
    },
    /// Revival attempt; item possession is answered by the host inventory.
    TryRevive {
        entity: EntityId,
        reply: oneshot::Sender<Result<RevivalSuccess>>,
    },
    Tick {
        input: TickInput,
        reply: oneshot::Sender<TickOutcome>,
    },
    ForceNormal {
        entity: EntityId,
        reply: oneshot::Sender<Option<TransitionReport>>,
    },
    RemoveEntity {
        entity: EntityId,
        reply: oneshot::Sender<Option<EntityStatus>>,
    },
    SetLocalParticipant {
        entity: Option<EntityId>,
        reply: oneshot::Sender<()>,
    },
    QueryStatus {
        entity: EntityId,
        reply: oneshot::Sender<Option<EntityStatus>>,
    },
    IsInvulnerable {
        entity: EntityId,
        reply: oneshot::Sender<bool>,
    },
    RemainingCooldown {
        entity: EntityId,
        reply: oneshot::Sender<Duration>,
    },
    TrackedEntities {
        reply: oneshot::Sender<Vec<EntityId>>,
    },
    /// Forces every tracked entity back to normal and stops the worker.
    Shutdown {
        reply: oneshot::Sender<Vec<TransitionReport>>,
    },
}

/// Notification port that publishes to the event bus and optionally
/// forwards to a host UI.
struct BusNotifier {
    event_bus: EventBus,
    clock: SessionClock,
    forward: Option<Box<dyn NotificationPort>>,
}

impl NotificationPort for BusNotifier {
    fn notify(&mut self, entity: &EntityId, notification: Notification) {
        debug!(entity = %entity, message = %notification.message, "notification");
        if let Some(forward) = self.forward.as_mut() {
            forward.notify(entity, notification.clone());
        }
        self.event_bus
            .publish(Event::Notification(NotificationEvent {
                entity: entity.clone(),
                notification,
                at: self.clock.now(),
            }));
    }
}

/// Host capabilities owned by the worker, kept apart from the controller so
/// both can be borrowed at once.
struct HostParts {
    actuator: Box<dyn EffectActuator>,
    inventory: Box<dyn Inventory>,
    notifier: BusNotifier,
}

impl HostParts {
    fn host(&mut self) -> Host<'_> {
        Host::new(
            self.actuator.as_mut(),
            self.inventory.as_mut(),
            &mut self.notifier,
        )
    }
}

/// Background task that processes lifecycle commands.
///
/// The worker is the controller's only owner, so commands are applied one
/// at a time in arrival order without any locking inside the controller.
pub struct ControllerWorker {
    controller: RevivalController,
    parts: HostParts,
    clock: SessionClock,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl ControllerWorker {
    pub fn new(
        controller: RevivalController,
        host: HostAdapters,
        clock: SessionClock,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            local = ?controller.local_participant(),
            bypass = controller.config().bypass_requirements,
            "ControllerWorker initialized"
        );

        Self {
            controller,
            parts: HostParts {
                actuator: host.actuator,
                inventory: host.inventory,
                notifier: BusNotifier {
                    event_bus: event_bus.clone(),
                    clock,
                    forward: host.notifier,
                },
            },
            clock,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                else => {
                    self.shutdown();
                    break;
                }
            }
        }
        debug!("ControllerWorker stopped");
    }

    /// Returns false once the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        let now = self.clock.now();
        match cmd {
            Command::DeclareCritical { entity, reply } => {
                let report = {
                    let mut host = self.parts.host();
                    self.controller.declare_critical(&mut host, &entity)
                };
                self.publish_report(report.as_ref(), now);
                send(reply, report, "DeclareCritical");
            }
            Command::CancelCritical { entity, reply } => {
                let report = {
                    let mut host = self.parts.host();
                    self.controller.cancel_critical(&mut host, &entity)
                };
                self.publish_report(report.as_ref(), now);
                send(reply, report, "CancelCritical");
            }
            Command::TryRevive { entity, reply } => {
                let has_item = self
                    .parts
                    .inventory
                    .has_item(&entity, &self.controller.config().required_item);
                let result = {
                    let mut host = self.parts.host();
                    self.controller.try_revive(&mut host, &entity, has_item, now)
                };
                self.publish_revival(&entity, &result, now);
                send(reply, result.map_err(Into::into), "TryRevive");
            }
            Command::Tick { input, reply } => {
                let outcome = {
                    let mut host = self.parts.host();
                    self.controller.on_tick(&mut host, &input, now)
                };
                self.publish_tick(&input.entity, &outcome, now);
                send(reply, outcome, "Tick");
            }
            Command::ForceNormal { entity, reply } => {
                let report = {
                    let mut host = self.parts.host();
                    self.controller.force_normal(&mut host, &entity)
                };
                self.publish_report(report.as_ref(), now);
                send(reply, report, "ForceNormal");
            }
            Command::RemoveEntity { entity, reply } => {
                let removed = self.remove_entity(&entity, now);
                send(reply, removed, "RemoveEntity");
            }
            Command::SetLocalParticipant { entity, reply } => {
                info!(entity = ?entity, "local participant set");
                self.controller.set_local_participant(entity);
                send(reply, (), "SetLocalParticipant");
            }
            Command::QueryStatus { entity, reply } => {
                let status = self.controller.status(&entity).cloned();
                send(reply, status, "QueryStatus");
            }
            Command::IsInvulnerable { entity, reply } => {
                send(reply, self.controller.is_invulnerable(&entity), "IsInvulnerable");
            }
            Command::RemainingCooldown { entity, reply } => {
                let remaining = self.controller.remaining_cooldown(&entity, now);
                send(reply, remaining, "RemainingCooldown");
            }
            Command::TrackedEntities { reply } => {
                let mut entities: Vec<EntityId> =
                    self.controller.tracked_entities().cloned().collect();
                entities.sort();
                send(reply, entities, "TrackedEntities");
            }
            Command::Shutdown { reply } => {
                let reports = self.shutdown();
                send(reply, reports, "Shutdown");
                return false;
            }
        }
        true
    }

    fn remove_entity(&mut self, entity: &EntityId, now: Timestamp) -> Option<EntityStatus> {
        let (forced, removed) = {
            let mut host = self.parts.host();
            let forced = self.controller.force_normal(&mut host, entity);
            (forced, self.controller.remove_entity(&mut host, entity))
        };

        self.publish_report(forced.as_ref(), now);
        if removed.is_some() {
            self.event_bus
                .publish(Event::Lifecycle(LifecycleEvent::EntityRemoved {
                    entity: entity.clone(),
                    at: now,
                }));
        }
        removed
    }

    /// Restores every tracked entity. Runs on explicit shutdown and when all
    /// handles are dropped.
    fn shutdown(&mut self) -> Vec<TransitionReport> {
        let now = self.clock.now();
        let entities: Vec<EntityId> = self.controller.tracked_entities().cloned().collect();
        let mut reports = Vec::new();

        for entity in entities {
            let report = {
                let mut host = self.parts.host();
                self.controller.force_normal(&mut host, &entity)
            };
            if let Some(report) = report {
                self.publish_report(Some(&report), now);
                reports.push(report);
            }
        }

        info!(restored = reports.len(), "controller shut down");
        reports
    }

    fn publish_report(&self, report: Option<&TransitionReport>, at: Timestamp) {
        let Some(report) = report else {
            return;
        };
        if !report.is_clean() {
            warn!(
                entity = %report.entity,
                kind = %report.kind,
                failed = ?report.failed,
                "transition completed with failed effects"
            );
        }
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::Transitioned {
                report: report.clone(),
                at,
            }));
    }

    fn publish_revival(
        &self,
        entity: &EntityId,
        result: &std::result::Result<RevivalSuccess, RevivalError>,
        at: Timestamp,
    ) {
        match result {
            Ok(success) => self.publish_report(Some(&success.report), at),
            Err(error) => {
                self.event_bus
                    .publish(Event::Lifecycle(LifecycleEvent::RevivalRejected {
                        entity: entity.clone(),
                        error: error.clone(),
                        at,
                    }))
            }
        }
    }

    fn publish_tick(&self, entity: &EntityId, outcome: &TickOutcome, at: Timestamp) {
        self.publish_report(outcome.expired.as_ref(), at);
        if let Some(result) = &outcome.revival {
            self.publish_revival(entity, result, at);
        }
        if !outcome.reassert_failed.is_empty() {
            self.event_bus
                .publish(Event::Lifecycle(LifecycleEvent::EffectsDegraded {
                    entity: entity.clone(),
                    channels: outcome.reassert_failed,
                    at,
                }));
        }
    }
}

fn send<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!("{command} reply channel closed (caller dropped)");
    }
}
