//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving lifecycle transitions or streaming events from specific topics.
use std::collections::HashMap;
use std::time::Duration;

use revival_core::{
    EntityId, EntityStatus, RevivalSuccess, TickInput, TickOutcome, TransitionReport,
};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Declare an entity critical. `None` if it already was.
    pub async fn declare_critical(&self, entity: EntityId) -> Result<Option<TransitionReport>> {
        self.request(|reply| Command::DeclareCritical { entity, reply })
            .await
    }

    /// Leave the critical state without a revival. `None` unless critical.
    pub async fn cancel_critical(&self, entity: EntityId) -> Result<Option<TransitionReport>> {
        self.request(|reply| Command::CancelCritical { entity, reply })
            .await
    }

    /// Attempt a revival, asking the host inventory for the required item.
    ///
    /// Rejections surface as [`RuntimeError::Revival`].
    pub async fn try_revive(&self, entity: EntityId) -> Result<RevivalSuccess> {
        self.request(|reply| Command::TryRevive { entity, reply })
            .await?
    }

    /// Advance one entity by one simulation step.
    pub async fn tick(&self, input: TickInput) -> Result<TickOutcome> {
        self.request(|reply| Command::Tick { input, reply }).await
    }

    /// Return an entity to normal from any state.
    pub async fn force_normal(&self, entity: EntityId) -> Result<Option<TransitionReport>> {
        self.request(|reply| Command::ForceNormal { entity, reply })
            .await
    }

    /// Clean up and forget an entity that was destroyed or left the session.
    pub async fn remove_entity(&self, entity: EntityId) -> Result<Option<EntityStatus>> {
        self.request(|reply| Command::RemoveEntity { entity, reply })
            .await
    }

    pub async fn set_local_participant(&self, entity: Option<EntityId>) -> Result<()> {
        self.request(|reply| Command::SetLocalParticipant { entity, reply })
            .await
    }

    /// Query the lifecycle record of an entity (read-only copy)
    pub async fn query_status(&self, entity: EntityId) -> Result<Option<EntityStatus>> {
        self.request(|reply| Command::QueryStatus { entity, reply })
            .await
    }

    pub async fn is_invulnerable(&self, entity: EntityId) -> Result<bool> {
        self.request(|reply| Command::IsInvulnerable { entity, reply })
            .await
    }

    /// Remaining revival cooldown at the current session time.
    pub async fn remaining_cooldown(&self, entity: EntityId) -> Result<Duration> {
        self.request(|reply| Command::RemainingCooldown { entity, reply })
            .await
    }

    /// Entities with a lifecycle record, sorted by id.
    pub async fn tracked_entities(&self) -> Result<Vec<EntityId>> {
        self.request(|reply| Command::TrackedEntities { reply }).await
    }

    /// Restore every tracked entity and stop the controller worker.
    pub(crate) async fn shutdown(&self) -> Result<Vec<TransitionReport>> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Lifecycle` - Transitions, rejections, degraded effects
    /// - `Topic::Notification` - User-facing notifications
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut lifecycle_rx = handle.subscribe(Topic::Lifecycle);
    /// while let Ok(event) = lifecycle_rx.recv().await {
    ///     // Handle lifecycle events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// True once the controller worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }
}
