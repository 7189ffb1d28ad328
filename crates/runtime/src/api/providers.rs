//! Asynchronous abstraction for sourcing revival input.
//!
//! Runtime users plug in [`InputProvider`] implementations so the tick driver
//! can run with keyboard input, scripted fixtures, or network messages.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use revival_core::EntityId;
use tokio::sync::Mutex;

/// Trait for reporting whether the revival key was pressed for an entity.
///
/// Different implementations can handle:
/// - Local keyboard input
/// - Remote participant messages
/// - Scripted/replayed input
/// - Testing fixtures
#[async_trait]
pub trait InputProvider: Send + Sync {
    /// Returns true if the revival key was pressed since the last poll.
    async fn revival_key_pressed(&self, entity: &EntityId) -> bool;
}

#[async_trait]
impl<T: InputProvider + ?Sized> InputProvider for Arc<T> {
    async fn revival_key_pressed(&self, entity: &EntityId) -> bool {
        (**self).revival_key_pressed(entity).await
    }
}

/// Provider that never reports a key press.
/// Useful for testing or as a fallback.
pub struct NoInput;

#[async_trait]
impl InputProvider for NoInput {
    async fn revival_key_pressed(&self, _entity: &EntityId) -> bool {
        false
    }
}

/// Provider fed programmatically. Each queued press is reported once.
///
/// Clones share the same queue, so one clone can be handed to the runtime
/// while another is used to inject presses.
#[derive(Clone, Default)]
pub struct ScriptedInput {
    pending: Arc<Mutex<HashMap<EntityId, u32>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one key press for `entity`.
    pub async fn press(&self, entity: EntityId) {
        *self.pending.lock().await.entry(entity).or_default() += 1;
    }

    /// Presses not yet observed by a poll.
    pub async fn pending(&self, entity: &EntityId) -> u32 {
        self.pending.lock().await.get(entity).copied().unwrap_or(0)
    }
}

#[async_trait]
impl InputProvider for ScriptedInput {
    async fn revival_key_pressed(&self, entity: &EntityId) -> bool {
        let mut pending = self.pending.lock().await;
        match pending.get_mut(entity) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}
