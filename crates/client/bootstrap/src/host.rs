//! Helpers for constructing the host adapters consumed by the runtime.
use revival_core::EntityId;
use revival_core::host::memory::{NotificationLog, SimBody, SimInventory, SimWorld};
use runtime::{HostAdapters, Shared};

pub trait HostFactory: Send + Sync {
    fn build(&self) -> HostAdapters;
}

/// In-memory host whose world, inventory and notification log stay readable
/// while the runtime owns the adapters.
#[derive(Clone, Default)]
pub struct SimulatedHost {
    pub world: Shared<SimWorld>,
    pub inventory: Shared<SimInventory>,
    pub notifications: Shared<NotificationLog>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, entity: &EntityId) {
        self.world.lock().spawn(entity.clone());
    }

    /// Gives `count` units of `item` to `entity`.
    pub fn give(&self, entity: &EntityId, item: &revival_core::ItemId, count: usize) {
        self.inventory.lock().give(entity, item, count);
    }

    /// Copy of the entity's simulated body.
    pub fn body(&self, entity: &EntityId) -> Option<SimBody> {
        self.world.lock().body(entity).cloned()
    }
}

impl HostFactory for SimulatedHost {
    fn build(&self) -> HostAdapters {
        HostAdapters::new(self.world.clone(), self.inventory.clone())
            .with_notifier(self.notifications.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let host = SimulatedHost::new();
        let entity = EntityId::from("pmc");
        let other = host.clone();

        other.spawn(&entity);

        assert!(host.body(&entity).is_some());
    }
}
