//! Host capabilities handed to the controller worker.
//!
//! The worker owns its adapters outright. Hosts that also need to read the
//! same world from elsewhere (a renderer, a test) wrap it in [`Shared`].
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use revival_core::{
    ActuatorResult, BodyRegion, EffectActuator, EntityId, Inventory, ItemId, Notification,
    NotificationPort, RenderElementId, Stance, SuppressionSnapshot,
};

/// Effect actuator, inventory and an optional extra notification sink.
///
/// Notifications always reach the event bus; `notifier` additionally
/// forwards them to a host UI.
pub struct HostAdapters {
    pub(crate) actuator: Box<dyn EffectActuator>,
    pub(crate) inventory: Box<dyn Inventory>,
    pub(crate) notifier: Option<Box<dyn NotificationPort>>,
}

impl HostAdapters {
    pub fn new(
        actuator: impl EffectActuator + 'static,
        inventory: impl Inventory + 'static,
    ) -> Self {
        Self {
            actuator: Box::new(actuator),
            inventory: Box::new(inventory),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl NotificationPort + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }
}

/// Cloneable, lock-guarded host component.
///
/// The worker is the only writer during a command; other holders observe the
/// component between commands.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    /// Locks the component. A poisoned lock is recovered; the data is plain
    /// host state and stays usable.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: EffectActuator> EffectActuator for Shared<T> {
    fn apply_health_delta(
        &mut self,
        entity: &EntityId,
        region: BodyRegion,
        amount: f32,
    ) -> ActuatorResult<()> {
        self.lock().apply_health_delta(entity, region, amount)
    }

    fn remove_negative_effects(
        &mut self,
        entity: &EntityId,
        region: BodyRegion,
    ) -> ActuatorResult<()> {
        self.lock().remove_negative_effects(entity, region)
    }

    fn restore_vitals(
        &mut self,
        entity: &EntityId,
        energy: f32,
        hydration: f32,
    ) -> ActuatorResult<()> {
        self.lock().restore_vitals(entity, energy, hydration)
    }

    fn apply_painkiller(&mut self, entity: &EntityId) -> ActuatorResult<()> {
        self.lock().apply_painkiller(entity)
    }

    fn apply_tremor(&mut self, entity: &EntityId, duration: Duration) -> ActuatorResult<()> {
        self.lock().apply_tremor(entity, duration)
    }

    fn movement_speed(&self, entity: &EntityId) -> ActuatorResult<f32> {
        self.lock().movement_speed(entity)
    }

    fn set_movement_speed(&mut self, entity: &EntityId, value: f32) -> ActuatorResult<()> {
        self.lock().set_movement_speed(entity, value)
    }

    fn lock_stance(&mut self, entity: &EntityId, stance: Stance) -> ActuatorResult<()> {
        self.lock().lock_stance(entity, stance)
    }

    fn release_stance(&mut self, entity: &EntityId) -> ActuatorResult<()> {
        self.lock().release_stance(entity)
    }

    fn set_combat_enabled(&mut self, entity: &EntityId, enabled: bool) -> ActuatorResult<()> {
        self.lock().set_combat_enabled(entity, enabled)
    }

    fn suppress_targeting(&mut self, entity: &EntityId) -> ActuatorResult<SuppressionSnapshot> {
        self.lock().suppress_targeting(entity)
    }

    fn restore_targeting(
        &mut self,
        entity: &EntityId,
        snapshot: &SuppressionSnapshot,
    ) -> ActuatorResult<()> {
        self.lock().restore_targeting(entity, snapshot)
    }

    fn render_elements(&self, entity: &EntityId) -> ActuatorResult<Vec<RenderElementId>> {
        self.lock().render_elements(entity)
    }

    fn is_render_visible(
        &self,
        entity: &EntityId,
        element: RenderElementId,
    ) -> ActuatorResult<bool> {
        self.lock().is_render_visible(entity, element)
    }

    fn set_render_visible(
        &mut self,
        entity: &EntityId,
        element: RenderElementId,
        visible: bool,
    ) -> ActuatorResult<()> {
        self.lock().set_render_visible(entity, element, visible)
    }
}

impl<T: Inventory> Inventory for Shared<T> {
    fn has_item(&self, entity: &EntityId, item: &ItemId) -> bool {
        self.lock().has_item(entity, item)
    }

    fn consume_item(&mut self, entity: &EntityId, item: &ItemId) -> ActuatorResult<()> {
        self.lock().consume_item(entity, item)
    }
}

impl<T: NotificationPort> NotificationPort for Shared<T> {
    fn notify(&mut self, entity: &EntityId, notification: Notification) {
        self.lock().notify(entity, notification);
    }
}
