//! In-memory host used by tests and the simulation binary.
//!
//! [`SimWorld`] models just enough of an entity (health, movement, stance,
//! targeting signal, render elements) to observe every effect the controller
//! drives, and can be told to fail specific channels.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use super::{EffectActuator, EffectChannels, Host, Inventory, Notification, NotificationPort};
use crate::error::{ActuatorError, ActuatorResult};
use crate::state::{BodyRegion, EntityId, ItemId, RenderElementId, Stance, SuppressionSnapshot};

/// Locomotion id the simulated world switches to while targeting is suppressed.
pub const SUPPRESSED_LOCOMOTION: u32 = 99;

/// Simulated entity body.
#[derive(Clone, Debug, PartialEq)]
pub struct SimBody {
    pub health: BTreeMap<BodyRegion, f32>,
    pub negative_effects: BTreeSet<BodyRegion>,
    pub energy: f32,
    pub hydration: f32,
    pub painkillers: u32,
    pub tremors: Vec<Duration>,
    pub movement_speed: f32,
    pub stance_lock: Option<Stance>,
    pub combat_enabled: bool,
    pub awareness: f32,
    pub locomotion: u32,
    pub render: BTreeMap<RenderElementId, bool>,
}

impl SimBody {
    pub const DEFAULT_SPEED: f32 = 4.5;
    pub const DEFAULT_REGION_HEALTH: f32 = 10.0;
    pub const RENDER_ELEMENTS: u32 = 3;

    pub fn new() -> Self {
        use strum::IntoEnumIterator;

        Self {
            health: BodyRegion::iter()
                .map(|region| (region, Self::DEFAULT_REGION_HEALTH))
                .collect(),
            negative_effects: BodyRegion::iter().collect(),
            energy: 5.0,
            hydration: 5.0,
            painkillers: 0,
            tremors: Vec::new(),
            movement_speed: Self::DEFAULT_SPEED,
            stance_lock: None,
            combat_enabled: true,
            awareness: 1.0,
            locomotion: 1,
            render: (0..Self::RENDER_ELEMENTS)
                .map(|id| (RenderElementId(id), true))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed;
        self
    }

    pub fn all_visible(&self) -> bool {
        self.render.values().all(|visible| *visible)
    }
}

impl Default for SimBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Simulated host world implementing [`EffectActuator`].
#[derive(Clone, Debug, Default)]
pub struct SimWorld {
    bodies: HashMap<EntityId, SimBody>,
    failing: EffectChannels,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: EntityId) -> &mut SimBody {
        self.bodies.entry(entity).or_default()
    }

    pub fn spawn_with(&mut self, entity: EntityId, body: SimBody) {
        self.bodies.insert(entity, body);
    }

    pub fn despawn(&mut self, entity: &EntityId) -> Option<SimBody> {
        self.bodies.remove(entity)
    }

    pub fn body(&self, entity: &EntityId) -> Option<&SimBody> {
        self.bodies.get(entity)
    }

    pub fn body_mut(&mut self, entity: &EntityId) -> Option<&mut SimBody> {
        self.bodies.get_mut(entity)
    }

    /// Makes every call on the given channels fail until [`heal_channels`](Self::heal_channels).
    pub fn fail_channels(&mut self, channels: EffectChannels) {
        self.failing |= channels;
    }

    pub fn heal_channels(&mut self, channels: EffectChannels) {
        self.failing.remove(channels);
    }

    fn check(&self, channel: EffectChannels) -> ActuatorResult<()> {
        if self.failing.intersects(channel) {
            return Err(ActuatorError::effect(channel, "injected failure"));
        }
        Ok(())
    }

    fn read(&self, entity: &EntityId, channel: EffectChannels) -> ActuatorResult<&SimBody> {
        self.check(channel)?;
        self.bodies
            .get(entity)
            .ok_or_else(|| ActuatorError::EntityUnavailable(entity.clone()))
    }

    fn write(
        &mut self,
        entity: &EntityId,
        channel: EffectChannels,
    ) -> ActuatorResult<&mut SimBody> {
        self.check(channel)?;
        self.bodies
            .get_mut(entity)
            .ok_or_else(|| ActuatorError::EntityUnavailable(entity.clone()))
    }
}

impl EffectActuator for SimWorld {
    fn apply_health_delta(
        &mut self,
        entity: &EntityId,
        region: BodyRegion,
        amount: f32,
    ) -> ActuatorResult<()> {
        let body = self.write(entity, EffectChannels::HEALTH)?;
        *body.health.entry(region).or_default() += amount;
        Ok(())
    }

    fn remove_negative_effects(
        &mut self,
        entity: &EntityId,
        region: BodyRegion,
    ) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::HEALTH)?
            .negative_effects
            .remove(&region);
        Ok(())
    }

    fn restore_vitals(
        &mut self,
        entity: &EntityId,
        energy: f32,
        hydration: f32,
    ) -> ActuatorResult<()> {
        let body = self.write(entity, EffectChannels::VITALS)?;
        body.energy += energy;
        body.hydration += hydration;
        Ok(())
    }

    fn apply_painkiller(&mut self, entity: &EntityId) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::PAINKILLER)?.painkillers += 1;
        Ok(())
    }

    fn apply_tremor(&mut self, entity: &EntityId, duration: Duration) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::TREMOR)?.tremors.push(duration);
        Ok(())
    }

    fn movement_speed(&self, entity: &EntityId) -> ActuatorResult<f32> {
        Ok(self.read(entity, EffectChannels::MOVEMENT)?.movement_speed)
    }

    fn set_movement_speed(&mut self, entity: &EntityId, value: f32) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::MOVEMENT)?.movement_speed = value;
        Ok(())
    }

    fn lock_stance(&mut self, entity: &EntityId, stance: Stance) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::STANCE)?.stance_lock = Some(stance);
        Ok(())
    }

    fn release_stance(&mut self, entity: &EntityId) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::STANCE)?.stance_lock = None;
        Ok(())
    }

    fn set_combat_enabled(&mut self, entity: &EntityId, enabled: bool) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::COMBAT)?.combat_enabled = enabled;
        Ok(())
    }

    fn suppress_targeting(&mut self, entity: &EntityId) -> ActuatorResult<SuppressionSnapshot> {
        let body = self.write(entity, EffectChannels::TARGETING)?;
        let snapshot = SuppressionSnapshot {
            awareness: body.awareness,
            locomotion: body.locomotion,
        };
        body.awareness = 0.0;
        body.locomotion = SUPPRESSED_LOCOMOTION;
        Ok(snapshot)
    }

    fn restore_targeting(
        &mut self,
        entity: &EntityId,
        snapshot: &SuppressionSnapshot,
    ) -> ActuatorResult<()> {
        let body = self.write(entity, EffectChannels::TARGETING)?;
        body.awareness = snapshot.awareness;
        body.locomotion = snapshot.locomotion;
        Ok(())
    }

    fn render_elements(&self, entity: &EntityId) -> ActuatorResult<Vec<RenderElementId>> {
        Ok(self
            .read(entity, EffectChannels::RENDER)?
            .render
            .keys()
            .copied()
            .collect())
    }

    fn is_render_visible(
        &self,
        entity: &EntityId,
        element: RenderElementId,
    ) -> ActuatorResult<bool> {
        self.read(entity, EffectChannels::RENDER)?
            .render
            .get(&element)
            .copied()
            .ok_or_else(|| ActuatorError::effect(EffectChannels::RENDER, "unknown render element"))
    }

    fn set_render_visible(
        &mut self,
        entity: &EntityId,
        element: RenderElementId,
        visible: bool,
    ) -> ActuatorResult<()> {
        self.write(entity, EffectChannels::RENDER)?
            .render
            .insert(element, visible);
        Ok(())
    }
}

/// Simulated inventory keyed by entity.
#[derive(Clone, Debug, Default)]
pub struct SimInventory {
    items: HashMap<EntityId, Vec<ItemId>>,
    consumed: Vec<(EntityId, ItemId)>,
    fail_consume: bool,
}

impl SimInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn give(&mut self, entity: &EntityId, item: &ItemId, count: usize) {
        let slot = self.items.entry(entity.clone()).or_default();
        slot.extend(std::iter::repeat_n(item.clone(), count));
    }

    pub fn count(&self, entity: &EntityId, item: &ItemId) -> usize {
        self.items
            .get(entity)
            .map(|items| items.iter().filter(|held| *held == item).count())
            .unwrap_or(0)
    }

    /// Items consumed so far, in order.
    pub fn consumed(&self) -> &[(EntityId, ItemId)] {
        &self.consumed
    }

    pub fn set_fail_consume(&mut self, fail: bool) {
        self.fail_consume = fail;
    }
}

impl Inventory for SimInventory {
    fn has_item(&self, entity: &EntityId, item: &ItemId) -> bool {
        self.count(entity, item) > 0
    }

    fn consume_item(&mut self, entity: &EntityId, item: &ItemId) -> ActuatorResult<()> {
        if self.fail_consume {
            return Err(ActuatorError::ConsumeFailed {
                item: item.clone(),
                reason: "injected failure".to_owned(),
            });
        }
        let items = self.items.get_mut(entity);
        let position = items
            .as_ref()
            .and_then(|items| items.iter().position(|held| held == item));
        match (items, position) {
            (Some(items), Some(index)) => {
                items.remove(index);
                self.consumed.push((entity.clone(), item.clone()));
                Ok(())
            }
            _ => Err(ActuatorError::ConsumeFailed {
                item: item.clone(),
                reason: "item not held".to_owned(),
            }),
        }
    }
}

/// Notification sink that records everything it receives.
#[derive(Clone, Debug, Default)]
pub struct NotificationLog {
    entries: Vec<(EntityId, Notification)>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(EntityId, Notification)] {
        &self.entries
    }

    pub fn messages_for(&self, entity: &EntityId) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(target, _)| target == entity)
            .map(|(_, notification)| notification.message.as_str())
            .collect()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.last().map(|(_, notification)| notification)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl NotificationPort for NotificationLog {
    fn notify(&mut self, entity: &EntityId, notification: Notification) {
        self.entries.push((entity.clone(), notification));
    }
}

/// World, inventory and notification log bundled together.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHost {
    pub world: SimWorld,
    pub inventory: SimInventory,
    pub notifications: NotificationLog,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the three capabilities as a [`Host`].
    pub fn host(&mut self) -> Host<'_> {
        Host::new(&mut self.world, &mut self.inventory, &mut self.notifications)
    }
}
