//! Periodic visibility flashing while an entity is invulnerable.
//!
//! The task is cooperative: the owner calls [`FlashTask::step`] once per tick
//! with whether the reviving state still holds. It never runs on its own, so
//! "cancellation" means the next step sees `active == false` (or the owner
//! calls [`FlashTask::finish`] directly) and performs the restoration. At most
//! one toggle can land after the state has already changed.
//!
//! Whatever the number of elapsed cycles, finishing explicitly sets every
//! captured render element back to visible.

use std::time::Duration;

use tracing::{debug, warn};

use crate::host::{EffectActuator, EffectChannels};
use crate::state::{EntityId, RenderElementId};

/// Tracked visibility of one render element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashElement {
    pub id: RenderElementId,
    /// Visibility observed before the first toggle.
    pub original_visible: bool,
    /// Visibility the task last applied successfully.
    pub visible: bool,
}

/// Result of advancing the task by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashStep {
    Running { toggled: bool },
    Finished { restored: usize },
}

/// Repeating, cancellable visibility toggle bound to one reviving episode.
#[derive(Clone, Debug)]
pub struct FlashTask {
    interval: Duration,
    elapsed: Duration,
    next_toggle: Duration,
    elements: Vec<FlashElement>,
    toggles: u64,
    finished: bool,
}

impl FlashTask {
    /// Captures the original visibility of every render element.
    ///
    /// Capture failures degrade to an empty or assumed-visible element set;
    /// the returned channels are non-empty in that case.
    pub fn start(
        actuator: &dyn EffectActuator,
        entity: &EntityId,
        interval: Duration,
    ) -> (Self, EffectChannels) {
        let mut failed = EffectChannels::empty();

        let ids = match actuator.render_elements(entity) {
            Ok(ids) => ids,
            Err(error) => {
                warn!(
                    entity = %entity,
                    %error,
                    "could not list render elements; flashing disabled"
                );
                failed |= EffectChannels::RENDER;
                Vec::new()
            }
        };

        let elements = ids
            .into_iter()
            .map(|id| {
                let original_visible = match actuator.is_render_visible(entity, id) {
                    Ok(visible) => visible,
                    Err(error) => {
                        warn!(
                            entity = %entity,
                            element = id.0,
                            %error,
                            "visibility unreadable; assuming visible"
                        );
                        failed |= EffectChannels::RENDER;
                        true
                    }
                };
                FlashElement {
                    id,
                    original_visible,
                    visible: original_visible,
                }
            })
            .collect();

        let task = Self {
            interval,
            elapsed: Duration::ZERO,
            next_toggle: Duration::ZERO,
            elements,
            toggles: 0,
            finished: false,
        };
        (task, failed)
    }

    /// Advances the task by `dt`.
    ///
    /// When `active` is false the task finishes instead of toggling. The first
    /// toggle happens on the first active step; subsequent toggles every
    /// `interval`. Several intervals inside one `dt` collapse to their parity.
    pub fn step(
        &mut self,
        actuator: &mut dyn EffectActuator,
        entity: &EntityId,
        dt: Duration,
        active: bool,
    ) -> FlashStep {
        if self.finished {
            return FlashStep::Finished { restored: 0 };
        }
        if !active {
            let restored = self.finish(actuator, entity);
            return FlashStep::Finished { restored };
        }

        self.elapsed += dt;
        if self.elapsed < self.next_toggle {
            return FlashStep::Running { toggled: false };
        }

        let interval = self.interval.as_nanos().max(1);
        let due = (self.elapsed - self.next_toggle).as_nanos() / interval + 1;
        let advance = u64::try_from(interval.saturating_mul(due)).unwrap_or(u64::MAX);
        self.next_toggle = self.next_toggle.saturating_add(Duration::from_nanos(advance));
        self.toggles = self.toggles.saturating_add(u64::try_from(due).unwrap_or(u64::MAX));

        let toggled = due % 2 == 1;
        if toggled {
            self.toggle_all(actuator, entity);
        }
        FlashStep::Running { toggled }
    }

    /// Restores every element to visible and stops the task.
    ///
    /// Idempotent; returns how many elements were restored by this call.
    /// Elements whose restore failed stay listed by
    /// [`hidden_elements`](Self::hidden_elements).
    pub fn finish(&mut self, actuator: &mut dyn EffectActuator, entity: &EntityId) -> usize {
        if self.finished {
            return 0;
        }
        self.finished = true;

        let mut restored = 0;
        for element in &mut self.elements {
            match actuator.set_render_visible(entity, element.id, true) {
                Ok(()) => {
                    element.visible = true;
                    restored += 1;
                }
                Err(error) => {
                    warn!(
                        entity = %entity,
                        element = element.id.0,
                        %error,
                        "failed to restore render element"
                    );
                }
            }
            if !element.original_visible {
                debug!(
                    entity = %entity,
                    element = element.id.0,
                    "element was hidden before flashing; left visible"
                );
            }
        }
        debug!(entity = %entity, restored, toggles = self.toggles, "flash task finished");
        restored
    }

    fn toggle_all(&mut self, actuator: &mut dyn EffectActuator, entity: &EntityId) {
        for element in &mut self.elements {
            let target = !element.visible;
            match actuator.set_render_visible(entity, element.id, target) {
                Ok(()) => element.visible = target,
                Err(error) => {
                    warn!(
                        entity = %entity,
                        element = element.id.0,
                        %error,
                        "render toggle skipped"
                    );
                }
            }
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elements(&self) -> &[FlashElement] {
        &self.elements
    }

    pub fn all_visible(&self) -> bool {
        self.elements.iter().all(|element| element.visible)
    }

    /// Elements last left hidden by this task.
    pub fn hidden_elements(&self) -> impl Iterator<Item = RenderElementId> + '_ {
        self.elements
            .iter()
            .filter(|element| !element.visible)
            .map(|element| element.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::SimWorld;

    const INTERVAL: Duration = Duration::from_millis(500);

    fn setup() -> (SimWorld, EntityId) {
        let mut world = SimWorld::new();
        let entity = EntityId::from("pmc");
        world.spawn(entity.clone());
        (world, entity)
    }

    #[test]
    fn first_active_step_toggles_immediately() {
        let (mut world, entity) = setup();
        let (mut task, failed) = FlashTask::start(&world, &entity, INTERVAL);
        assert!(failed.is_empty());
        assert!(task.elements().iter().all(|e| e.original_visible));

        let step = task.step(&mut world, &entity, Duration::from_millis(16), true);

        assert_eq!(step, FlashStep::Running { toggled: true });
        assert!(world.body(&entity).unwrap().render.values().all(|v| !v));
    }

    #[test]
    fn toggles_follow_interval() {
        let (mut world, entity) = setup();
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);

        task.step(&mut world, &entity, Duration::from_millis(100), true);
        let quiet = task.step(&mut world, &entity, Duration::from_millis(300), true);
        let due = task.step(&mut world, &entity, Duration::from_millis(100), true);

        assert_eq!(quiet, FlashStep::Running { toggled: false });
        assert_eq!(due, FlashStep::Running { toggled: true });
        assert_eq!(task.toggles(), 2);
        assert!(task.all_visible());
    }

    #[test]
    fn long_step_collapses_to_parity() {
        let (mut world, entity) = setup();
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);

        // Toggles due at 0.0, 0.5, 1.0 -> three flips, net hidden.
        let step = task.step(&mut world, &entity, Duration::from_millis(1_200), true);

        assert_eq!(step, FlashStep::Running { toggled: true });
        assert_eq!(task.toggles(), 3);
        assert!(!task.all_visible());
    }

    #[test]
    fn inactive_step_restores_every_element() {
        let (mut world, entity) = setup();
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);
        task.step(&mut world, &entity, Duration::from_millis(10), true);
        assert!(!task.all_visible());

        let step = task.step(&mut world, &entity, Duration::from_millis(10), false);

        let element_count = task.elements().len();
        assert_eq!(step, FlashStep::Finished { restored: element_count });
        assert!(world.body(&entity).unwrap().render.values().all(|v| *v));
        assert!(task.is_finished());
    }

    #[test]
    fn finish_is_idempotent() {
        let (mut world, entity) = setup();
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);

        assert_eq!(task.finish(&mut world, &entity), task.elements().len());
        assert_eq!(task.finish(&mut world, &entity), 0);
        assert_eq!(
            task.step(&mut world, &entity, INTERVAL, true),
            FlashStep::Finished { restored: 0 }
        );
    }

    #[test]
    fn originally_hidden_element_is_restored_visible() {
        let (mut world, entity) = setup();
        world
            .body_mut(&entity)
            .unwrap()
            .render
            .insert(RenderElementId(7), false);
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);

        task.step(&mut world, &entity, Duration::from_millis(10), true);
        task.finish(&mut world, &entity);

        assert!(world.body(&entity).unwrap().render[&RenderElementId(7)]);
    }

    #[test]
    fn failed_restore_leaves_element_listed_as_hidden() {
        let (mut world, entity) = setup();
        let (mut task, _) = FlashTask::start(&world, &entity, INTERVAL);
        task.step(&mut world, &entity, Duration::from_millis(10), true);
        world.fail_channels(EffectChannels::RENDER);

        let restored = task.finish(&mut world, &entity);

        assert_eq!(restored, 0);
        assert!(task.is_finished());
        assert_eq!(task.hidden_elements().count(), task.elements().len());
    }

    #[test]
    fn missing_entity_yields_empty_task() {
        let world = SimWorld::new();
        let ghost = EntityId::from("ghost");

        let (task, failed) = FlashTask::start(&world, &ghost, INTERVAL);

        assert!(failed.contains(EffectChannels::RENDER));
        assert!(task.elements().is_empty());
    }
}
