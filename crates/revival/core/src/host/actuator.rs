use std::time::Duration;

use crate::error::ActuatorResult;
use crate::state::{BodyRegion, EntityId, RenderElementId, Stance, SuppressionSnapshot};

/// Effect capabilities the host implements on its own entity model.
///
/// Every call is synchronous and either succeeds or reports an
/// [`ActuatorError`](crate::error::ActuatorError). The controller never
/// retries; it logs the failure and carries on with the transition.
pub trait EffectActuator: Send {
    // ===== health =====

    fn apply_health_delta(
        &mut self,
        entity: &EntityId,
        region: BodyRegion,
        amount: f32,
    ) -> ActuatorResult<()>;

    /// Clears bleeds, fractures and similar negative effects on a region.
    fn remove_negative_effects(&mut self, entity: &EntityId, region: BodyRegion)
    -> ActuatorResult<()>;

    fn restore_vitals(&mut self, entity: &EntityId, energy: f32, hydration: f32)
    -> ActuatorResult<()>;

    fn apply_painkiller(&mut self, entity: &EntityId) -> ActuatorResult<()>;

    /// Applies the tremor/stun debuff for the given duration.
    fn apply_tremor(&mut self, entity: &EntityId, duration: Duration) -> ActuatorResult<()>;

    // ===== movement and stance =====

    fn movement_speed(&self, entity: &EntityId) -> ActuatorResult<f32>;

    fn set_movement_speed(&mut self, entity: &EntityId, value: f32) -> ActuatorResult<()>;

    /// Forces the entity into `stance` until [`release_stance`](Self::release_stance).
    fn lock_stance(&mut self, entity: &EntityId, stance: Stance) -> ActuatorResult<()>;

    fn release_stance(&mut self, entity: &EntityId) -> ActuatorResult<()>;

    /// Enables or disables aiming and firing.
    fn set_combat_enabled(&mut self, entity: &EntityId, enabled: bool) -> ActuatorResult<()>;

    // ===== targeting =====

    /// Removes the entity from opposing detection and returns the prior values.
    fn suppress_targeting(&mut self, entity: &EntityId) -> ActuatorResult<SuppressionSnapshot>;

    fn restore_targeting(
        &mut self,
        entity: &EntityId,
        snapshot: &SuppressionSnapshot,
    ) -> ActuatorResult<()>;

    // ===== rendering =====

    fn render_elements(&self, entity: &EntityId) -> ActuatorResult<Vec<RenderElementId>>;

    fn is_render_visible(&self, entity: &EntityId, element: RenderElementId)
    -> ActuatorResult<bool>;

    fn set_render_visible(
        &mut self,
        entity: &EntityId,
        element: RenderElementId,
        visible: bool,
    ) -> ActuatorResult<()>;
}
