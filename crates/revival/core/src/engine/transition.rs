//! Effect application and restoration protocol.
//!
//! Every entry path snapshots before it mutates, and every exit path restores
//! from the snapshots and then clears them. Snapshot presence on the record is
//! the only thing consulted to decide whether there is something to restore,
//! which is what makes double-apply and double-restore impossible.
//!
//! Host failures are logged and collected into an [`EffectChannels`] set; none
//! of them stops a transition from completing.

use std::time::Duration;

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::config::{RecoveryProfile, RevivalConfig};
use crate::error::ActuatorResult;
use crate::flash::FlashTask;
use crate::host::{EffectChannels, Host};
use crate::state::{
    BodyRegion, EntityId, EntityStatus, LifecycleState, Snapshot, Stance, Timestamp,
};

/// Collects failed channels for one transition.
struct EffectBatch<'e> {
    entity: &'e EntityId,
    failed: EffectChannels,
}

impl<'e> EffectBatch<'e> {
    fn new(entity: &'e EntityId) -> Self {
        Self {
            entity,
            failed: EffectChannels::empty(),
        }
    }

    fn check<T>(
        &mut self,
        channel: EffectChannels,
        what: &'static str,
        result: ActuatorResult<T>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(entity = %self.entity, ?channel, %error, "{what} failed");
                self.failed |= channel;
                None
            }
        }
    }

    fn capture<T>(
        &mut self,
        channel: EffectChannels,
        what: &'static str,
        result: ActuatorResult<T>,
    ) -> Snapshot<T> {
        match self.check(channel, what, result) {
            Some(value) => Snapshot::Taken(value),
            None => Snapshot::Missing,
        }
    }
}

/// Normal -> Critical.
pub(super) fn enter_critical(
    config: &RevivalConfig,
    host: &mut Host<'_>,
    entity: &EntityId,
    record: &mut EntityStatus,
) -> EffectChannels {
    debug_assert_eq!(record.state, LifecycleState::Normal);
    let mut batch = EffectBatch::new(entity);

    let suppression = host.actuator().suppress_targeting(entity);
    record.suppression = Some(batch.capture(
        EffectChannels::TARGETING,
        "targeting suppression",
        suppression,
    ));

    let speed = host.actuator().movement_speed(entity);
    record.original_movement_speed =
        Some(batch.capture(EffectChannels::MOVEMENT, "movement speed read", speed));

    clamp_movement(config, host, record, &mut batch);
    let stance = host.actuator().lock_stance(entity, Stance::Crouched);
    batch.check(EffectChannels::STANCE, "stance lock", stance);
    let tremor = host.actuator().apply_tremor(entity, config.critical_tremor);
    batch.check(EffectChannels::TREMOR, "critical tremor", tremor);

    record.state = LifecycleState::Critical;
    batch.failed
}

/// Critical -> Reviving. The critical-state snapshots are kept, so the exit
/// path restores the pre-critical originals.
pub(super) fn enter_reviving(
    config: &RevivalConfig,
    host: &mut Host<'_>,
    entity: &EntityId,
    record: &mut EntityStatus,
    now: Timestamp,
) -> EffectChannels {
    debug_assert_eq!(record.state, LifecycleState::Critical);
    let mut batch = EffectBatch::new(entity);

    record.state = LifecycleState::Reviving;
    record.invulnerability_remaining = config.invulnerability;
    record.last_revival = Some(now);

    assert_restraints_into(config, host, record, &mut batch);
    apply_recovery(&config.recovery, host, &mut batch);
    let tremor = host.actuator().apply_tremor(entity, config.revival_tremor);
    batch.check(EffectChannels::TREMOR, "revival tremor", tremor);

    let (flash, flash_failed) = FlashTask::start(&*host.actuator(), entity, config.flash_interval);
    batch.failed |= flash_failed;
    record.flash = Some(flash);

    batch.failed
}

/// Re-applies the movement clamp, stance lock and combat lock.
///
/// Idempotent; called every tick while reviving because the host may reset
/// these every frame.
pub(super) fn assert_restraints(
    config: &RevivalConfig,
    host: &mut Host<'_>,
    entity: &EntityId,
    record: &EntityStatus,
) -> EffectChannels {
    let mut batch = EffectBatch::new(entity);
    assert_restraints_into(config, host, record, &mut batch);
    batch.failed
}

fn assert_restraints_into(
    config: &RevivalConfig,
    host: &mut Host<'_>,
    record: &EntityStatus,
    batch: &mut EffectBatch<'_>,
) {
    let entity = batch.entity;
    clamp_movement(config, host, record, batch);
    let stance = host.actuator().lock_stance(entity, Stance::Crouched);
    batch.check(EffectChannels::STANCE, "stance lock", stance);
    let combat = host.actuator().set_combat_enabled(entity, false);
    batch.check(EffectChannels::COMBAT, "combat lock", combat);
}

fn clamp_movement(
    config: &RevivalConfig,
    host: &mut Host<'_>,
    record: &EntityStatus,
    batch: &mut EffectBatch<'_>,
) {
    let Some(Snapshot::Taken(original)) = record.original_movement_speed else {
        return;
    };
    let clamped = original * config.movement_clamp;
    let result = host.actuator().set_movement_speed(batch.entity, clamped);
    batch.check(EffectChannels::MOVEMENT, "movement clamp", result);
}

fn apply_recovery(profile: &RecoveryProfile, host: &mut Host<'_>, batch: &mut EffectBatch<'_>) {
    let entity = batch.entity;

    if profile.purge_negative_effects {
        for region in BodyRegion::iter() {
            let result = host.actuator().remove_negative_effects(entity, region);
            batch.check(EffectChannels::HEALTH, "negative effect purge", result);
        }
    }

    for region in BodyRegion::iter() {
        let amount = profile.heal.amount(region);
        if amount <= 0.0 {
            continue;
        }
        let result = host.actuator().apply_health_delta(entity, region, amount);
        batch.check(EffectChannels::HEALTH, "region heal", result);
    }

    let vitals = host
        .actuator()
        .restore_vitals(entity, profile.energy, profile.hydration);
    batch.check(EffectChannels::VITALS, "vitals restore", vitals);

    if profile.painkiller {
        let painkiller = host.actuator().apply_painkiller(entity);
        batch.check(EffectChannels::PAINKILLER, "painkiller", painkiller);
    }
}

/// Any state -> Normal.
///
/// Stops the flash task, restores whatever snapshots exist, clears them, and
/// releases the stance and combat locks. Safe on a record with nothing active.
pub(super) fn restore(
    host: &mut Host<'_>,
    entity: &EntityId,
    record: &mut EntityStatus,
) -> EffectChannels {
    let mut batch = EffectBatch::new(entity);
    let was = record.state;

    restore_render(host, record, &mut batch);

    if let Some(snapshot) = record.suppression.take() {
        match snapshot {
            Snapshot::Taken(original) => {
                let result = host.actuator().restore_targeting(entity, &original);
                batch.check(EffectChannels::TARGETING, "targeting restore", result);
            }
            Snapshot::Missing => debug!(entity = %entity, "no targeting snapshot to restore"),
        }
    }

    if let Some(snapshot) = record.original_movement_speed.take() {
        match snapshot {
            Snapshot::Taken(original) => {
                let result = host.actuator().set_movement_speed(entity, original);
                batch.check(EffectChannels::MOVEMENT, "movement restore", result);
            }
            Snapshot::Missing => debug!(entity = %entity, "no movement snapshot to restore"),
        }
    }

    if was.is_active() {
        let stance = host.actuator().release_stance(entity);
        batch.check(EffectChannels::STANCE, "stance release", stance);
    }
    if was == LifecycleState::Reviving {
        let combat = host.actuator().set_combat_enabled(entity, true);
        batch.check(EffectChannels::COMBAT, "combat unlock", combat);
    }

    record.state = LifecycleState::Normal;
    record.invulnerability_remaining = Duration::ZERO;
    batch.failed
}

/// Shows every element left hidden: first those a previous exit failed on,
/// then whatever the flash task still has hidden. Failures stay pending.
fn restore_render(host: &mut Host<'_>, record: &mut EntityStatus, batch: &mut EffectBatch<'_>) {
    let entity = batch.entity;

    let mut pending = std::mem::take(&mut record.pending_render);
    pending.retain(|&element| {
        let result = host.actuator().set_render_visible(entity, element, true);
        batch
            .check(EffectChannels::RENDER, "pending render restore", result)
            .is_none()
    });

    if let Some(mut flash) = record.flash.take() {
        flash.finish(host.actuator(), entity);
        for element in flash.hidden_elements() {
            if !pending.contains(&element) {
                pending.push(element);
            }
        }
    }

    if !pending.is_empty() {
        warn!(
            entity = %entity,
            hidden = pending.len(),
            "render elements left hidden; retried on the next forced exit"
        );
        batch.failed |= EffectChannels::RENDER;
    }
    record.pending_render = pending;
}
