//! Critical/revival lifecycle controller.
//!
//! [`RevivalController`] owns one [`EntityStatus`] per tracked entity and is
//! the only code that moves an entity between states:
//!
//! ```text
//! Normal --declare_critical--> Critical --try_revive--> Reviving --on_tick(expiry)--> Normal
//!                                 |                         |
//!                                 +---cancel_critical-------+--force_normal--> Normal
//! ```
//!
//! The controller takes `&mut self` for every transition. It has no interior
//! locking: callers must give it a single owner (the runtime worker task does
//! this) or wrap it in their own mutex.

mod messages;
mod report;
mod transition;

pub use report::{RevivalSuccess, TickInput, TickOutcome, TransitionKind, TransitionReport};

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RevivalConfig;
use crate::cooldown;
use crate::error::RevivalError;
use crate::flash::FlashStep;
use crate::host::{EffectChannels, Host};
use crate::state::{EntityId, EntityStatus, LifecycleState, Timestamp};

/// Entity-keyed lifecycle store and state machine.
#[derive(Debug, Default)]
pub struct RevivalController {
    config: RevivalConfig,
    records: HashMap<EntityId, EntityStatus>,
    local_participant: Option<EntityId>,
}

impl RevivalController {
    pub fn new(config: RevivalConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
            local_participant: None,
        }
    }

    pub fn config(&self) -> &RevivalConfig {
        &self.config
    }

    /// Sets the entity controlled on this machine. Some notifications are
    /// only shown to it.
    pub fn set_local_participant(&mut self, entity: Option<EntityId>) {
        self.local_participant = entity;
    }

    pub fn local_participant(&self) -> Option<&EntityId> {
        self.local_participant.as_ref()
    }

    pub fn is_local(&self, entity: &EntityId) -> bool {
        self.local_participant.as_ref() == Some(entity)
    }

    pub fn status(&self, entity: &EntityId) -> Option<&EntityStatus> {
        self.records.get(entity)
    }

    /// Current state; untracked entities are `Normal`.
    pub fn state_of(&self, entity: &EntityId) -> LifecycleState {
        self.records
            .get(entity)
            .map(EntityStatus::state)
            .unwrap_or_default()
    }

    /// True while the entity is inside its invulnerability window.
    pub fn is_invulnerable(&self, entity: &EntityId) -> bool {
        self.state_of(entity) == LifecycleState::Reviving
    }

    pub fn tracked_entities(&self) -> impl Iterator<Item = &EntityId> {
        self.records.keys()
    }

    pub fn remaining_cooldown(&self, entity: &EntityId, now: Timestamp) -> Duration {
        let last = self.records.get(entity).and_then(EntityStatus::last_revival);
        cooldown::remaining_cooldown(last, now, self.config.cooldown)
    }

    /// Normal -> Critical. No-op if the entity is already critical or reviving.
    pub fn declare_critical(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
    ) -> Option<TransitionReport> {
        let record = self.records.entry(entity.clone()).or_default();
        if record.state.is_active() {
            debug!(entity = %entity, state = %record.state, "critical already declared");
            return None;
        }

        let failed = transition::enter_critical(&self.config, host, entity, record);
        info!(entity = %entity, ?failed, "entered critical state");

        if self.is_local(entity) {
            host.notifier()
                .notify(entity, messages::critical(&self.config));
        }

        Some(TransitionReport {
            entity: entity.clone(),
            kind: TransitionKind::EnterCritical,
            from: LifecycleState::Normal,
            to: LifecycleState::Critical,
            failed,
        })
    }

    /// Critical -> Normal without a revival. No-op in any other state.
    pub fn cancel_critical(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
    ) -> Option<TransitionReport> {
        let record = self.records.get_mut(entity)?;
        if record.state != LifecycleState::Critical {
            debug!(entity = %entity, state = %record.state, "cancel ignored; not critical");
            return None;
        }

        let failed = transition::restore(host, entity, record);
        info!(entity = %entity, ?failed, "critical state cancelled");

        Some(TransitionReport {
            entity: entity.clone(),
            kind: TransitionKind::CancelCritical,
            from: LifecycleState::Critical,
            to: LifecycleState::Normal,
            failed,
        })
    }

    /// Attempts Critical -> Reviving.
    ///
    /// The cooldown and item gates are evaluated before anything is mutated;
    /// a rejected attempt never consumes the item. With
    /// [`bypass_requirements`](RevivalConfig::bypass_requirements) set both
    /// gates are skipped and nothing is consumed.
    ///
    /// # Errors
    ///
    /// - [`RevivalError::InvalidState`] unless the entity is critical
    /// - [`RevivalError::OnCooldown`] inside the cooldown window
    /// - [`RevivalError::MissingItem`] without the required item
    pub fn try_revive(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
        has_required_item: bool,
        now: Timestamp,
    ) -> Result<RevivalSuccess, RevivalError> {
        let state = self.state_of(entity);
        if state != LifecycleState::Critical {
            return Err(RevivalError::InvalidState {
                entity: entity.clone(),
                state,
            });
        }

        let bypass = self.config.bypass_requirements;
        let remaining = self.remaining_cooldown(entity, now);
        if !remaining.is_zero() {
            if !bypass {
                info!(
                    entity = %entity,
                    remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                    "revival rejected: cooldown"
                );
                host.notifier().notify(entity, messages::on_cooldown(remaining));
                return Err(RevivalError::OnCooldown { remaining });
            }
            warn!(entity = %entity, "cooldown bypassed by configuration");
        }

        if !has_required_item && !bypass {
            info!(
                entity = %entity,
                item = %self.config.required_item,
                "revival rejected: missing item"
            );
            host.notifier()
                .notify(entity, messages::missing_item(&self.config));
            return Err(RevivalError::MissingItem {
                item: self.config.required_item.clone(),
            });
        }

        let mut failed = EffectChannels::empty();
        let item_consumed = if has_required_item && !bypass {
            match host
                .inventory()
                .consume_item(entity, &self.config.required_item)
            {
                Ok(()) => true,
                Err(error) => {
                    warn!(entity = %entity, %error, "revival item not consumed");
                    failed |= EffectChannels::INVENTORY;
                    false
                }
            }
        } else {
            false
        };

        let Some(record) = self.records.get_mut(entity) else {
            // state_of reported Critical, so the record exists.
            return Err(RevivalError::InvalidState {
                entity: entity.clone(),
                state: LifecycleState::Normal,
            });
        };
        failed |= transition::enter_reviving(&self.config, host, entity, record, now);

        host.notifier().notify(entity, messages::revived(&self.config));
        info!(
            entity = %entity,
            item_consumed,
            ?failed,
            invulnerable_secs = self.config.invulnerability.as_secs_f32(),
            "revival performed"
        );

        Ok(RevivalSuccess {
            report: TransitionReport {
                entity: entity.clone(),
                kind: TransitionKind::Revive,
                from: LifecycleState::Critical,
                to: LifecycleState::Reviving,
                failed,
            },
            item_consumed,
            revived_at: now,
            invulnerable_for: self.config.invulnerability,
        })
    }

    /// Advances one entity by one simulation step.
    ///
    /// While reviving: counts the invulnerability window down, re-asserts the
    /// restraints, and drives the flash task; when the window reaches zero the
    /// flash task is stepped inactive and the entity returns to `Normal`.
    /// While critical: a revival key press triggers
    /// [`try_revive`](Self::try_revive) with the inventory's answer.
    pub fn on_tick(
        &mut self,
        host: &mut Host<'_>,
        input: &TickInput,
        now: Timestamp,
    ) -> TickOutcome {
        let entity = &input.entity;
        let mut outcome = TickOutcome::default();

        match self.state_of(entity) {
            LifecycleState::Reviving => {
                let Some(record) = self.records.get_mut(entity) else {
                    return outcome;
                };
                record.invulnerability_remaining = record
                    .invulnerability_remaining
                    .saturating_sub(input.elapsed);

                let still_reviving = !record.invulnerability_remaining.is_zero();

                if still_reviving {
                    outcome.reassert_failed =
                        transition::assert_restraints(&self.config, host, entity, record);
                }
                if let Some(flash) = record.flash.as_mut()
                    && let FlashStep::Finished { restored } =
                        flash.step(host.actuator(), entity, input.elapsed, still_reviving)
                {
                    debug!(entity = %entity, restored, "flash task finished");
                }
                if !still_reviving {
                    outcome.expired = Some(self.end_invulnerability(host, entity));
                }
            }
            LifecycleState::Critical if input.revival_key_pressed => {
                let has_item = host
                    .inventory()
                    .has_item(entity, &self.config.required_item);
                outcome.revival = Some(self.try_revive(host, entity, has_item, now));
            }
            _ => {}
        }

        outcome
    }

    /// Returns the entity to `Normal` from any state, restoring whatever is
    /// active and retrying render elements a previous exit left hidden.
    /// `None` if there was nothing to undo.
    pub fn force_normal(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
    ) -> Option<TransitionReport> {
        let record = self.records.get_mut(entity)?;
        let from = record.state;
        if !from.is_active()
            && !record.has_snapshots()
            && record.flash.is_none()
            && record.pending_render.is_empty()
        {
            return None;
        }

        let failed = transition::restore(host, entity, record);
        info!(entity = %entity, %from, ?failed, "forced back to normal");

        Some(TransitionReport {
            entity: entity.clone(),
            kind: TransitionKind::ForceNormal,
            from,
            to: LifecycleState::Normal,
            failed,
        })
    }

    /// Cleans up and forgets an entity that was destroyed or left the session.
    pub fn remove_entity(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
    ) -> Option<EntityStatus> {
        self.force_normal(host, entity);
        if self.local_participant.as_ref() == Some(entity) {
            self.local_participant = None;
        }
        let removed = self.records.remove(entity);
        if removed.is_some() {
            debug!(entity = %entity, "lifecycle record removed");
        }
        removed
    }

    fn end_invulnerability(
        &mut self,
        host: &mut Host<'_>,
        entity: &EntityId,
    ) -> TransitionReport {
        let failed = match self.records.get_mut(entity) {
            Some(record) => transition::restore(host, entity, record),
            None => EffectChannels::empty(),
        };

        if self.is_local(entity) {
            host.notifier()
                .notify(entity, messages::invulnerability_ended());
        }
        info!(entity = %entity, ?failed, "invulnerability ended");

        TransitionReport {
            entity: entity.clone(),
            kind: TransitionKind::InvulnerabilityEnded,
            from: LifecycleState::Reviving,
            to: LifecycleState::Normal,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RecoveryProfile;
    use crate::host::memory::{InMemoryHost, SUPPRESSED_LOCOMOTION, SimBody};
    use crate::state::{BodyRegion, ItemId, Snapshot, Stance};

    const FRAME: Duration = Duration::from_millis(100);

    struct Fixture {
        host: InMemoryHost,
        controller: RevivalController,
        entity: EntityId,
        item: ItemId,
        clock: Timestamp,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(RevivalConfig::default())
        }

        fn with_config(config: RevivalConfig) -> Self {
            let entity = EntityId::from("pmc-1");
            let item = config.required_item.clone();
            let mut host = InMemoryHost::new();
            host.world.spawn(entity.clone());
            let mut controller = RevivalController::new(config);
            controller.set_local_participant(Some(entity.clone()));
            Self {
                host,
                controller,
                entity,
                item,
                clock: Timestamp::from_secs(1_000),
            }
        }

        fn give_item(&mut self, count: usize) {
            self.host.inventory.give(&self.entity, &self.item, count);
        }

        fn body(&self) -> &SimBody {
            self.host.world.body(&self.entity).unwrap()
        }

        fn declare(&mut self) -> Option<TransitionReport> {
            let mut host = self.host.host();
            self.controller.declare_critical(&mut host, &self.entity)
        }

        fn revive(&mut self, has_item: bool) -> Result<RevivalSuccess, RevivalError> {
            let mut host = self.host.host();
            self.controller
                .try_revive(&mut host, &self.entity, has_item, self.clock)
        }

        fn tick(&mut self, elapsed: Duration, key: bool) -> TickOutcome {
            self.clock = self.clock + elapsed;
            let input = TickInput::new(self.entity.clone(), elapsed).with_revival_key(key);
            let mut host = self.host.host();
            self.controller.on_tick(&mut host, &input, self.clock)
        }

        fn tick_until_normal(&mut self) -> Vec<TickOutcome> {
            let mut outcomes = Vec::new();
            for _ in 0..1_000 {
                let outcome = self.tick(FRAME, false);
                let done = outcome.expired.is_some();
                outcomes.push(outcome);
                if done {
                    break;
                }
            }
            outcomes
        }

        fn force(&mut self) -> Option<TransitionReport> {
            let mut host = self.host.host();
            self.controller.force_normal(&mut host, &self.entity)
        }

        fn cancel(&mut self) -> Option<TransitionReport> {
            let mut host = self.host.host();
            self.controller.cancel_critical(&mut host, &self.entity)
        }

        fn state(&self) -> LifecycleState {
            self.controller.state_of(&self.entity)
        }

        fn assert_consistent(&self) {
            if let Some(record) = self.controller.status(&self.entity) {
                assert!(record.is_consistent(), "inconsistent record: {record:?}");
            }
        }
    }

    // ============================================================================
    // Entering critical
    // ============================================================================

    #[test]
    fn declare_critical_snapshots_then_applies_effects() {
        let mut fx = Fixture::new();

        let report = fx.declare().expect("transition");

        assert_eq!(report.kind, TransitionKind::EnterCritical);
        assert!(report.is_clean());
        assert_eq!(fx.state(), LifecycleState::Critical);

        let record = fx.controller.status(&fx.entity).unwrap();
        assert_eq!(
            record.original_movement_speed(),
            Some(&Snapshot::Taken(SimBody::DEFAULT_SPEED))
        );
        let suppression = record.suppression().unwrap().taken().unwrap();
        assert_eq!(suppression.awareness, 1.0);
        assert_eq!(suppression.locomotion, 1);

        let body = fx.body();
        assert_eq!(body.awareness, 0.0);
        assert_eq!(body.locomotion, SUPPRESSED_LOCOMOTION);
        assert!((body.movement_speed - SimBody::DEFAULT_SPEED * 0.1).abs() < 1e-6);
        assert_eq!(body.stance_lock, Some(Stance::Crouched));
        assert_eq!(body.tremors, vec![RevivalConfig::DEFAULT_CRITICAL_TREMOR]);
        fx.assert_consistent();
    }

    #[test]
    fn declare_critical_is_idempotent() {
        let mut fx = Fixture::new();
        fx.declare();

        assert!(fx.declare().is_none());

        // Snapshot still holds the real original, not the clamped value.
        let record = fx.controller.status(&fx.entity).unwrap();
        assert_eq!(
            record.original_movement_speed(),
            Some(&Snapshot::Taken(SimBody::DEFAULT_SPEED))
        );
        assert_eq!(fx.body().tremors.len(), 1);
    }

    #[test]
    fn critical_notice_only_for_local_participant() {
        let mut fx = Fixture::new();
        let remote = EntityId::from("remote");
        fx.host.world.spawn(remote.clone());

        fx.declare();
        {
            let mut host = fx.host.host();
            fx.controller.declare_critical(&mut host, &remote);
        }

        assert_eq!(
            fx.host.notifications.messages_for(&fx.entity),
            vec!["CRITICAL CONDITION! Press F5 to use your defibrillator!"]
        );
        assert!(fx.host.notifications.messages_for(&remote).is_empty());
    }

    // ============================================================================
    // Revival gates
    // ============================================================================

    #[test]
    fn scenario_a_missing_item_keeps_critical() {
        let mut fx = Fixture::new();
        fx.declare();

        let result = fx.revive(false);

        assert_eq!(
            result,
            Err(RevivalError::MissingItem {
                item: fx.item.clone()
            })
        );
        assert_eq!(fx.state(), LifecycleState::Critical);
        assert!(fx.host.inventory.consumed().is_empty());
        assert_eq!(
            fx.host.notifications.last().unwrap().message,
            "No defibrillator found! Unable to revive!"
        );
        fx.assert_consistent();
    }

    #[test]
    fn scenario_b_revival_then_expiry_returns_to_normal() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();

        let success = fx.revive(true).expect("revival");

        assert!(success.item_consumed);
        assert_eq!(success.report.to, LifecycleState::Reviving);
        assert_eq!(fx.state(), LifecycleState::Reviving);
        assert!(fx.controller.is_invulnerable(&fx.entity));
        assert_eq!(fx.host.inventory.count(&fx.entity, &fx.item), 0);
        fx.assert_consistent();

        let outcomes = fx.tick_until_normal();

        // 10s window at 100ms frames.
        assert_eq!(outcomes.len(), 100);
        let expired = outcomes.last().unwrap().expired.as_ref().unwrap();
        assert_eq!(expired.kind, TransitionKind::InvulnerabilityEnded);
        assert_eq!(fx.state(), LifecycleState::Normal);

        let record = fx.controller.status(&fx.entity).unwrap();
        assert!(!record.has_snapshots());
        assert!(record.flash().is_none());
        assert!(record.last_revival().is_some());
        fx.assert_consistent();
    }

    #[test]
    fn scenario_c_second_revival_is_on_cooldown() {
        let mut fx = Fixture::new();
        fx.give_item(2);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick_until_normal();

        fx.declare();
        let with_item = fx.revive(true);
        let without_item = fx.revive(false);

        match with_item {
            Err(RevivalError::OnCooldown { remaining }) => {
                assert!(remaining > Duration::ZERO);
                assert!(remaining < RevivalConfig::DEFAULT_COOLDOWN);
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert!(matches!(without_item, Err(RevivalError::OnCooldown { .. })));
        assert_eq!(fx.host.inventory.count(&fx.entity, &fx.item), 1);
        assert_eq!(fx.state(), LifecycleState::Critical);
        assert!(
            fx.host
                .notifications
                .last()
                .unwrap()
                .message
                .starts_with("Revival on cooldown! Available in")
        );
    }

    #[test]
    fn revival_allowed_again_after_cooldown() {
        let mut fx = Fixture::new();
        fx.give_item(2);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick_until_normal();

        fx.clock = fx.clock + RevivalConfig::DEFAULT_COOLDOWN;
        fx.declare();

        assert!(fx.revive(true).is_ok());
        assert_eq!(fx.host.inventory.consumed().len(), 2);
    }

    #[test]
    fn revive_from_normal_is_invalid_state() {
        let mut fx = Fixture::new();

        let result = fx.revive(true);

        assert_eq!(
            result,
            Err(RevivalError::InvalidState {
                entity: fx.entity.clone(),
                state: LifecycleState::Normal,
            })
        );
        assert!(fx.host.notifications.entries().is_empty());
    }

    #[test]
    fn revive_while_reviving_is_invalid_state() {
        let mut fx = Fixture::new();
        fx.give_item(2);
        fx.declare();
        fx.revive(true).unwrap();

        assert!(matches!(
            fx.revive(true),
            Err(RevivalError::InvalidState {
                state: LifecycleState::Reviving,
                ..
            })
        ));
        assert_eq!(fx.host.inventory.count(&fx.entity, &fx.item), 1);
    }

    #[test]
    fn bypass_skips_item_and_cooldown_without_consuming() {
        let mut fx = Fixture::with_config(RevivalConfig::default().with_bypass(true));
        fx.give_item(1);
        fx.declare();
        let first = fx.revive(false).expect("bypass revival");
        fx.tick_until_normal();
        fx.declare();

        let second = fx.revive(true).expect("cooldown bypassed");

        assert!(!first.item_consumed);
        assert!(!second.item_consumed);
        assert_eq!(fx.host.inventory.count(&fx.entity, &fx.item), 1);
    }

    #[test]
    fn failed_consumption_does_not_block_revival() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.host.inventory.set_fail_consume(true);
        fx.declare();

        let success = fx.revive(true).expect("revival");

        assert!(!success.item_consumed);
        assert!(success.report.failed.contains(EffectChannels::INVENTORY));
        assert_eq!(fx.state(), LifecycleState::Reviving);
    }

    // ============================================================================
    // Revival effects and ticking
    // ============================================================================

    #[test]
    fn revival_applies_partial_recovery() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();

        fx.revive(true).unwrap();

        let body = fx.body();
        let profile = RecoveryProfile::partial();
        assert_eq!(
            body.health[&BodyRegion::Head],
            SimBody::DEFAULT_REGION_HEALTH + profile.heal.head
        );
        assert_eq!(
            body.health[&BodyRegion::LeftLeg],
            SimBody::DEFAULT_REGION_HEALTH + profile.heal.legs
        );
        assert!(body.negative_effects.is_empty());
        assert_eq!(body.energy, 5.0 + profile.energy);
        assert_eq!(body.painkillers, 1);
        assert_eq!(
            body.tremors,
            vec![
                RevivalConfig::DEFAULT_CRITICAL_TREMOR,
                RevivalConfig::DEFAULT_REVIVAL_TREMOR
            ]
        );
        assert!(!body.combat_enabled);
        assert_eq!(body.stance_lock, Some(Stance::Crouched));
    }

    #[test]
    fn legacy_profile_heals_more() {
        let config = RevivalConfig::default().with_recovery(RecoveryProfile::legacy_full());
        let mut fx = Fixture::with_config(config);
        fx.give_item(1);
        fx.declare();

        fx.revive(true).unwrap();

        assert_eq!(
            fx.body().health[&BodyRegion::Chest],
            SimBody::DEFAULT_REGION_HEALTH + 100.0
        );
    }

    #[test]
    fn ticks_reassert_restraints_overridden_by_host() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        // Host resets movement and re-enables combat behind our back.
        {
            let body = fx.host.world.body_mut(&fx.entity).unwrap();
            body.movement_speed = 9.0;
            body.combat_enabled = true;
            body.stance_lock = None;
        }
        let outcome = fx.tick(FRAME, false);

        assert!(outcome.is_quiet());
        let body = fx.body();
        assert!((body.movement_speed - SimBody::DEFAULT_SPEED * 0.1).abs() < 1e-6);
        assert!(!body.combat_enabled);
        assert_eq!(body.stance_lock, Some(Stance::Crouched));
    }

    #[test]
    fn key_press_while_critical_revives_with_inventory_answer() {
        let mut fx = Fixture::new();
        fx.declare();

        let missing = fx.tick(FRAME, true);
        fx.give_item(1);
        let revived = fx.tick(FRAME, true);

        assert!(matches!(
            missing.revival,
            Some(Err(RevivalError::MissingItem { .. }))
        ));
        assert!(matches!(revived.revival, Some(Ok(_))));
        assert_eq!(fx.state(), LifecycleState::Reviving);
    }

    #[test]
    fn key_press_outside_critical_is_ignored() {
        let mut fx = Fixture::new();
        fx.give_item(1);

        let outcome = fx.tick(FRAME, true);

        assert!(outcome.revival.is_none());
        assert_eq!(fx.host.inventory.count(&fx.entity, &fx.item), 1);
    }

    #[test]
    fn expiry_restores_pre_critical_originals() {
        let mut fx = Fixture::new();
        fx.host
            .world
            .spawn_with(fx.entity.clone(), SimBody::new().with_movement_speed(6.25));
        let before = fx.body().clone();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        fx.tick_until_normal();

        let after = fx.body();
        assert_eq!(after.movement_speed, before.movement_speed);
        assert_eq!(after.awareness, before.awareness);
        assert_eq!(after.locomotion, before.locomotion);
        assert_eq!(after.render, before.render);
        assert_eq!(after.stance_lock, None);
        assert!(after.combat_enabled);
        assert_eq!(
            fx.host.notifications.last().unwrap().message,
            "Temporary invulnerability has ended."
        );
    }

    #[test]
    fn single_large_tick_expires_window() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        let outcome = fx.tick(Duration::from_secs(60), false);

        assert!(outcome.expired.is_some());
        assert_eq!(fx.state(), LifecycleState::Normal);
        assert!(fx.body().all_visible());
    }

    #[test]
    fn invulnerability_counts_down() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        fx.tick(Duration::from_secs(3), false);

        let record = fx.controller.status(&fx.entity).unwrap();
        assert_eq!(
            record.invulnerability_remaining(),
            Some(Duration::from_secs(7))
        );
    }

    // ============================================================================
    // Exits
    // ============================================================================

    #[test]
    fn scenario_d_force_normal_mid_reviving_restores_originals() {
        let mut fx = Fixture::new();
        let before = fx.body().clone();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();
        // Leave the flash mid-cycle with elements hidden.
        fx.tick(FRAME, false);
        assert!(!fx.body().all_visible());

        let report = fx.force().expect("forced exit");

        assert_eq!(report.from, LifecycleState::Reviving);
        assert_eq!(fx.state(), LifecycleState::Normal);
        let after = fx.body();
        assert_eq!(after.movement_speed, before.movement_speed);
        assert_eq!(after.awareness, before.awareness);
        assert!(after.all_visible());
        assert!(after.combat_enabled);
        fx.assert_consistent();
    }

    #[test]
    fn scenario_e_cancel_on_normal_is_noop() {
        let mut fx = Fixture::new();
        let before = fx.body().clone();

        assert!(fx.cancel().is_none());
        assert_eq!(fx.body(), &before);
        assert!(fx.controller.status(&fx.entity).is_none());

        fx.declare();
        assert!(fx.cancel().is_some());
        assert!(fx.cancel().is_none());
        assert_eq!(fx.body().movement_speed, before.movement_speed);
    }

    #[test]
    fn cancel_critical_restores_and_keeps_record() {
        let mut fx = Fixture::new();
        fx.declare();

        let report = fx.cancel().expect("cancelled");

        assert_eq!(report.kind, TransitionKind::CancelCritical);
        assert_eq!(fx.state(), LifecycleState::Normal);
        assert_eq!(fx.body().movement_speed, SimBody::DEFAULT_SPEED);
        assert_eq!(fx.body().stance_lock, None);
        assert!(fx.controller.status(&fx.entity).is_some());
        fx.assert_consistent();
    }

    #[test]
    fn cancel_while_reviving_is_ignored() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        assert!(fx.cancel().is_none());
        assert_eq!(fx.state(), LifecycleState::Reviving);
    }

    #[test]
    fn force_normal_without_anything_active_is_noop() {
        let mut fx = Fixture::new();

        assert!(fx.force().is_none());

        fx.declare();
        assert!(fx.force().is_some());
        assert!(fx.force().is_none());
    }

    #[test]
    fn remove_entity_cleans_up_and_forgets() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();

        let removed = {
            let mut host = fx.host.host();
            fx.controller.remove_entity(&mut host, &fx.entity)
        };

        assert_eq!(removed.unwrap().state(), LifecycleState::Normal);
        assert!(fx.controller.status(&fx.entity).is_none());
        assert!(fx.controller.local_participant().is_none());
        assert!(fx.body().all_visible());
        assert_eq!(fx.body().movement_speed, SimBody::DEFAULT_SPEED);
    }

    #[test]
    fn cooldown_survives_return_to_normal() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick_until_normal();

        let remaining = fx.controller.remaining_cooldown(&fx.entity, fx.clock);

        assert_eq!(
            remaining,
            RevivalConfig::DEFAULT_COOLDOWN - RevivalConfig::DEFAULT_INVULNERABILITY
        );
    }

    // ============================================================================
    // Host failures
    // ============================================================================

    #[test]
    fn failed_suppression_is_recorded_as_missing_and_not_restored() {
        let mut fx = Fixture::new();
        fx.host.world.fail_channels(EffectChannels::TARGETING);

        let report = fx.declare().unwrap();

        assert!(report.failed.contains(EffectChannels::TARGETING));
        assert_eq!(fx.state(), LifecycleState::Critical);
        let record = fx.controller.status(&fx.entity).unwrap();
        assert_eq!(record.suppression(), Some(&Snapshot::Missing));
        fx.assert_consistent();

        fx.host.world.heal_channels(EffectChannels::TARGETING);
        let report = fx.cancel().unwrap();
        assert!(report.is_clean());
        assert_eq!(fx.body().awareness, 1.0);
    }

    #[test]
    fn render_failure_does_not_abort_expiry() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick(FRAME, false);
        fx.host.world.fail_channels(EffectChannels::RENDER);

        let outcomes = fx.tick_until_normal();

        let expired = outcomes.last().unwrap().expired.as_ref().unwrap();
        assert!(expired.failed.contains(EffectChannels::RENDER));
        assert_eq!(fx.state(), LifecycleState::Normal);
        fx.assert_consistent();
        assert!(!fx.body().all_visible());
        let pending = fx.controller.status(&fx.entity).unwrap().pending_render().len();
        assert_eq!(pending, SimBody::RENDER_ELEMENTS as usize);

        // Still failing: the forced exit reports it and keeps the obligation.
        let retry = fx.force().expect("pending render elements to retry");
        assert!(retry.failed.contains(EffectChannels::RENDER));
        assert_eq!(retry.from, LifecycleState::Normal);

        fx.host.world.heal_channels(EffectChannels::RENDER);
        let report = fx.force().expect("pending render elements to retry");

        assert!(report.is_clean());
        assert!(fx.body().all_visible());
        assert!(fx.controller.status(&fx.entity).unwrap().pending_render().is_empty());
        assert!(fx.force().is_none());
    }

    #[test]
    fn removing_entity_retries_hidden_render_elements() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick(FRAME, false);
        assert!(!fx.body().all_visible());
        fx.host.world.fail_channels(EffectChannels::RENDER);
        fx.tick_until_normal();
        fx.host.world.heal_channels(EffectChannels::RENDER);

        let mut host = fx.host.host();
        let removed = fx.controller.remove_entity(&mut host, &fx.entity);

        assert!(removed.is_some_and(|record| record.pending_render().is_empty()));
        assert!(fx.body().all_visible());
    }

    #[test]
    fn expiry_tick_steps_flash_inactive_and_shows_elements() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.revive(true).unwrap();
        fx.tick(FRAME, false);
        assert!(!fx.body().all_visible());

        let outcome = fx.tick(RevivalConfig::DEFAULT_INVULNERABILITY, false);

        let expired = outcome.expired.expect("window elapsed");
        assert!(expired.is_clean());
        assert!(fx.body().all_visible());
        assert!(fx.controller.status(&fx.entity).unwrap().flash().is_none());
    }

    #[test]
    fn despawned_host_entity_still_completes_transitions() {
        let mut fx = Fixture::new();
        fx.give_item(1);
        fx.declare();
        fx.host.world.despawn(&fx.entity);

        let success = fx.revive(true).expect("revival proceeds");
        assert!(!success.report.is_clean());

        let report = fx.force().unwrap();
        assert!(!report.is_clean());
        assert_eq!(fx.state(), LifecycleState::Normal);
        fx.assert_consistent();
    }

    #[test]
    fn every_reachable_state_is_consistent() {
        let mut fx = Fixture::new();
        fx.give_item(3);
        let steps: Vec<Box<dyn Fn(&mut Fixture)>> = vec![
            Box::new(|fx| {
                fx.declare();
            }),
            Box::new(|fx| {
                let _ = fx.revive(true);
            }),
            Box::new(|fx| {
                fx.tick(Duration::from_millis(700), false);
            }),
            Box::new(|fx| {
                fx.cancel();
            }),
            Box::new(|fx| {
                fx.force();
            }),
            Box::new(|fx| {
                fx.tick(Duration::from_secs(4), true);
            }),
        ];

        for round in 0..60 {
            let step = &steps[(round * 7 + round / 3) % steps.len()];
            step(&mut fx);
            fx.assert_consistent();
        }
    }
}
