use std::time::Duration;

use crate::state::{BodyRegion, ItemId};

/// Revival rules and tunable parameters.
///
/// Read-only once the controller is built. Hosts load it at startup (see the
/// bootstrap crate) and hand it to [`RevivalController::new`].
///
/// [`RevivalController::new`]: crate::engine::RevivalController::new
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RevivalConfig {
    /// Template id of the item consumed by a revival.
    pub required_item: ItemId,
    /// Human-readable item name used in notifications.
    pub item_name: String,
    /// Disables item and cooldown enforcement. Verification environments only.
    pub bypass_requirements: bool,
    /// Minimum time between two successful revivals of the same entity.
    pub cooldown: Duration,
    /// Length of the invulnerability window after a revival.
    pub invulnerability: Duration,
    /// Interval between visibility toggles while invulnerable.
    pub flash_interval: Duration,
    /// Fraction of the original movement speed kept while clamped.
    pub movement_clamp: f32,
    /// Tremor applied on entering the critical state.
    pub critical_tremor: Duration,
    /// Tremor applied by the revival itself.
    pub revival_tremor: Duration,
    /// Key label shown in the critical notification.
    pub revival_key: String,
    pub recovery: RecoveryProfile,
}

impl RevivalConfig {
    // ===== runtime-tunable defaults =====
    /// Defibrillator template id.
    pub const DEFAULT_ITEM_ID: &'static str = "60540bddd93c884912009818";
    pub const DEFAULT_ITEM_NAME: &'static str = "defibrillator";
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(180);
    pub const DEFAULT_INVULNERABILITY: Duration = Duration::from_secs(10);
    pub const DEFAULT_FLASH_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_MOVEMENT_CLAMP: f32 = 0.1;
    pub const DEFAULT_CRITICAL_TREMOR: Duration = Duration::from_secs(5);
    pub const DEFAULT_REVIVAL_TREMOR: Duration = Duration::from_secs(3);
    pub const DEFAULT_REVIVAL_KEY: &'static str = "F5";

    pub fn new() -> Self {
        Self {
            required_item: ItemId::from(Self::DEFAULT_ITEM_ID),
            item_name: Self::DEFAULT_ITEM_NAME.to_owned(),
            bypass_requirements: false,
            cooldown: Self::DEFAULT_COOLDOWN,
            invulnerability: Self::DEFAULT_INVULNERABILITY,
            flash_interval: Self::DEFAULT_FLASH_INTERVAL,
            movement_clamp: Self::DEFAULT_MOVEMENT_CLAMP,
            critical_tremor: Self::DEFAULT_CRITICAL_TREMOR,
            revival_tremor: Self::DEFAULT_REVIVAL_TREMOR,
            revival_key: Self::DEFAULT_REVIVAL_KEY.to_owned(),
            recovery: RecoveryProfile::default(),
        }
    }

    #[must_use]
    pub fn with_required_item(mut self, item: impl Into<ItemId>, name: impl Into<String>) -> Self {
        self.required_item = item.into();
        self.item_name = name.into();
        self
    }

    #[must_use]
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass_requirements = bypass;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_invulnerability(mut self, invulnerability: Duration) -> Self {
        self.invulnerability = invulnerability;
        self
    }

    #[must_use]
    pub fn with_flash_interval(mut self, interval: Duration) -> Self {
        self.flash_interval = interval;
        self
    }

    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryProfile) -> Self {
        self.recovery = recovery;
        self
    }

    /// Checks value ranges the controller relies on.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_item.as_str().is_empty() {
            return Err(ConfigError::EmptyItemId);
        }
        if self.invulnerability.is_zero() {
            return Err(ConfigError::ZeroDuration("invulnerability"));
        }
        if self.flash_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("flash_interval"));
        }
        if !(self.movement_clamp > 0.0 && self.movement_clamp <= 1.0) {
            return Err(ConfigError::MovementClampOutOfRange(self.movement_clamp));
        }
        Ok(())
    }
}

impl Default for RevivalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Invalid configuration values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("required item id must not be empty")]
    EmptyItemId,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("movement clamp {0} must be within (0, 1]")]
    MovementClampOutOfRange(f32),
}

/// Per-region heal amounts applied by a revival.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionHeal {
    pub head: f32,
    pub chest: f32,
    pub stomach: f32,
    pub arms: f32,
    pub legs: f32,
}

impl RegionHeal {
    pub fn amount(&self, region: BodyRegion) -> f32 {
        match region {
            BodyRegion::Head => self.head,
            BodyRegion::Chest => self.chest,
            BodyRegion::Stomach => self.stomach,
            BodyRegion::LeftArm | BodyRegion::RightArm => self.arms,
            BodyRegion::LeftLeg | BodyRegion::RightLeg => self.legs,
        }
    }
}

/// What a successful revival restores.
///
/// | profile       | head | chest | stomach | arms | legs | energy | hydration |
/// |---------------|------|-------|---------|------|------|--------|-----------|
/// | `partial`     | 25   | 35    | 20      | 15   | 20   | 30     | 30        |
/// | `legacy_full` | 100  | 100   | 80      | 80   | 80   | 100    | 100       |
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoveryProfile {
    pub heal: RegionHeal,
    pub energy: f32,
    pub hydration: f32,
    /// Clear negative effects on every region before healing.
    pub purge_negative_effects: bool,
    pub painkiller: bool,
}

impl RecoveryProfile {
    /// Bounded partial recovery. Leaves the entity far from full health.
    pub const fn partial() -> Self {
        Self {
            heal: RegionHeal {
                head: 25.0,
                chest: 35.0,
                stomach: 20.0,
                arms: 15.0,
                legs: 20.0,
            },
            energy: 30.0,
            hydration: 30.0,
            purge_negative_effects: true,
            painkiller: true,
        }
    }

    /// Near-full heal from the first iteration of the feature.
    ///
    /// Superseded by [`partial`](Self::partial); kept as an opt-in mode.
    pub const fn legacy_full() -> Self {
        Self {
            heal: RegionHeal {
                head: 100.0,
                chest: 100.0,
                stomach: 80.0,
                arms: 80.0,
                legs: 80.0,
            },
            energy: 100.0,
            hydration: 100.0,
            purge_negative_effects: true,
            painkiller: true,
        }
    }
}

impl Default for RecoveryProfile {
    fn default() -> Self {
        Self::partial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RevivalConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cooldown, Duration::from_secs(180));
        assert_eq!(config.invulnerability, Duration::from_secs(10));
        assert!(!config.bypass_requirements);
    }

    #[test]
    fn zero_flash_interval_is_rejected() {
        let config = RevivalConfig::default().with_flash_interval(Duration::ZERO);

        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("flash_interval"))
        );
    }

    #[test]
    fn movement_clamp_must_be_a_fraction() {
        let mut config = RevivalConfig::default();
        config.movement_clamp = 1.5;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MovementClampOutOfRange(_))
        ));
    }

    #[test]
    fn partial_profile_heals_less_than_legacy() {
        let partial = RecoveryProfile::partial();
        let legacy = RecoveryProfile::legacy_full();

        assert!(partial.heal.amount(BodyRegion::Head) < legacy.heal.amount(BodyRegion::Head));
        assert_eq!(legacy.heal.amount(BodyRegion::LeftLeg), 80.0);
        assert_eq!(partial.heal.amount(BodyRegion::RightArm), 15.0);
    }
}
