use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Unique identifier for an entity tracked by the controller.
///
/// Hosts typically key participants by a profile or session identifier, so the
/// id is an owned string rather than a dense index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Template identifier of an inventory item (e.g. the revival item).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a single render element (body skin, attachment) on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderElementId(pub u32);

/// Point on the monotonic per-session clock.
///
/// Expressed as the elapsed time since the session started. Ticks and cooldown
/// comparisons both use this clock so the two never skew against each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub Duration);

impl Timestamp {
    pub const ZERO: Self = Self(Duration::ZERO);

    pub const fn from_duration(since_start: Duration) -> Self {
        Self(since_start)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn since_start(self) -> Duration {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{:.3}s", self.0.as_secs_f64())
    }
}

/// Lifecycle state of a tracked entity. Exactly one holds at any time.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LifecycleState {
    #[default]
    Normal,
    /// Incapacitated, waiting for a revival.
    Critical,
    /// Revived and inside the invulnerability window.
    Reviving,
}

impl LifecycleState {
    /// Returns true while any lifecycle effect is applied.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Body regions that receive per-region recovery.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BodyRegion {
    Head,
    Chest,
    Stomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

/// Body stance the controller can lock an entity into.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Stance {
    #[default]
    Standing,
    Crouched,
    Prone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_difference_saturates_on_skew() {
        let earlier = Timestamp::from_secs(10);
        let later = Timestamp::from_secs(25);

        assert_eq!(later.saturating_since(earlier), Duration::from_secs(15));
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
    }

    #[test]
    fn lifecycle_state_parses_case_insensitively() {
        assert_eq!(
            "REVIVING".parse::<LifecycleState>().unwrap(),
            LifecycleState::Reviving
        );
        assert_eq!(LifecycleState::Critical.as_ref(), "critical");
        assert!(!LifecycleState::Normal.is_active());
    }

    #[test]
    fn body_regions_iterate_in_declaration_order() {
        use strum::IntoEnumIterator;

        let regions: Vec<_> = BodyRegion::iter().collect();
        assert_eq!(regions.len(), 7);
        assert_eq!(regions[0], BodyRegion::Head);
        assert_eq!(regions[6], BodyRegion::RightLeg);
    }
}
