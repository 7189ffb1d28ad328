use bitflags::bitflags;

bitflags! {
    /// Effect channels the controller drives on an entity.
    ///
    /// Transition reports carry the set of channels whose actuator call
    /// failed, so hosts can tell a clean transition from a degraded one.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct EffectChannels: u16 {
        const TARGETING  = 1 << 0;
        const MOVEMENT   = 1 << 1;
        const STANCE     = 1 << 2;
        const TREMOR     = 1 << 3;
        const COMBAT     = 1 << 4;
        const HEALTH     = 1 << 5;
        const VITALS     = 1 << 6;
        const PAINKILLER = 1 << 7;
        const RENDER     = 1 << 8;
        const INVENTORY  = 1 << 9;
    }
}
