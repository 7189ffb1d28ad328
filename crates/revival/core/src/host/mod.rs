//! Traits describing the host world the controller acts on.
//!
//! The controller never touches a renderer, a health system, or an inventory
//! directly. Hosts implement [`EffectActuator`], [`Inventory`] and
//! [`NotificationPort`], and the [`Host`] aggregate bundles them so every
//! lifecycle operation receives exactly the capabilities it needs.
mod actuator;
mod channels;
mod inventory;
pub mod memory;
mod notify;

pub use actuator::EffectActuator;
pub use channels::EffectChannels;
pub use inventory::Inventory;
pub use notify::{
    Notification, NotificationColor, NotificationDuration, NotificationPort, NotificationSeverity,
};

/// Mutable view of the host capabilities for a single controller call.
pub struct Host<'a> {
    actuator: &'a mut dyn EffectActuator,
    inventory: &'a mut dyn Inventory,
    notifier: &'a mut dyn NotificationPort,
}

impl<'a> Host<'a> {
    pub fn new(
        actuator: &'a mut dyn EffectActuator,
        inventory: &'a mut dyn Inventory,
        notifier: &'a mut dyn NotificationPort,
    ) -> Self {
        Self {
            actuator,
            inventory,
            notifier,
        }
    }

    pub fn actuator(&mut self) -> &mut dyn EffectActuator {
        &mut *self.actuator
    }

    pub fn inventory(&mut self) -> &mut dyn Inventory {
        &mut *self.inventory
    }

    pub fn notifier(&mut self) -> &mut dyn NotificationPort {
        &mut *self.notifier
    }
}
