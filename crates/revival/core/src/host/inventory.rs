use crate::error::ActuatorResult;
use crate::state::{EntityId, ItemId};

/// Item possession queries and consumption, backed by the host inventory.
pub trait Inventory: Send {
    fn has_item(&self, entity: &EntityId, item: &ItemId) -> bool;

    /// Removes one unit of `item` from the entity's inventory.
    fn consume_item(&mut self, entity: &EntityId, item: &ItemId) -> ActuatorResult<()>;
}
