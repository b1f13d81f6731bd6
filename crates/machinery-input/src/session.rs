//! The component currently held for placement.
//!
//! Starting a placement takes one unit out of the inventory. The unit goes
//! back whenever ComponentPlacement is left without a commit: right-click
//! cancel, a hotkey, an external mode switch, or dispatcher deactivation.

use crate::error::InputError;
use machinery_core::geometry::Rotation;
use machinery_core::id::ComponentDefId;
use machinery_core::inventory::Inventory;
use machinery_core::mode::{Mode, ModeListener};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// An inventory unit waiting to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldItem {
    pub item_id: String,
    pub def: ComponentDefId,
    pub rotation: Rotation,
}

pub struct PlacementSession {
    inventory: Rc<RefCell<dyn Inventory>>,
    held: Option<HeldItem>,
}

impl std::fmt::Debug for PlacementSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementSession")
            .field("held", &self.held)
            .finish_non_exhaustive()
    }
}

impl PlacementSession {
    pub fn new(inventory: Rc<RefCell<dyn Inventory>>) -> Self {
        Self {
            inventory,
            held: None,
        }
    }

    pub fn held(&self) -> Option<&HeldItem> {
        self.held.as_ref()
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Take one unit of `item_id` and hold it with rotation reset.
    pub fn hold(&mut self, item_id: &str, def: ComponentDefId) -> Result<(), InputError> {
        if self.held.is_some() {
            return Err(InputError::PlacementInProgress);
        }
        if !self.inventory.borrow_mut().take(item_id, 1) {
            return Err(InputError::OutOfStock(item_id.to_string()));
        }
        self.held = Some(HeldItem {
            item_id: item_id.to_string(),
            def,
            rotation: Rotation::None,
        });
        debug!(item = item_id, "placement started");
        Ok(())
    }

    /// Rotate the held item a quarter turn. Returns the new rotation.
    pub fn rotate(&mut self) -> Option<Rotation> {
        let held = self.held.as_mut()?;
        held.rotation = held.rotation.rotate_cw();
        Some(held.rotation)
    }

    /// Release the held item after a successful placement. No refund.
    pub fn commit(&mut self) -> Option<HeldItem> {
        self.held.take()
    }

    /// Return the held item to the inventory. False if nothing was held.
    pub fn refund(&mut self) -> bool {
        let Some(held) = self.held.take() else {
            return false;
        };
        if self.inventory.borrow_mut().give(&held.item_id, 1) {
            debug!(item = %held.item_id, "placement refunded");
        } else {
            warn!(item = %held.item_id, "inventory rejected placement refund");
        }
        true
    }
}

impl ModeListener for PlacementSession {
    fn on_enter_mode(&mut self, _mode: Mode) {}

    fn on_exit_mode(&mut self, mode: Mode) {
        if mode == Mode::ComponentPlacement {
            self.refund();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machinery_core::inventory::ItemCounts;

    fn session_with(stock: u32) -> (PlacementSession, Rc<RefCell<ItemCounts>>) {
        let inventory = Rc::new(RefCell::new(ItemCounts::new().with("pump", stock)));
        (PlacementSession::new(inventory.clone()), inventory)
    }

    #[test]
    fn hold_takes_one_unit() {
        let (mut session, inventory) = session_with(2);
        session.hold("pump", ComponentDefId(0)).unwrap();
        assert_eq!(inventory.borrow().count("pump"), 1);
        assert_eq!(session.held().unwrap().rotation, Rotation::None);
        assert_eq!(
            session.hold("pump", ComponentDefId(0)),
            Err(InputError::PlacementInProgress)
        );
        assert_eq!(inventory.borrow().count("pump"), 1);
    }

    #[test]
    fn out_of_stock() {
        let (mut session, _) = session_with(0);
        assert_eq!(
            session.hold("pump", ComponentDefId(0)),
            Err(InputError::OutOfStock("pump".to_string()))
        );
        assert!(!session.is_holding());
    }

    #[test]
    fn rotation_wraps() {
        let (mut session, _) = session_with(1);
        assert_eq!(session.rotate(), None);
        session.hold("pump", ComponentDefId(0)).unwrap();
        let steps: Vec<_> = (0..4).filter_map(|_| session.rotate()).collect();
        assert_eq!(
            steps,
            vec![
                Rotation::Cw90,
                Rotation::Cw180,
                Rotation::Cw270,
                Rotation::None
            ]
        );
    }

    #[test]
    fn commit_does_not_refund() {
        let (mut session, inventory) = session_with(1);
        session.hold("pump", ComponentDefId(0)).unwrap();
        assert!(session.commit().is_some());
        session.on_exit_mode(Mode::ComponentPlacement);
        assert_eq!(inventory.borrow().count("pump"), 0);
    }

    #[test]
    fn leaving_placement_refunds_once() {
        let (mut session, inventory) = session_with(1);
        session.hold("pump", ComponentDefId(0)).unwrap();

        session.on_exit_mode(Mode::WirePlacement);
        assert_eq!(inventory.borrow().count("pump"), 0);

        session.on_exit_mode(Mode::ComponentPlacement);
        assert_eq!(inventory.borrow().count("pump"), 1);
        assert!(!session.refund());
        assert_eq!(inventory.borrow().count("pump"), 1);
    }
}
