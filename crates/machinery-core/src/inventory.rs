//! The inventory collaborator.
//!
//! Placement draws one unit of an item when it starts and must hand it back
//! when the placement is cancelled. Slot layout and stacking rules belong to
//! the host; the workbench only needs [`Inventory`].

use std::collections::BTreeMap;

/// An item store keyed by item id (the component definition name).
pub trait Inventory {
    /// Remove `amount` units. Returns false (and removes nothing) if fewer
    /// than `amount` are held.
    fn take(&mut self, item: &str, amount: u32) -> bool;

    /// Return `amount` units. Returns false if the store could not accept them.
    fn give(&mut self, item: &str, amount: u32) -> bool;

    /// Units of `item` currently held.
    fn count(&self, item: &str) -> u32;
}

/// A flat count-per-item store with an optional total capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCounts {
    counts: BTreeMap<String, u32>,
    capacity: Option<u32>,
}

impl ItemCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses to hold more than `capacity` units in total.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            counts: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Builder-style stock. Saturates at `u32::MAX`.
    pub fn with(mut self, item: &str, amount: u32) -> Self {
        let held = self.counts.entry(item.to_string()).or_default();
        *held = held.saturating_add(amount);
        self
    }

    /// Total units across all items, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.counts
            .values()
            .fold(0u32, |sum, &n| sum.saturating_add(n))
    }
}

impl Inventory for ItemCounts {
    fn take(&mut self, item: &str, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        match self.counts.get_mut(item) {
            Some(held) if *held >= amount => {
                *held -= amount;
                if *held == 0 {
                    self.counts.remove(item);
                }
                true
            }
            _ => false,
        }
    }

    fn give(&mut self, item: &str, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        let Some(total) = self.total().checked_add(amount) else {
            return false;
        };
        if self.capacity.is_some_and(|capacity| total > capacity) {
            return false;
        }
        let held = self.counts.entry(item.to_string()).or_default();
        match held.checked_add(amount) {
            Some(n) => {
                *held = n;
                true
            }
            None => false,
        }
    }

    fn count(&self, item: &str) -> u32 {
        self.counts.get(item).copied().unwrap_or(0)
    }
}
