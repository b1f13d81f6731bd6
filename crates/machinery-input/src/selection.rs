//! Cell selection with target cycling.
//!
//! A cell can hold a component, a wire and a pipe at once. Clicking the same
//! cell again steps through whatever it holds in that order; clicking a
//! different cell starts over at the first target.

use machinery_core::geometry::GridPosition;
use machinery_core::id::{ComponentId, WireId};
use machinery_spatial::Cell;

/// What a selection points at within its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionTarget {
    /// An empty cell.
    #[default]
    None,
    Component,
    Wire,
    Pipe,
}

/// Snapshot handed to selection observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionInfo {
    pub cell: GridPosition,
    pub target: SelectionTarget,
    pub component: Option<ComponentId>,
    pub wire: Option<WireId>,
}

/// Targets available in `cell`, in cycling order.
pub fn targets_in(cell: &Cell) -> Vec<SelectionTarget> {
    let mut targets = Vec::with_capacity(3);
    if cell.has_component() {
        targets.push(SelectionTarget::Component);
    }
    if cell.has_wire() {
        targets.push(SelectionTarget::Wire);
    }
    if cell.has_pipe() {
        targets.push(SelectionTarget::Pipe);
    }
    targets
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<SelectionInfo>,
    cycle_index: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SelectionInfo> {
        self.current.as_ref()
    }

    /// Select `cell`, cycling when it is already the selected cell.
    pub fn select(&mut self, pos: GridPosition, cell: &Cell) -> SelectionInfo {
        let targets = targets_in(cell);
        let same_cell = self.current.is_some_and(|s| s.cell == pos);
        self.cycle_index = if same_cell && !targets.is_empty() {
            (self.cycle_index + 1) % targets.len()
        } else {
            0
        };
        let target = targets
            .get(self.cycle_index)
            .copied()
            .unwrap_or(SelectionTarget::None);
        let info = SelectionInfo {
            cell: pos,
            target,
            component: cell.component,
            wire: cell.wire_id(),
        };
        self.current = Some(info);
        info
    }

    /// Returns true if something was selected.
    pub fn clear(&mut self) -> bool {
        self.cycle_index = 0;
        self.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machinery_core::id::WireId;
    use machinery_spatial::{Placeability, WireType};
    use slotmap::SlotMap;

    fn busy_cell() -> Cell {
        let mut components = SlotMap::<ComponentId, ()>::with_key();
        let mut wires = SlotMap::<WireId, ()>::with_key();
        let mut cell = Cell::new(0, Placeability::ConnectorsOnly);
        cell.component = Some(components.insert(()));
        cell.set_wire(WireType::AC, wires.insert(()));
        cell.pipe = true;
        cell
    }

    #[test]
    fn same_cell_cycles_through_targets() {
        let cell = busy_cell();
        let pos = GridPosition::new(1, 1);
        let mut selection = Selection::new();
        let picks: Vec<_> = (0..4).map(|_| selection.select(pos, &cell).target).collect();
        assert_eq!(
            picks,
            vec![
                SelectionTarget::Component,
                SelectionTarget::Wire,
                SelectionTarget::Pipe,
                SelectionTarget::Component,
            ]
        );
    }

    #[test]
    fn new_cell_resets_cycle() {
        let cell = busy_cell();
        let mut selection = Selection::new();
        selection.select(GridPosition::new(1, 1), &cell);
        selection.select(GridPosition::new(1, 1), &cell);
        let info = selection.select(GridPosition::new(2, 1), &cell);
        assert_eq!(info.target, SelectionTarget::Component);
        assert_eq!(info.cell, GridPosition::new(2, 1));
    }

    #[test]
    fn empty_cell_selects_nothing_in_particular() {
        let cell = Cell::new(0, Placeability::Placeable);
        let mut selection = Selection::new();
        let info = selection.select(GridPosition::ORIGIN, &cell);
        assert_eq!(info.target, SelectionTarget::None);
        assert_eq!(selection.select(GridPosition::ORIGIN, &cell).target, SelectionTarget::None);
        assert!(selection.clear());
        assert!(!selection.clear());
        assert!(selection.current().is_none());
    }
}
