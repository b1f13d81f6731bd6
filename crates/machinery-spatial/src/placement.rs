//! Placed components and the arena that owns them.
//!
//! Cells only store a [`ComponentId`]; the component record lives in the
//! [`ComponentStore`] side table.

use crate::footprint::{self, CellRejection};
use crate::grid::{CellGrid, GridError, Placeability};
use machinery_core::catalog::{Catalog, ComponentDef, PortDef};
use machinery_core::geometry::{GridPosition, Rotation};
use machinery_core::id::{ComponentDefId, ComponentId};
use slotmap::SlotMap;
use tracing::debug;

/// Errors from placement and removal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("footprint cell {cell} is {reason}")]
    InvalidFootprint {
        cell: GridPosition,
        reason: CellRejection,
    },
    #[error("unknown component definition {0:?}")]
    UnknownDefinition(ComponentDefId),
    #[error("component {0:?} is not placed")]
    NotPlaced(ComponentId),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A component instance on the grid. Its cells are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedComponent {
    pub def: ComponentDefId,
    pub anchor: GridPosition,
    pub rotation: Rotation,
}

impl PlacedComponent {
    /// Absolute footprint cells, or empty if the definition is unknown.
    pub fn cells(&self, catalog: &Catalog) -> Vec<GridPosition> {
        catalog
            .get(self.def)
            .map(|def| footprint::resolve(self.anchor, &def.footprint, self.rotation))
            .unwrap_or_default()
    }

    /// Every port with its absolute cell.
    pub fn ports<'a>(&self, def: &'a ComponentDef) -> Vec<(&'a PortDef, GridPosition)> {
        def.ports
            .iter()
            .map(|p| {
                let at = footprint::port_cell(self.anchor, &def.footprint, self.rotation, p);
                (p, at)
            })
            .collect()
    }
}

/// Arena of placed components.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: SlotMap<ComponentId, PlacedComponent>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the resolved footprint without placing.
    pub fn can_place(
        &self,
        grid: &CellGrid,
        catalog: &Catalog,
        def: ComponentDefId,
        anchor: GridPosition,
        rotation: Rotation,
    ) -> Result<Vec<GridPosition>, PlacementError> {
        let d = catalog
            .get(def)
            .ok_or(PlacementError::UnknownDefinition(def))?;
        let cells = footprint::resolve(anchor, &d.footprint, rotation);
        footprint::check(&cells, grid)?;
        Ok(cells)
    }

    /// Place a component. Every cell is validated before any is written;
    /// on success each footprint cell holds the new handle and becomes
    /// ConnectorsOnly.
    pub fn place(
        &mut self,
        grid: &mut CellGrid,
        catalog: &Catalog,
        def: ComponentDefId,
        anchor: GridPosition,
        rotation: Rotation,
    ) -> Result<ComponentId, PlacementError> {
        let cells = self.can_place(grid, catalog, def, anchor, rotation)?;
        let id = self.components.insert(PlacedComponent {
            def,
            anchor,
            rotation,
        });
        for &pos in &cells {
            let cell = grid.cell_mut(pos)?;
            cell.component = Some(id);
            cell.placeability = Placeability::ConnectorsOnly;
        }
        debug!(?id, ?def, %anchor, ?rotation, cells = cells.len(), "component placed");
        Ok(id)
    }

    /// Remove a component, clearing its cells and restoring the
    /// placeability they had at grid construction.
    pub fn remove(
        &mut self,
        grid: &mut CellGrid,
        catalog: &Catalog,
        id: ComponentId,
    ) -> Result<PlacedComponent, PlacementError> {
        let placed = self
            .components
            .remove(id)
            .ok_or(PlacementError::NotPlaced(id))?;
        for pos in placed.cells(catalog) {
            let Some(base) = grid.base_placeability(pos) else {
                continue;
            };
            let cell = grid.cell_mut(pos)?;
            if cell.component == Some(id) {
                cell.component = None;
                cell.placeability = base;
            }
        }
        debug!(?id, anchor = %placed.anchor, "component removed");
        Ok(placed)
    }

    pub fn get(&self, id: ComponentId) -> Option<&PlacedComponent> {
        self.components.get(id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.components.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &PlacedComponent)> {
        self.components.iter()
    }

    /// The component whose footprint covers `pos`, read from the grid.
    pub fn component_at(&self, grid: &CellGrid, pos: GridPosition) -> Option<(ComponentId, &PlacedComponent)> {
        let id = grid.try_cell(pos)?.component?;
        self.components.get(id).map(|c| (id, c))
    }

    /// Recompute a placed component's footprint.
    pub fn cells_of(&self, id: ComponentId, catalog: &Catalog) -> Option<Vec<GridPosition>> {
        self.components.get(id).map(|c| c.cells(catalog))
    }
}
