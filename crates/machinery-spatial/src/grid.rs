//! The cell grid and its per-cell records.

use crate::index;
use machinery_core::catalog::PortType;
use machinery_core::fixed::Fixed64;
use machinery_core::geometry::GridPosition;
use machinery_core::id::{ComponentDefId, ComponentId, WireId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell classification
// ---------------------------------------------------------------------------

/// What may be built on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Placeability {
    /// Nothing may be placed or routed here.
    #[default]
    Blocked,
    /// Components, wires and pipes.
    Placeable,
    /// Wires and pipes, but no components.
    ConnectorsOnly,
    /// The machine's display row.
    Display,
}

/// Named cell archetypes produced by the level source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellArchetype {
    Normal,
    Connector,
    Display,
    Blocked,
}

impl CellArchetype {
    /// Map an archetype name. Unrecognized names are blocked.
    pub fn from_name(name: &str) -> Self {
        match name {
            "normalCell" => CellArchetype::Normal,
            "connectorCell" => CellArchetype::Connector,
            "displayCell" => CellArchetype::Display,
            _ => CellArchetype::Blocked,
        }
    }

    pub fn placeability(self) -> Placeability {
        match self {
            CellArchetype::Normal => Placeability::Placeable,
            CellArchetype::Connector => Placeability::ConnectorsOnly,
            CellArchetype::Display => Placeability::Display,
            CellArchetype::Blocked => Placeability::Blocked,
        }
    }
}

/// Electrical wire laid in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WireType {
    #[default]
    None,
    AC,
    DC,
    Signal,
}

impl WireType {
    /// The port type a wire of this kind connects. `None` connects nothing.
    pub fn port_type(self) -> Option<PortType> {
        match self {
            WireType::None => None,
            WireType::AC | WireType::DC => Some(PortType::Power),
            WireType::Signal => Some(PortType::Signal),
        }
    }
}

/// Summary of what a cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Empty,
    Component,
    Wire,
    Pipe,
    /// More than one of component, wire and pipe.
    Mixed,
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One grid position and its contents.
///
/// Wire occupancy goes through [`set_wire`](Cell::set_wire) and
/// [`clear_wire`](Cell::clear_wire) so that a wire tag is present iff its
/// owning connection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub index: usize,
    pub placeability: Placeability,
    pub component: Option<ComponentId>,
    wire: WireType,
    wire_id: Option<WireId>,
    pub pipe: bool,
}

impl Cell {
    pub fn new(index: usize, placeability: Placeability) -> Self {
        Self {
            index,
            placeability,
            component: None,
            wire: WireType::None,
            wire_id: None,
            pipe: false,
        }
    }

    pub fn has_component(&self) -> bool {
        self.component.is_some()
    }

    pub fn has_wire(&self) -> bool {
        self.wire != WireType::None
    }

    pub fn has_pipe(&self) -> bool {
        self.pipe
    }

    pub fn wire(&self) -> WireType {
        self.wire
    }

    pub fn wire_id(&self) -> Option<WireId> {
        self.wire_id
    }

    /// Lay a wire of `kind` owned by `id`. `WireType::None` clears the wire.
    pub fn set_wire(&mut self, kind: WireType, id: WireId) {
        if kind == WireType::None {
            self.clear_wire();
        } else {
            self.wire = kind;
            self.wire_id = Some(id);
        }
    }

    pub fn clear_wire(&mut self) {
        self.wire = WireType::None;
        self.wire_id = None;
    }

    pub fn occupancy(&self) -> Occupancy {
        let flags = [self.has_component(), self.has_wire(), self.has_pipe()];
        match flags {
            [false, false, false] => Occupancy::Empty,
            [true, false, false] => Occupancy::Component,
            [false, true, false] => Occupancy::Wire,
            [false, false, true] => Occupancy::Pipe,
            _ => Occupancy::Mixed,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from grid construction and bounds-checked access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfRange {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("grid dimensions must be non-zero")]
    ZeroSize,
}

// ---------------------------------------------------------------------------
// CellGrid
// ---------------------------------------------------------------------------

/// Fixed-size, row-major grid of cells plus per-cell overlays.
///
/// The construction-time placeability of every cell is kept separately so
/// that removing a component restores what was there before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    base: Vec<Placeability>,
    power: Vec<bool>,
    water: Vec<bool>,
    spill: Vec<Fixed64>,
    things: Vec<Vec<ComponentDefId>>,
}

impl CellGrid {
    /// Build a grid from one placeability per cell, row-major from (0, 0).
    pub fn new(width: u32, height: u32, placeability: Vec<Placeability>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSize);
        }
        let n = width as usize * height as usize;
        if placeability.len() != n {
            return Err(GridError::SizeMismatch {
                expected: n,
                actual: placeability.len(),
            });
        }
        let cells = placeability
            .iter()
            .enumerate()
            .map(|(i, &p)| Cell::new(i, p))
            .collect();
        Ok(Self {
            width,
            height,
            cells,
            base: placeability,
            power: vec![false; n],
            water: vec![false; n],
            spill: vec![Fixed64::ZERO; n],
            things: vec![Vec::new(); n],
        })
    }

    /// A grid where every cell has the same placeability.
    pub fn filled(width: u32, height: u32, placeability: Placeability) -> Result<Self, GridError> {
        let n = width as usize * height as usize;
        Self::new(width, height, vec![placeability; n])
    }

    /// A grid whose placeability is computed per position.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(GridPosition) -> Placeability,
    ) -> Result<Self, GridError> {
        if width == 0 {
            return Err(GridError::ZeroSize);
        }
        let n = width as usize * height as usize;
        let placeability = (0..n)
            .map(|i| {
                let (x, y) = index::from_index(i, width);
                f(GridPosition::new(x as i32, y as i32))
            })
            .collect();
        Self::new(width, height, placeability)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // -- Bounds & indexing --

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        self.in_bounds(pos.x, pos.y)
    }

    /// Linear index of an in-bounds position.
    pub fn to_index(&self, pos: GridPosition) -> Option<usize> {
        self.contains(pos)
            .then(|| index::to_index(pos.x as u32, pos.y as u32, self.width))
    }

    /// Position of a linear index (not bounds checked).
    pub fn from_index(&self, i: usize) -> GridPosition {
        let (x, y) = index::from_index(i, self.width);
        GridPosition::new(x as i32, y as i32)
    }

    fn checked_index(&self, pos: GridPosition) -> Result<usize, GridError> {
        self.to_index(pos).ok_or(GridError::OutOfRange {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        })
    }

    // -- Cells --

    /// The cell at `pos`, or `OutOfRange`.
    pub fn cell(&self, pos: GridPosition) -> Result<&Cell, GridError> {
        let i = self.checked_index(pos)?;
        Ok(&self.cells[i])
    }

    /// Mutable access to the cell at `pos`, or `OutOfRange`.
    pub fn cell_mut(&mut self, pos: GridPosition) -> Result<&mut Cell, GridError> {
        let i = self.checked_index(pos)?;
        Ok(&mut self.cells[i])
    }

    /// Overwrite the cell at `pos`. The stored index always matches `pos`.
    pub fn set_cell(&mut self, pos: GridPosition, mut cell: Cell) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        cell.index = i;
        self.cells[i] = cell;
        Ok(())
    }

    /// Bounds-checked lookup for arbitrary (e.g. pointer-derived) positions.
    pub fn try_cell(&self, pos: GridPosition) -> Option<&Cell> {
        self.to_index(pos).map(|i| &self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = (GridPosition, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.from_index(i), c))
    }

    /// Placeability the cell had when the grid was built.
    pub fn base_placeability(&self, pos: GridPosition) -> Option<Placeability> {
        self.to_index(pos).map(|i| self.base[i])
    }

    // -- World conversion --

    /// Center of a cell in world units. Cell (x, y) spans [x, x+1) x [y, y+1).
    pub fn cell_to_world(pos: GridPosition) -> (f32, f32) {
        (pos.x as f32 + 0.5, pos.y as f32 + 0.5)
    }

    /// The cell containing a world point, or `None` for a NaN or infinite
    /// coordinate.
    pub fn world_to_cell(x: f32, y: f32) -> Option<GridPosition> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(GridPosition::new(x.floor() as i32, y.floor() as i32))
    }

    // -- Overlays --

    pub fn has_power(&self, pos: GridPosition) -> bool {
        self.to_index(pos).is_some_and(|i| self.power[i])
    }

    pub fn has_water(&self, pos: GridPosition) -> bool {
        self.to_index(pos).is_some_and(|i| self.water[i])
    }

    pub fn set_power(&mut self, pos: GridPosition, on: bool) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.power[i] = on;
        Ok(())
    }

    pub fn set_water(&mut self, pos: GridPosition, on: bool) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.water[i] = on;
        Ok(())
    }

    // -- Spills --

    /// Spilled liquid depth (liters proxy). Zero outside the grid.
    pub fn spill(&self, pos: GridPosition) -> Fixed64 {
        self.to_index(pos).map_or(Fixed64::ZERO, |i| self.spill[i])
    }

    /// Add (or with a negative amount, drain) spill. Never drops below zero.
    pub fn add_spill(&mut self, pos: GridPosition, amount: Fixed64) -> Result<Fixed64, GridError> {
        let i = self.checked_index(pos)?;
        self.spill[i] = (self.spill[i] + amount).max(Fixed64::ZERO);
        Ok(self.spill[i])
    }

    pub fn set_spill(&mut self, pos: GridPosition, value: Fixed64) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.spill[i] = value.max(Fixed64::ZERO);
        Ok(())
    }

    // -- Things --

    /// Loose catalog items lying in a cell. Empty outside the grid.
    pub fn things_at(&self, pos: GridPosition) -> &[ComponentDefId] {
        self.to_index(pos).map_or(&[], |i| self.things[i].as_slice())
    }

    pub fn add_thing(&mut self, pos: GridPosition, thing: ComponentDefId) -> Result<(), GridError> {
        let i = self.checked_index(pos)?;
        self.things[i].push(thing);
        Ok(())
    }

    /// Remove one instance of `thing`. Returns false if none was there.
    pub fn remove_thing(&mut self, pos: GridPosition, thing: ComponentDefId) -> bool {
        let Some(i) = self.to_index(pos) else {
            return false;
        };
        match self.things[i].iter().position(|&t| t == thing) {
            Some(at) => {
                self.things[i].remove(at);
                true
            }
            None => false,
        }
    }

    // -- Queries --

    /// In bounds and not blocked.
    pub fn is_placeable(&self, pos: GridPosition) -> bool {
        self.try_cell(pos)
            .is_some_and(|c| c.placeability != Placeability::Blocked)
    }

    /// 0 for out-of-bounds or blocked cells, otherwise the placeability
    /// discriminant (Placeable = 1, ConnectorsOnly = 2, Display = 3).
    pub fn fill_state(&self, pos: GridPosition) -> u8 {
        match self.try_cell(pos).map(|c| c.placeability) {
            None | Some(Placeability::Blocked) => 0,
            Some(Placeability::Placeable) => 1,
            Some(Placeability::ConnectorsOnly) => 2,
            Some(Placeability::Display) => 3,
        }
    }

    /// Every non-empty cell with its occupancy summary, row-major.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridPosition, Occupancy)> + '_ {
        self.cells().filter_map(|(pos, cell)| match cell.occupancy() {
            Occupancy::Empty => None,
            o => Some((pos, o)),
        })
    }
}
