//! The two-click wire routing tool.

use crate::connection::{WireColor, WireConnection};
use crate::path::find_path;
use machinery_core::catalog::Catalog;
use machinery_core::fixed::Fixed64;
use machinery_core::geometry::GridPosition;
use machinery_core::id::{ComponentId, WireId};
use machinery_core::mode::{Mode, ModeListener};
use machinery_spatial::{CellGrid, ComponentStore, Placeability, WireType, port_at};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::HashMap;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireRouterConfig {
    /// Type laid by new wires until changed with [`WireRouter::set_wire_type`].
    pub wire_type: WireType,
    pub color: WireColor,
    /// Resistance seeded into each new connection.
    pub default_resistance: Fixed64,
    pub max_current: Fixed64,
    pub max_resistance: Fixed64,
}

impl Default for WireRouterConfig {
    fn default() -> Self {
        Self {
            wire_type: WireType::AC,
            color: WireColor::default(),
            default_resistance: Fixed64::from_num(1),
            max_current: Fixed64::from_num(10),
            max_resistance: Fixed64::from_num(5),
        }
    }
}

// ---------------------------------------------------------------------------
// State and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteState {
    #[default]
    Idle,
    /// One endpoint chosen; `pointer` is the last previewed cell.
    Pending {
        start: GridPosition,
        pointer: GridPosition,
    },
}

/// Why a click did not start or complete a route. Never a fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("cell {0} is not a port of the active wire type")]
    NotAPort(GridPosition),
    #[error("no route from {start} to {end}")]
    NoPath {
        start: GridPosition,
        end: GridPosition,
    },
    #[error("endpoint {0} no longer hosts a component")]
    EndpointMissing(GridPosition),
}

/// Result of a click while wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Nothing changed.
    Ignored(RouteError),
    /// First endpoint chosen.
    Started(GridPosition),
    /// A connection was committed.
    Completed(WireId),
    /// The pending route was dropped without touching the grid.
    Cancelled(RouteError),
}

/// What the router reads and, on finalize, writes.
pub struct RouteContext<'a> {
    pub grid: &'a mut CellGrid,
    pub components: &'a ComponentStore,
    pub catalog: &'a Catalog,
}

// ---------------------------------------------------------------------------
// WireRouter
// ---------------------------------------------------------------------------

/// Idle -> Pending on a first port click, back to Idle on finalize or cancel.
///
/// The grid is only written when a route finalizes: every non-component
/// path cell gets the wire tag and the new [`WireId`], and every path cell
/// is indexed for reverse lookup.
#[derive(Debug, Default)]
pub struct WireRouter {
    config: WireRouterConfig,
    state: RouteState,
    connections: SlotMap<WireId, WireConnection>,
    by_cell: HashMap<GridPosition, WireId>,
}

impl WireRouter {
    pub fn new(config: WireRouterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &WireRouterConfig {
        &self.config
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RouteState::Pending { .. })
    }

    pub fn wire_type(&self) -> WireType {
        self.config.wire_type
    }

    /// Type of wires laid from now on. A pending route keeps going.
    pub fn set_wire_type(&mut self, kind: WireType) {
        self.config.wire_type = kind;
    }

    pub fn set_wire_color(&mut self, color: WireColor) {
        self.config.color = color;
    }

    // -- Clicks --

    /// Whether `cell` is a port of the active wire type on a placed component.
    pub fn is_port(
        &self,
        grid: &CellGrid,
        components: &ComponentStore,
        catalog: &Catalog,
        cell: GridPosition,
    ) -> bool {
        let Some(port_type) = self.config.wire_type.port_type() else {
            return false;
        };
        let Some(c) = grid.try_cell(cell) else {
            return false;
        };
        if c.placeability == Placeability::Blocked {
            return false;
        }
        let Some(placed) = c.component.and_then(|id| components.get(id)) else {
            return false;
        };
        catalog
            .get(placed.def)
            .and_then(|def| port_at(def, placed.anchor, placed.rotation, cell, port_type))
            .is_some()
    }

    /// Handle a left click on `cell`.
    pub fn handle_click(&mut self, ctx: RouteContext<'_>, cell: GridPosition) -> RouteOutcome {
        if !self.is_port(ctx.grid, ctx.components, ctx.catalog, cell) {
            return RouteOutcome::Ignored(RouteError::NotAPort(cell));
        }
        match self.state {
            RouteState::Idle => {
                self.state = RouteState::Pending {
                    start: cell,
                    pointer: cell,
                };
                debug!(start = %cell, "route started");
                RouteOutcome::Started(cell)
            }
            RouteState::Pending { start, .. } => match self.finalize(ctx, start, cell) {
                Ok(id) => {
                    self.state = RouteState::Idle;
                    RouteOutcome::Completed(id)
                }
                Err(e) => {
                    self.cancel_preview();
                    RouteOutcome::Cancelled(e)
                }
            },
        }
    }

    fn finalize(
        &mut self,
        ctx: RouteContext<'_>,
        start: GridPosition,
        end: GridPosition,
    ) -> Result<WireId, RouteError> {
        // The grid may have changed since the first click.
        let start_component = ctx.grid.try_cell(start).and_then(|c| c.component);
        let end_component = ctx.grid.try_cell(end).and_then(|c| c.component);
        let (Some(start_component), Some(end_component)) = (start_component, end_component) else {
            let missing = if start_component.is_none() { start } else { end };
            warn!(cell = %missing, "route endpoint vanished before finalize");
            return Err(RouteError::EndpointMissing(missing));
        };
        if !self.is_port(ctx.grid, ctx.components, ctx.catalog, start) {
            warn!(cell = %start, "route start is no longer a port");
            return Err(RouteError::NotAPort(start));
        }

        let path = find_path(ctx.grid, start, end);
        if path.is_empty() {
            debug!(%start, %end, "no route");
            return Err(RouteError::NoPath { start, end });
        }

        let mut connection = WireConnection {
            wire_type: self.config.wire_type,
            color: self.config.color,
            start_component,
            end_component,
            start_cell: start,
            end_cell: end,
            path,
            resistance: self.config.default_resistance,
            current: Fixed64::ZERO,
            voltage: Fixed64::ZERO,
            damaged: false,
        };
        connection.evaluate_damage(self.config.max_current, self.config.max_resistance);

        let kind = connection.wire_type;
        let id = self.connections.insert(connection);
        let path = &self.connections[id].path;
        for &pos in path {
            // Component cells, endpoints included, never take a wire tag.
            if let Ok(cell) = ctx.grid.cell_mut(pos)
                && !cell.has_component()
            {
                cell.set_wire(kind, id);
            }
            self.by_cell.insert(pos, id);
        }
        debug!(?id, %start, %end, cells = path.len(), "route finalized");
        Ok(id)
    }

    // -- Preview --

    /// Track the pointer while a route is pending. No-op when idle.
    pub fn update_preview(&mut self, pointer: GridPosition) {
        if let RouteState::Pending { start, .. } = self.state {
            self.state = RouteState::Pending { start, pointer };
        }
    }

    /// `(start, pointer)` of the pending route.
    pub fn preview(&self) -> Option<(GridPosition, GridPosition)> {
        match self.state {
            RouteState::Idle => None,
            RouteState::Pending { start, pointer } => Some((start, pointer)),
        }
    }

    /// The path the pending route would take to the pointer cell right now.
    pub fn preview_path(&self, grid: &CellGrid) -> Vec<GridPosition> {
        self.preview()
            .map(|(start, pointer)| find_path(grid, start, pointer))
            .unwrap_or_default()
    }

    /// Drop any pending route. Never writes to the grid.
    pub fn cancel_preview(&mut self) {
        if let RouteState::Pending { start, .. } = self.state {
            debug!(%start, "route cancelled");
        }
        self.state = RouteState::Idle;
    }

    // -- Registry --

    pub fn connection(&self, id: WireId) -> Option<&WireConnection> {
        self.connections.get(id)
    }

    pub fn connection_mut(&mut self, id: WireId) -> Option<&mut WireConnection> {
        self.connections.get_mut(id)
    }

    /// The connection indexed at `cell`, including endpoint cells.
    pub fn connection_at(&self, cell: GridPosition) -> Option<(WireId, &WireConnection)> {
        let id = *self.by_cell.get(&cell)?;
        self.connections.get(id).map(|c| (id, c))
    }

    pub fn connections(&self) -> impl Iterator<Item = (WireId, &WireConnection)> {
        self.connections.iter()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Re-run damage evaluation on every connection with the configured limits.
    pub fn evaluate_damage(&mut self) -> usize {
        let (max_i, max_r) = (self.config.max_current, self.config.max_resistance);
        self.connections
            .values_mut()
            .map(|c| c.evaluate_damage(max_i, max_r))
            .filter(|&damaged| damaged)
            .count()
    }

    /// Remove a connection, clearing its wire cells and index entries. Cells
    /// shared with another connection are handed over to it.
    pub fn remove_connection(&mut self, grid: &mut CellGrid, id: WireId) -> Option<WireConnection> {
        let removed = self.connections.remove(id)?;
        for &pos in &removed.path {
            let survivor = self
                .connections
                .iter()
                .find(|(_, c)| c.path.contains(&pos))
                .map(|(other, c)| (other, c.wire_type));

            if self.by_cell.get(&pos) == Some(&id) {
                match survivor {
                    Some((other, _)) => self.by_cell.insert(pos, other),
                    None => self.by_cell.remove(&pos),
                };
            }
            if let Ok(cell) = grid.cell_mut(pos)
                && cell.wire_id() == Some(id)
            {
                match survivor {
                    Some((other, kind)) => cell.set_wire(kind, other),
                    None => cell.clear_wire(),
                }
            }
        }
        debug!(?id, cells = removed.path.len(), "connection removed");
        Some(removed)
    }

    /// Remove every connection with `component` as an endpoint.
    pub fn remove_connections_touching(
        &mut self,
        grid: &mut CellGrid,
        component: ComponentId,
    ) -> Vec<WireConnection> {
        let ids: Vec<WireId> = self
            .connections
            .iter()
            .filter(|(_, c)| c.touches(component))
            .map(|(id, _)| id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.remove_connection(grid, id))
            .collect()
    }
}

impl ModeListener for WireRouter {
    fn on_enter_mode(&mut self, _mode: Mode) {}

    fn on_exit_mode(&mut self, mode: Mode) {
        if mode == Mode::WirePlacement {
            self.cancel_preview();
        }
    }
}
